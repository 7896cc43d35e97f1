use clap::Parser;
use std::path::PathBuf;

/// Command-line client for the Louis AI school assistant
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The question to ask Louis AI
    #[arg(index = 1)] // Positional argument
    pub prompt: Option<String>,

    /// Enter interactive chat mode
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// Show the model's reasoning alongside the answer
    #[arg(long, default_value_t = false)]
    pub thinking: bool,

    /// Retrieved school data to ground the answer in
    #[arg(long)]
    pub context: Option<String>,

    /// Run the knowledge bank test suite and print a report
    #[arg(long, default_value_t = false)]
    pub knowledge_test: bool,

    /// Print provider configuration status
    #[arg(long, default_value_t = false)]
    pub status: bool,

    /// Emit machine-readable JSON instead of formatted text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Path to the configuration file
    #[arg(short, long, env = "LOUIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
