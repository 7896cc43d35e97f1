use colored::*;
use louis_core::{AssistantError, ProviderStatus, TestReport, ThinkingResponse};
use tracing::debug;

/// Print a reply, with the reasoning dimmed above it when present
pub fn print_reply(reply: &ThinkingResponse) {
    if !reply.thinking.is_empty() {
        println!("{}", "Thinking:".dimmed().bold());
        for line in reply.thinking.lines() {
            println!("  {}", line.dimmed());
        }
        println!();
    }
    println!("{}: {}", "Louis AI".blue().bold(), reply.response);
}

/// Show the friendly message for the error's category
pub fn print_error(err: &AssistantError) {
    debug!(error = %err, "Request failed");
    let category = err.category();
    eprintln!(
        "{} {}",
        format!("[{}]", category).red().bold(),
        category.user_message().red()
    );
}

pub fn print_statuses(statuses: &[ProviderStatus]) {
    println!("{}", "Providers (in fallback order):".yellow().bold());
    for (index, status) in statuses.iter().enumerate() {
        let key = if status.has_api_key {
            "API key set".green()
        } else {
            "API key missing".red()
        };
        println!(
            "  {}. {} [{}] {} ({})",
            index + 1,
            status.provider.cyan().bold(),
            status.model,
            status.endpoint,
            key
        );
    }
}

pub fn print_report(report: &TestReport) {
    println!("{}", "Knowledge Bank Test Results".yellow().bold());
    for result in &report.results {
        if result.success {
            println!(
                "  {} {} ({}ms)",
                "PASS".green().bold(),
                result.query,
                result.response_time_ms
            );
        } else {
            println!(
                "  {} {} - {}",
                "FAIL".red().bold(),
                result.query,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    println!();
    println!("{}", "Query types:".cyan());
    for probe in &report.query_types {
        let mark = if probe.success { "ok".green() } else { "failed".red() };
        println!(
            "  {:<10} {} ({} characters)",
            probe.query_type, mark, probe.response_length
        );
    }

    println!();
    println!(
        "{} (average {}ms, started {})",
        report.summary().bold(),
        report.average_response_time_ms,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// Show usage instructions when no prompt or action is provided
pub fn print_usage_instructions() {
    println!("{}", "Usage:".yellow().bold());
    println!("  {}", "louis \"your question\"".green().bold());
    println!("    Ask Louis AI a single question");
    println!();
    println!("  {}", "louis -i".green().bold());
    println!("    Start an interactive chat session");
    println!();
    println!("  {}", "louis --knowledge-test".green().bold());
    println!("    Run the knowledge bank test suite");
    println!();
    println!("{}", "Options:".cyan());
    println!("  --thinking        Show the model's reasoning");
    println!("  --context <TEXT>  Ground the answer in retrieved school data");
    println!("  --status          Show provider configuration");
    println!("  --json            Print JSON output");
    println!("  --config <PATH>   Use a specific configuration file");
    println!("  --help            Show this help message");
    println!();
}
