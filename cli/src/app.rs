use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use louis_core::{
    AssistantError, ChatMessage, FallbackOrchestrator, KnowledgeBankTester, ThinkingResponse,
};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, info};

use crate::output::{print_error, print_reply, print_report, print_statuses};

/// Messages kept in the interactive conversation history
const MAX_HISTORY_MESSAGES: usize = 50;

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

async fn ask(
    orchestrator: &FallbackOrchestrator,
    prompt: &str,
    context: Option<&str>,
    history: &[ChatMessage],
    thinking: bool,
) -> Result<ThinkingResponse, AssistantError> {
    if thinking {
        orchestrator
            .generate_response_with_thinking(prompt, context, history, &[])
            .await
    } else {
        orchestrator
            .generate_response(prompt, context, history, &[])
            .await
            .map(|response| ThinkingResponse {
                response,
                thinking: String::new(),
            })
    }
}

/// Answers one question and prints the reply
pub async fn run_single_query(
    orchestrator: &FallbackOrchestrator,
    prompt: &str,
    context: Option<&str>,
    thinking: bool,
    json: bool,
) -> Result<()> {
    info!("Running single query: {}", prompt);

    let spinner = spinner("Louis AI is thinking...");
    let outcome = ask(orchestrator, prompt, context, &[], thinking).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(reply) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                print_reply(&reply);
            }
            Ok(())
        }
        Err(e) => {
            print_error(&e);
            Err(e).context("Failed to generate a response")
        }
    }
}

/// Runs an interactive chat, carrying the conversation history between turns
pub async fn run_interactive_chat(
    orchestrator: &FallbackOrchestrator,
    input: &mut impl BufRead,
    context: Option<&str>,
    thinking: bool,
) -> Result<()> {
    println!("Starting a chat with Louis AI.");
    println!("Type 'exit' or 'quit' to end the session.");
    println!();

    let mut history: Vec<ChatMessage> = Vec::new();

    loop {
        print!("{}: ", "You".green().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        let spinner = spinner("Louis AI is thinking...");
        debug!(history_len = history.len(), "Sending question");
        let outcome = ask(orchestrator, input, context, &history, thinking).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(reply) => {
                print_reply(&reply);
                history.push(ChatMessage::user(input));
                history.push(ChatMessage::assistant(reply.response));
                if history.len() > MAX_HISTORY_MESSAGES {
                    history.drain(..history.len() - MAX_HISTORY_MESSAGES);
                }
            }
            Err(e) => print_error(&e),
        }

        println!();
    }

    Ok(())
}

/// Runs the knowledge bank suite; returns whether every query passed
pub async fn run_knowledge_test(orchestrator: &FallbackOrchestrator, json: bool) -> Result<bool> {
    let tester = KnowledgeBankTester::new();

    let spinner = spinner("Running knowledge bank tests...");
    let report = tester.run_all_tests(orchestrator).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report.all_passed())
}

pub fn show_status(orchestrator: &FallbackOrchestrator, json: bool) -> Result<()> {
    let statuses = orchestrator.provider_statuses();
    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        print_statuses(&statuses);
    }
    Ok(())
}
