//! Built-in REPL commands

use colored::*;

use crate::knowledge::CacheStats;
use crate::repl::session::ConversationLog;
use crate::types::Role;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History { limit: Option<usize> },
    Status,
    Context { text: Option<String> },
    Reset,
    Exit,
    Unknown { input: String },
}

pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Parse a `/command [args]` line
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Command::Unknown {
            input: input.to_string(),
        };
    };

    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    match name.to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "exit" | "quit" | "q" => Command::Exit,
        "history" => Command::History {
            limit: rest.parse().ok(),
        },
        "status" => Command::Status,
        "context" | "ctx" => Command::Context {
            text: (!rest.is_empty()).then(|| rest.to_string()),
        },
        "reset" => Command::Reset,
        _ => Command::Unknown {
            input: input.to_string(),
        },
    }
}

/// Execute a command. Returns false when the REPL should exit.
pub fn execute(command: Command, log: &mut ConversationLog, cache: &CacheStats) -> bool {
    match command {
        Command::Help => show_help(),
        Command::Exit => {
            println!("{}", "Goodbye, explorer!".green());
            return false;
        }
        Command::History { limit } => show_history(log, limit.unwrap_or(10)),
        Command::Status => show_status(log, cache),
        Command::Context { text: Some(text) } => {
            log.set_additional_context(Some(text));
            println!("{}", "Additional context set.".cyan());
        }
        Command::Context { text: None } => match log.additional_context() {
            Some(context) => println!("{} {}", "Additional context:".bold(), context),
            None => println!("{}", "No additional context set.".yellow()),
        },
        Command::Reset => {
            log.reset();
            println!("{}", "Conversation reset.".yellow());
        }
        Command::Unknown { input } => {
            println!("{}", format!("Unknown command: {}", input).red());
            println!("Type {} for available commands", "/help".cyan());
        }
    }
    true
}

fn show_help() {
    println!("\n{}", "Available Commands:".bold().cyan());
    println!("{}", "=".repeat(60).cyan());

    let commands = [
        ("/help, /h", "Show this help message"),
        ("/history [n]", "Show the last n turns (default: 10)"),
        ("/status", "Show session and knowledge base status"),
        ("/context [text]", "Show or set additional context"),
        ("/reset", "Start a new conversation"),
        ("/exit, /quit, /q", "Exit"),
    ];

    for (cmd, desc) in commands {
        println!("  {:<20} {}", cmd.green(), desc);
    }
    println!();
}

fn show_history(log: &ConversationLog, limit: usize) {
    let turns = log.recent(limit);
    if turns.is_empty() {
        println!("{}", "No messages yet.".yellow());
        return;
    }

    println!("\n{}", format!("Conversation (last {}):", turns.len()).bold().cyan());
    println!("{}", "=".repeat(60).cyan());
    for turn in turns {
        let time = turn.at.format("%H:%M:%S").to_string().dimmed();
        let role = match turn.message.role {
            Role::User => "you".green(),
            Role::Assistant => "earthie".cyan(),
        };
        println!("  {} {}: {}", time, role, turn.message.content);
    }
    println!();
}

fn show_status(log: &ConversationLog, cache: &CacheStats) {
    println!("\n{}", "Session Status:".bold().cyan());
    println!("{}", "=".repeat(60).cyan());
    println!("  Started:          {}", log.started_at().format("%Y-%m-%d %H:%M:%S"));
    println!("  Messages:         {}", log.len().to_string().green());
    println!(
        "  Extra Context:    {}",
        if log.additional_context().is_some() { "Yes".green() } else { "No".red() }
    );
    println!("  Knowledge Chunks: {}", cache.chunks.to_string().green());
    println!("  Knowledge Files:  {}", cache.files.to_string().green());
    println!();
}
