//! Terminal output for the REPL

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::knowledge::CacheStats;
use crate::types::RetrievedChunk;

/// Show welcome banner
pub fn show_banner(version: &str, model: &str, cache: &CacheStats) {
    let width = 64;
    let title = format!("  Earthie {} - Earth2 Companion", version);
    let knowledge = if cache.chunks > 0 {
        format!("{} chunks from {} files", cache.chunks, cache.files)
    } else {
        "unavailable".to_string()
    };
    let info = format!("  Model: {} | Knowledge: {}", model, knowledge);

    println!("\n{}", "=".repeat(width).cyan());
    println!("{}", title.bold().cyan());
    println!("{}", info.dimmed());
    println!("{}\n", "=".repeat(width).cyan());
    println!(
        "Ask anything about Earth2 (or {} for commands, {} to quit)\n",
        "/help".green(),
        "/exit".green()
    );
}

/// Spinner shown while a turn is in flight
pub fn thinking_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Earthie is thinking...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn show_reply(text: &str) {
    println!("{} {}\n", "earthie>".cyan().bold(), text);
}

pub fn show_fallback(text: &str) {
    println!("{} {}\n", "earthie>".cyan().bold(), text.yellow());
}

pub fn show_sources(sources: &[RetrievedChunk]) {
    if sources.is_empty() {
        return;
    }
    let list: Vec<String> = sources
        .iter()
        .map(|s| format!("{}#{} ({:.2})", s.file_name, s.chunk_index, s.score))
        .collect();
    println!("{} {}\n", "sources:".dimmed(), list.join(", ").dimmed());
}

pub fn show_error(message: &str) {
    println!("{} {}", "error:".red().bold(), message.red());
}
