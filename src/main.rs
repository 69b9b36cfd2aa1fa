//! Earthie - CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use earthie::chat::{fallback_message, ChatApi};
use earthie::cli::{Args, Commands, Config, Verbosity};
use earthie::doctor::Doctor;
use earthie::knowledge::{CacheStatus, KnowledgeCache};
use earthie::models::{GeminiClient, QueryEmbedder, ResponseGenerator};
use earthie::rag::{ChatPipeline, KnowledgeRetriever, PromptAssembler};
use earthie::repl::input::InputHandler;
use earthie::repl::{ReplConfig, ReplSession};
use earthie::telemetry;
use earthie::types::Message;

/// Load config and apply command-line overrides
fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.clone())?;
    if let Some(model) = &args.model {
        config.gemini.generation_model = model.clone();
    }
    Ok(config)
}

/// Flags win; otherwise the configured default
fn effective_verbosity(args: &Args, config: &Config) -> Verbosity {
    if args.quiet || args.verbose > 0 {
        return args.verbosity();
    }
    Verbosity::from_name(&config.telemetry.default_verbosity).unwrap_or(Verbosity::Normal)
}

fn cache_path(args: &Args, config: &Config) -> PathBuf {
    args.cache
        .clone()
        .unwrap_or_else(|| config.knowledge_path(&args.working_dir()))
}

/// Build the shared pipeline once; every request reuses it
fn build_pipeline(args: &Args, config: &Config) -> Result<Arc<ChatPipeline>> {
    let cache = Arc::new(KnowledgeCache::load(cache_path(args, config)));

    let api_key = config.api_key()?;
    let client = Arc::new(GeminiClient::with_config(
        &config.gemini.base_url,
        &api_key,
        &config.gemini.generation_model,
        &config.gemini.embedding_model,
    )?);

    let retriever = KnowledgeRetriever::with_config(
        cache,
        QueryEmbedder::with_timeout(client.clone(), config.embedding_timeout()),
        config.rank_config(),
    );
    let generator = ResponseGenerator::with_timeout(client, config.generation_timeout());

    let pipeline = ChatPipeline::new(retriever, PromptAssembler::new(), generator)
        .with_min_query_words(config.retrieval.min_query_words);
    Ok(Arc::new(pipeline))
}

/// Answer one question and exit
async fn run_ask(args: &Args, config: &Config, message: &str, context: Option<&str>) -> Result<()> {
    let pipeline = build_pipeline(args, config)?;
    let outcome = pipeline
        .respond(&[Message::user(message)], context)
        .await?;

    match outcome.reply {
        Ok(text) => println!("{}", text),
        Err(e) => println!("{}", fallback_message(&e).yellow()),
    }
    Ok(())
}

/// Interactive chat session
async fn run_repl(args: &Args, config: &Config, verbosity: Verbosity) -> Result<()> {
    let pipeline = build_pipeline(args, config)?;

    let input = match Config::history_path() {
        Some(path) => InputHandler::with_history(path)?,
        None => InputHandler::new()?,
    };

    let repl_config = ReplConfig {
        model: config.gemini.generation_model.clone(),
        show_progress: verbosity.show_progress(),
        show_sources: verbosity != Verbosity::Normal && verbosity != Verbosity::Quiet,
    };

    let mut session = ReplSession::new(pipeline, input, repl_config);
    session.run().await
}

/// Chat API request from a file or stdin; response JSON on stdout
async fn run_api(args: &Args, config: &Config, input: Option<&PathBuf>) -> Result<()> {
    let body = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };

    let api = ChatApi::new(build_pipeline(args, config)?);
    let response = api.handle_json(&body).await;
    println!("{}", response.to_json());

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn show_knowledge(args: &Args, config: &Config) -> Result<()> {
    let path = cache_path(args, config);
    let stats = KnowledgeCache::load(&path).stats();

    println!("\n{}", "Knowledge Cache".bold().cyan());
    println!("{}", "=".repeat(40).cyan());
    println!("  Path:       {}", path.display());
    let status = match &stats.status {
        CacheStatus::Loaded => "loaded".green(),
        CacheStatus::Missing => "missing".yellow(),
        CacheStatus::Empty => "empty".yellow(),
        CacheStatus::Corrupt(reason) => format!("corrupt ({})", reason).red(),
    };
    println!("  Status:     {}", status);
    println!("  Chunks:     {}", stats.chunks);
    println!("  Files:      {}", stats.files);
    match stats.dimension {
        Some(dim) => println!("  Dimension:  {}", dim),
        None => println!("  Dimension:  -"),
    }
    if stats.discarded > 0 {
        println!("  Discarded:  {}", stats.discarded.to_string().yellow());
    }
    println!();
    Ok(())
}

async fn run_doctor(args: &Args, config: &Config) -> Result<()> {
    let doctor = Doctor::new(config.clone(), cache_path(args, config));
    let checks = doctor.run_diagnostics().await;
    if !Doctor::print_report(&checks) {
        std::process::exit(1);
    }
    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = args
        .config
        .clone()
        .or_else(Config::default_path)
        .filter(|p| p.exists());

    println!("\n{}", "Earthie Configuration".bold().cyan());
    println!("{}", "=".repeat(40).cyan());
    match source {
        Some(path) => println!("  Source: {}", path.display()),
        None => println!("  Source: built-in defaults"),
    }
    println!();
    println!(
        "{}",
        toml::to_string_pretty(config).context("Failed to render configuration")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let verbosity = effective_verbosity(&args, &config);
    telemetry::init_logging(verbosity, config.telemetry.color_output)?;

    match &args.command {
        Commands::Ask { message, context } => {
            run_ask(&args, &config, message, context.as_deref()).await?;
        }
        Commands::Start => {
            run_repl(&args, &config, verbosity).await?;
        }
        Commands::Api { input } => {
            run_api(&args, &config, input.as_ref()).await?;
        }
        Commands::Knowledge => {
            show_knowledge(&args, &config)?;
        }
        Commands::Doctor => {
            run_doctor(&args, &config).await?;
        }
        Commands::Config => {
            show_config(&args, &config)?;
        }
    }

    Ok(())
}
