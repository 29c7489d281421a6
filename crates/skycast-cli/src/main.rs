// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use skycast_core::{AskRequest, Engine, EngineConfig, Status};
use skycast_lexicon::{Persistence, VocabularyStore};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config.json (defaults to the platform config directory)
    #[arg(short, long, env = "SKYCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the Ollama server
    #[arg(long, env = "SKYCAST_GENERATOR_URL")]
    generator_url: Option<String>,

    /// Model name passed to the generator
    #[arg(long, env = "SKYCAST_MODEL")]
    model: Option<String>,

    /// Weather lookup endpoint
    #[arg(long, env = "SKYCAST_WEATHER_URL")]
    weather_url: Option<String>,

    /// Vocabulary file
    #[arg(long, env = "SKYCAST_VOCABULARY")]
    vocabulary: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a weather question
    Ask {
        query: Vec<String>,
        /// Where you are, for "where should I go" questions
        #[arg(short, long)]
        location: Option<String>,
        /// Print the full JSON response
        #[arg(long)]
        json: bool,
    },
    /// Inspect or extend the trigger-phrase vocabulary
    Vocab {
        #[command(subcommand)]
        command: VocabCommands,
    },
    /// Check whether the generator is reachable
    Health,
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(Subcommand)]
enum VocabCommands {
    /// List phrases, optionally for one category
    Show { category: Option<String> },
    /// Add phrases to a category
    Merge {
        category: String,
        #[arg(required = true)]
        phrases: Vec<String>,
    },
    /// Ask the generator for new phrases in every category
    Enrich,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn load_config(cli: &Cli) -> Result<(EngineConfig, PathBuf)> {
    let path = cli.config.clone().unwrap_or_else(EngineConfig::default_path);
    let mut config = EngineConfig::load_from(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;

    if let Some(url) = &cli.generator_url {
        config.generator_url = url.clone();
    }
    if let Some(model) = &cli.model {
        config.generator_model = model.clone();
    }
    if let Some(url) = &cli.weather_url {
        config.weather_url = url.clone();
    }
    if let Some(vocabulary) = &cli.vocabulary {
        config.vocabulary_path = Some(vocabulary.clone());
    }
    log::debug!(
        "[CLI] config={:?} generator={} model={} weather={}",
        path,
        config.generator_url,
        config.generator_model,
        config.weather_url
    );
    Ok((config, path))
}

fn report_persistence(persistence: &Persistence) {
    match persistence {
        Persistence::Saved(path) => println!("Saved to {:?}", path),
        Persistence::Unchanged => println!("Nothing new to save."),
        Persistence::Failed(reason) => println!("Could not save ({}); changes kept in memory only.", reason),
    }
}

/// Exit status for an answered question: non-zero only when the engine gave up.
fn exit_status(status: &Status) -> u8 {
    match status {
        Status::Error => 1,
        Status::Success | Status::LocationRequired => 0,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let (config, config_path) = load_config(&cli)?;

    match &cli.command {
        Commands::Ask {
            query,
            location,
            json,
        } => {
            let query = query.join(" ");
            if query.trim().is_empty() {
                anyhow::bail!("Please ask a question, e.g. skycast ask \"Weather in Paris\"");
            }
            let engine = Engine::from_config(config)?;
            let mut request = AskRequest::new(query);
            if let Some(location) = location {
                request = request.with_location(location.clone());
            }

            let response = engine.ask(request).await;
            if *json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.response);
                if let Some(actions) = &response.suggested_actions {
                    for action in actions {
                        println!("  - {}", action);
                    }
                }
            }
            // No process::exit here: background vocabulary merges must finish first.
            return Ok(ExitCode::from(exit_status(&response.status)));
        }
        Commands::Vocab { command } => {
            let path = config.vocabulary_path();
            match command {
                VocabCommands::Show { category } => {
                    let vocabulary = VocabularyStore::load(&path).snapshot();
                    println!("Vocabulary at {:?}", path);
                    for name in vocabulary.categories() {
                        if category.as_deref().is_some_and(|c| !c.eq_ignore_ascii_case(name)) {
                            continue;
                        }
                        let phrases: Vec<&str> = vocabulary.phrases(name).collect();
                        println!("{} ({}): {}", name, phrases.len(), phrases.join(", "));
                    }
                }
                VocabCommands::Merge { category, phrases } => {
                    let store = VocabularyStore::load(&path);
                    let mut updates = BTreeMap::new();
                    updates.insert(category.clone(), phrases.clone());
                    let report = store.merge(&updates);
                    println!("Added {} phrase(s) to '{}'.", report.added, category);
                    report_persistence(&report.persistence);
                }
                VocabCommands::Enrich => {
                    let engine = Engine::from_config(config)?;
                    let report = engine.enrich_vocabulary().await?;
                    println!("Enrichment added {} phrase(s).", report.added);
                    report_persistence(&report.persistence);
                }
            }
        }
        Commands::Health => {
            let engine = Engine::from_config(config)?;
            let cfg = engine.config();
            if engine.is_generator_available().await {
                println!("Generator at {} is available ({}).", cfg.generator_url, cfg.generator_model);
            } else {
                println!(
                    "Generator at {} is NOT reachable; answers will rely on the rule-based resolvers.",
                    cfg.generator_url
                );
            }
            println!("Weather endpoint: {}", cfg.weather_url);
            println!("Vocabulary: {:?}", cfg.vocabulary_path());
        }
        Commands::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if *write {
                config
                    .save_to(&config_path)
                    .with_context(|| format!("Failed to write {:?}", config_path))?;
                println!("Written to {:?}", config_path);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
