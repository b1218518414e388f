use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use monologue_core::MonologueConfig;
use monologue_cli::{create_llm, load_config, load_events, replay, to_pretty_json};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "monologue", author, version = "0.1.0", about = "Agent monologue memory tools")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(long, short, default_value = "monologue.yaml", help = "Configuration file path")]
    config: PathBuf,

    #[clap(long, short, help = "Log level; defaults to the configuration's logging.level")]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the full thought history, adding a start-task marker on iteration 0
    Thoughts {
        #[clap(long, short, help = "JSON file holding an array of events")]
        events: PathBuf,
        #[clap(long, short)]
        task: String,
        #[clap(long, short, default_value_t = 0)]
        iteration: usize,
    },
    /// Print the thoughts the model judges relevant to a task
    Organize {
        #[clap(long, short, help = "JSON file holding an array of events")]
        events: PathBuf,
        #[clap(long, short)]
        task: String,
        #[clap(long, short, default_value_t = 0)]
        iteration: usize,
    },
    /// Replace the history with a model-written summary
    Condense {
        #[clap(long, short, help = "JSON file holding an array of events")]
        events: PathBuf,
        #[clap(long, help = "Only condense above memory.max_monologue_length")]
        if_needed: bool,
        #[clap(long, short, help = "Write the condensed events here instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Print size statistics for the history
    Size {
        #[clap(long, short, help = "JSON file holding an array of events")]
        events: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_config(&cli.config).await?;

    let level = cli
        .log_level
        .as_deref()
        .or_else(|| loaded.as_ref().map(|config| config.logging.level.as_str()));
    let log_level_filter = level
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .parse_default_env()
        .init();

    let config = match loaded {
        Some(config) => config,
        None => {
            log::warn!("Config file {} not found, using defaults", cli.config.display());
            MonologueConfig::default()
        }
    };

    match cli.command {
        Commands::Thoughts { events, task, iteration } => {
            let mut monologue = replay(load_events(&events).await?, config.memory.clone())?;
            println!("{}", to_pretty_json(&monologue.get_thoughts(&task, iteration))?);
        }
        Commands::Organize { events, task, iteration } => {
            let llm = create_llm(&config)?;
            let mut monologue = replay(load_events(&events).await?, config.memory.clone())?;
            let organized = monologue
                .get_organized_thoughts(&task, iteration, llm.as_ref())
                .await?;
            println!("{}", to_pretty_json(&organized)?);
        }
        Commands::Condense { events, if_needed, output } => {
            let llm = create_llm(&config)?;
            let mut monologue = replay(load_events(&events).await?, config.memory.clone())?;
            if if_needed {
                if !monologue.condense_if_needed(llm.as_ref()).await? {
                    log::info!(
                        "Monologue is {} bytes, under the {} byte limit; nothing to do",
                        monologue.estimate_size(),
                        config.memory.max_monologue_length
                    );
                }
            } else {
                monologue.condense(llm.as_ref()).await?;
            }

            let rendered = to_pretty_json(&monologue.thoughts())?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, rendered).await?;
                    log::info!("Wrote {} condensed events to {}", monologue.len(), path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Size { events } => {
            let monologue = replay(load_events(&events).await?, config.memory.clone())?;
            let stats = monologue.stats();
            println!("thoughts: {}", stats.thoughts);
            println!("size_bytes: {}", stats.size_bytes);
            println!("estimated_tokens: {}", stats.token_count);
            println!(
                "utilization: {:.1}% of {}",
                stats.utilization_percentage(config.memory.max_monologue_length),
                config.memory.max_monologue_length
            );
        }
    }

    Ok(())
}
