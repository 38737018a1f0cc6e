use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use hotline_core::{AssistantStore, config, storage};
use tracing_subscriber::EnvFilter;

mod assistants;
mod render;
mod wizard;

use assistants::AssistantCommands;

#[derive(Parser)]
#[command(name = "hotline")]
#[command(about = "hotline - configure AI assistant personas and preview them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config file
    Init {
        #[arg(long)]
        force: bool,
    },
    #[command(flatten)]
    Assistants(AssistantCommands),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let command = cli
        .command
        .unwrap_or(Commands::Assistants(AssistantCommands::List));

    match command {
        Commands::Init { force } => {
            let path = config::get_config_path();
            if config::config_exists() && !force {
                println!(
                    "{} Config already exists at {} (use --force to overwrite)",
                    style("!").yellow(),
                    style(path.display()).cyan()
                );
                return Ok(());
            }

            let defaults = config::Config::default();
            config::save_config(&defaults)?;
            println!(
                "{} Config saved to {}",
                style("✓").green().bold(),
                style(path.display()).cyan()
            );
            println!(
                "  {} Assistants are stored in {}",
                style("→").green(),
                style(defaults.storage_dir.display()).cyan()
            );
        }
        Commands::Assistants(command) => {
            let config = config::Config::load_or_init()?;
            let storage = storage::create_storage(&config)?;
            let store = AssistantStore::load(storage, config.storage_key.clone()).await;

            if let Err(e) = assistants::handle_command(command, store, &config).await {
                eprintln!("❌ Error: {:#}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
