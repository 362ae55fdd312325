use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};

use penflow::Config;
use penflow::replay::{self, Trace};

#[derive(Parser, Debug)]
#[command(name = "penflow")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PENFLOW_GIT_HASH"), ")"),
    about = "Pen, mouse and touch input handling for drawing canvases"
)]
struct Cli {
    /// Configuration file (defaults to ~/.config/penflow/config.toml)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded event trace and print the resulting callbacks
    Replay {
        /// Trace file (JSON)
        trace: PathBuf,

        /// Print one JSON object per callback
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    PrintConfig,

    /// Write the documented example configuration to the config directory
    InitConfig,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Replay { trace, json }) => {
            let config = load_config(cli.config.as_ref())?;
            let trace = Trace::load(&trace)?;
            let callbacks = replay::run(&trace, config);
            log::info!("Replay produced {} callbacks", callbacks.len());
            for callback in &callbacks {
                if json {
                    println!(
                        "{}",
                        serde_json::to_string(callback).context("Failed to encode callback")?
                    );
                } else {
                    println!("{callback}");
                }
            }
        }
        Some(Command::PrintConfig) => {
            let config = load_config(cli.config.as_ref())?;
            print!("{}", config.to_toml()?);
        }
        Some(Command::InitConfig) => {
            let path = Config::create_default_file()?;
            println!("Created {}", path.display());
        }
        None => {
            println!("penflow: Pen, mouse and touch input handling for drawing canvases");
            println!();
            println!("Usage:");
            println!("  penflow replay <TRACE>     Replay an event trace and print callbacks");
            println!("  penflow print-config       Show the effective configuration");
            println!("  penflow init-config        Create ~/.config/penflow/config.toml");
            println!("  penflow --help             Show help");
        }
    }

    Ok(())
}
