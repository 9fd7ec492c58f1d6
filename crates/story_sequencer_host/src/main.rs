// SPDX-License-Identifier: MIT OR Apache-2.0
//! Story Sequencer host harness
//!
//! Stands in for the video pipeline host when developing the sequencer:
//! - Prints the pipeline schema the host would render
//! - Replays scripted sessions on a manual clock
//!
//! Descriptors go to stdout as JSON lines, logs go to stderr.

mod script;

use clap::{Parser, Subcommand};
use script::{ScriptError, SessionScript};
use std::io::Write;
use std::path::PathBuf;
use story_sequencer::PipelineSchema;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "story-sequencer")]
#[command(about = "Host harness for the story prompt sequencer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the pipeline schema as JSON
    Schema,
    /// Replay a RON session script and print one descriptor per tick
    Run {
        /// Path to the session script
        script: PathBuf,
    },
}

fn init_tracing() -> Result<(), tracing_subscriber::filter::ParseError> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("story_sequencer=info".parse()?)
        .add_directive("story_sequencer_host=info".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<(), ScriptError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Schema => {
            let schema = PipelineSchema::story_sequencer().to_json()?;
            serde_json::to_writer_pretty(&mut out, &schema)?;
            writeln!(out)?;
        }
        Command::Run { script } => {
            tracing::info!("Running session script {:?}", script);
            let session = SessionScript::load(&script)?;
            let summary = session.run(&mut out)?;
            tracing::info!(
                "Session finished: {} ticks, {} recorded events",
                summary.ticks,
                summary.recorded_events
            );
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Invalid log filter: {e}");
        std::process::exit(2);
    }

    tracing::debug!("Starting story-sequencer v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
