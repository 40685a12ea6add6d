//! Arena operator binary.
//!
//! `arena run` drives every configured arena until interrupted. The other
//! subcommands perform one manual operation against a single arena with
//! automation disabled, print the result and exit.
//!
//! ```bash
//! arena run --arena 0x5fbdb2315678afecb367f032d93f642f64180aa3
//! arena status 0x5fbdb2315678afecb367f032d93f642f64180aa3
//! arena bet 0x5fbdb2315678afecb367f032d93f642f64180aa3 a --multiplier 2
//! ```

use anyhow::Result;
use arena_client::{Client, logging};
use arena_core::{ArenaCommand, ArenaId, Origin, Side, WarriorId};
use clap::{Parser, Subcommand, ValueEnum};
use client_blockchain_core::Receipt;
use client_bootstrap::{ArenaConfig, RuntimeBuilder};
use runtime::{RuntimeHandle, StatusReport};

/// Battle arena orchestrator
#[derive(Parser)]
#[command(name = "arena")]
#[command(about = "Drives battle arenas on an EVM ledger", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch arenas and drive them automatically until Ctrl-C
    Run {
        /// Arena to drive (repeatable; defaults to ARENA_ADDRESSES)
        #[arg(long = "arena")]
        arenas: Vec<ArenaId>,
    },

    #[command(flatten)]
    Manual(ManualCommand),
}

/// One manual operation against a single arena.
#[derive(Subcommand)]
enum ManualCommand {
    /// Print the reconciled view and automation state as JSON
    Status { arena: ArenaId },

    /// Initialize an arena with two warriors
    Initialize {
        arena: ArenaId,
        warrior_a: u64,
        warrior_b: u64,
    },

    /// Start the battle once the betting window has elapsed
    StartGame { arena: ArenaId },

    /// Fight one round (defaults to the current round)
    NextRound {
        arena: ArenaId,
        #[arg(long)]
        round: Option<u8>,
    },

    /// Bet on a side during the betting window
    Bet {
        arena: ArenaId,
        side: SideArg,
        #[arg(long, default_value_t = 1)]
        multiplier: u64,
    },

    /// Buy influence for a side during the battle
    Influence { arena: ArenaId, side: SideArg },

    /// Buy defluence against a side during the battle
    Defluence { arena: ArenaId, side: SideArg },
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    A,
    B,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::A => Side::A,
            SideArg::B => Side::B,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = ArenaConfig::from_env()?;
    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    match cli.command {
        Command::Run { arenas } => run(config, arenas).await,
        Command::Manual(command) => one_shot(config, command).await,
    }
}

async fn run(config: ArenaConfig, arenas: Vec<ArenaId>) -> Result<()> {
    let arenas = if arenas.is_empty() {
        config.arenas.clone()
    } else {
        arenas
    };

    tracing::info!("Starting arena orchestrator");
    let setup = RuntimeBuilder::new(config).build().await?;

    Client::builder()
        .runtime(setup.runtime)
        .arenas(arenas)
        .build()?
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for Ctrl-C");
            }
        })
        .await
}

impl ManualCommand {
    fn arena(&self) -> &ArenaId {
        match self {
            Self::Status { arena }
            | Self::Initialize { arena, .. }
            | Self::StartGame { arena }
            | Self::NextRound { arena, .. }
            | Self::Bet { arena, .. }
            | Self::Influence { arena, .. }
            | Self::Defluence { arena, .. } => arena,
        }
    }
}

async fn one_shot(config: ArenaConfig, command: ManualCommand) -> Result<()> {
    let arena = command.arena().clone();

    let setup = RuntimeBuilder::new(config)
        .automation(false)
        .require_inference(matches!(command, ManualCommand::NextRound { .. }))
        .build()
        .await?;
    let mut runtime = setup.runtime;
    runtime.watch_arena(arena.clone()).await?;
    let handle = runtime.handle();

    let result = execute(&handle, arena, command).await;
    runtime.shutdown().await?;
    result
}

async fn execute(handle: &RuntimeHandle, arena: ArenaId, command: ManualCommand) -> Result<()> {
    match command {
        ManualCommand::Status { .. } => print_status(&handle.status(&arena).await?)?,
        ManualCommand::Initialize {
            warrior_a,
            warrior_b,
            ..
        } => {
            let command = ArenaCommand::initialize(
                arena,
                WarriorId(warrior_a),
                WarriorId(warrior_b),
                Origin::Manual,
            );
            println!("{}", serde_json::to_string_pretty(&handle.execute(command).await?)?);
        }
        ManualCommand::StartGame { .. } => {
            let command = ArenaCommand::start_game(arena, Origin::Manual);
            println!("{}", serde_json::to_string_pretty(&handle.execute(command).await?)?);
        }
        ManualCommand::NextRound { round, .. } => {
            let round = match round {
                Some(round) => round,
                None => handle.status(&arena).await?.view.round,
            };
            let command = ArenaCommand::next_round(arena, round, Origin::Manual);
            println!("{}", serde_json::to_string_pretty(&handle.execute(command).await?)?);
        }
        ManualCommand::Bet {
            side, multiplier, ..
        } => print_receipt(&handle.place_bet(&arena, side.into(), multiplier).await?),
        ManualCommand::Influence { side, .. } => {
            print_receipt(&handle.influence(&arena, side.into()).await?)
        }
        ManualCommand::Defluence { side, .. } => {
            print_receipt(&handle.defluence(&arena, side.into()).await?)
        }
    }
    Ok(())
}

fn print_status(report: &StatusReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_receipt(receipt: &Receipt) {
    println!("confirmed {} in block {}", receipt.tx, receipt.block_number);
    for event in &receipt.events {
        println!("  {}", event.name());
    }
}
