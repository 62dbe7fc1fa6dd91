mod runner;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use filascale_client::config::ClientConfig;
use filascale_client::net::UserAction;
use filascale_client::net::requests::CommandError;
use filascale_client::state::scale::ScaleState;
use filascale_frames::Vessel;
use tracing_subscriber::EnvFilter;

use crate::runner::ScaleClient;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("timed out waiting for the scale")]
    Timeout,
    #[error("connection failed after {0} reconnect attempts")]
    ConnectionFailed(u32),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("session runtime stopped")]
    RuntimeStopped,
    #[error("failed to listen for ctrl-c: {0}")]
    Signal(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "filascale", about = "Terminal client for the filament scale")]
struct Cli {
    /// Device address; `http(s)://` and `ws(s)://` prefixes are accepted.
    #[arg(long, env = "FILASCALE_HOST", default_value = "192.168.4.1")]
    host: String,

    #[arg(long, env = "FILASCALE_SETTLE_MS", default_value_t = 500)]
    settle_ms: u64,

    #[arg(long, env = "FILASCALE_RECONNECT_DELAY_MS", default_value_t = 2000)]
    reconnect_delay_ms: u64,

    #[arg(long, env = "FILASCALE_MAX_ATTEMPTS", default_value_t = 5)]
    max_attempts: u32,

    /// How long one-shot commands wait for the device.
    #[arg(long, env = "FILASCALE_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::for_host(&self.host);
        config.settle_delay = Duration::from_millis(self.settle_ms);
        config.initial_reconnect_delay = Duration::from_millis(self.reconnect_delay_ms);
        config.max_reconnect_attempts = self.max_attempts;
        config
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream live weight readings until interrupted.
    Watch,
    Vessels(VesselsCommand),
    /// Zero the scale.
    Tare,
    /// Calibrate against a known reference weight.
    Calibrate {
        #[arg(long, default_value_t = 100.0)]
        weight: f64,
    },
}

#[derive(Args, Debug)]
struct VesselsCommand {
    #[command(subcommand)]
    command: VesselsSubcommand,
}

#[derive(Subcommand, Debug)]
enum VesselsSubcommand {
    List,
    Add(VesselArgs),
    Update {
        index: usize,
        #[command(flatten)]
        vessel: VesselArgs,
    },
    Delete {
        index: usize,
    },
    Select {
        index: usize,
    },
}

#[derive(Args, Debug)]
struct VesselArgs {
    #[arg(long)]
    name: String,
    /// Empty container weight in grams.
    #[arg(long)]
    vessel_weight: f64,
    /// Empty spool weight in grams.
    #[arg(long)]
    spool_weight: f64,
}

impl From<VesselArgs> for Vessel {
    fn from(args: VesselArgs) -> Self {
        Vessel::new(args.name, args.vessel_weight, args.spool_weight)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("filascale=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);
    let mut client = ScaleClient::spawn(cli.client_config());

    match cli.command {
        Command::Watch => run_watch(&mut client).await,
        Command::Vessels(vessels) => run_vessels(&mut client, vessels, timeout).await,
        Command::Tare => run_action(&mut client, UserAction::Tare, timeout).await,
        Command::Calibrate { weight } => run_action(&mut client, UserAction::Calibrate { weight }, timeout).await,
    }
}

async fn run_watch(client: &mut ScaleClient) -> Result<(), CliError> {
    client.perform(UserAction::ToggleLiveUpdates).await?;
    let mut updates = client.subscribe();
    let mut last_line = String::new();

    loop {
        let (line, failed) = {
            let state = updates.borrow_and_update();
            (watch_line(&state), state.is_failed())
        };
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
        if failed {
            return Err(CliError::ConnectionFailed(client.max_attempts()));
        }
        tokio::select! {
            changed = updates.changed() => changed.map_err(|_| CliError::RuntimeStopped)?,
            signal = tokio::signal::ctrl_c() => return signal.map_err(CliError::from),
        }
    }
}

fn watch_line(state: &ScaleState) -> String {
    let total = state.total_text().unwrap_or_else(|| "Total: --".to_owned());
    let filament = state.filament.display_text();
    if filament.is_empty() {
        format!("{total} | {}", state.status)
    } else {
        format!("{total} | {filament} | {}", state.status)
    }
}

async fn run_vessels(client: &mut ScaleClient, vessels: VesselsCommand, timeout: Duration) -> Result<(), CliError> {
    let action = match vessels.command {
        VesselsSubcommand::List => {
            let state = client.ready(timeout).await?;
            print_vessels(&state);
            return Ok(());
        }
        VesselsSubcommand::Add(args) => UserAction::AddVessel(args.into()),
        VesselsSubcommand::Update { index, vessel } => UserAction::UpdateVessel { index, vessel: vessel.into() },
        VesselsSubcommand::Delete { index } => UserAction::DeleteVessel(index),
        VesselsSubcommand::Select { index } => UserAction::SelectVessel(index),
    };
    run_action(client, action, timeout).await
}

/// Wait for the first snapshot, send `action`, then report the device's answer.
async fn run_action(client: &mut ScaleClient, action: UserAction, timeout: Duration) -> Result<(), CliError> {
    let before = client.ready(timeout).await?;
    client.perform(action).await?;
    match client.next_status(before.status_rev, timeout).await {
        Ok(state) => println!("{}", state.status),
        Err(CliError::Timeout) => {
            tracing::warn!("no status from the device within {}s", timeout.as_secs());
            println!("{}", client.snapshot().status);
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

fn print_vessels(state: &ScaleState) {
    if state.vessels.is_empty() {
        println!("no vessels stored");
        return;
    }
    let highlighted = state.highlighted_vessel();
    for (index, vessel) in state.vessels.iter().enumerate() {
        let marker = if highlighted == Some(index) { '*' } else { ' ' };
        println!(
            "{marker} {index}: {} (vessel {}g, spool {}g)",
            vessel.name, vessel.vessel_weight, vessel.spool_weight
        );
    }
}
