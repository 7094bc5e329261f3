#![deny(unsafe_code)]

//! volhud CLI — daemon launcher and notification client.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use volhud_config::AppConfig;
use volhud_core::event::{DeviceType, MuteState, VolumeEvent, VolumeState};
use volhud_core::ipc::client::NotifyClient;
use volhud_core::presenter::LogPresenter;
use volhud_core::wire::WireFormat;

/// volhud — a volume-change HUD daemon and its notification client.
#[derive(Parser)]
#[command(name = "volhud", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "volhud.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the volhud daemon.
    Start,

    /// Send one volume event to the running daemon.
    Notify(NotifyArgs),

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[derive(Args)]
struct NotifyArgs {
    /// Device name shown on the overlay.
    #[arg(short, long)]
    name: String,

    /// Device type: "output" or "input".
    #[arg(short = 't', long = "type", default_value = "output")]
    device_type: String,

    /// Volume level 0.0-1.0, or "unsupported".
    #[arg(short = 'V', long, default_value = "0.0")]
    volume: String,

    /// Mute state: "true", "false", or "unsupported".
    #[arg(short, long, default_value = "false")]
    muted: String,

    /// Device error message to display instead of the volume state.
    #[arg(short, long)]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version exit 0; argument errors exit 1.
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let config = load_config(&cli.config).await?;

    // Verbosity flags override the configured level; RUST_LOG overrides both.
    let filter = match cli.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Start => cmd_start(config).await?,
        Commands::Notify(args) => cmd_notify(&config, args).await?,
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
    }

    Ok(())
}

async fn cmd_start(config: AppConfig) -> Result<()> {
    info!("Starting volhud daemon");

    let presenter = LogPresenter::new(config.overlay.bottom_inset);
    let daemon = volhud_core::Daemon::new(config);
    daemon.run(presenter).await?;

    Ok(())
}

async fn cmd_notify(config: &AppConfig, args: NotifyArgs) -> Result<()> {
    let event = build_event(args)?;

    let format = WireFormat::from_config(&config.wire.format)
        .ok_or_else(|| anyhow::anyhow!("unknown wire format {:?}", config.wire.format))?;
    let client = NotifyClient::new(config.resolve_socket_path(), format);
    client.send(&event).await?;

    Ok(())
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

/// Build the wire event from CLI arguments.
///
/// The name is trimmed and must be non-empty; the line-oriented encoding
/// cannot carry embedded newlines, so those are rejected up front rather
/// than producing a message the daemon would misparse.
fn build_event(args: NotifyArgs) -> Result<VolumeEvent> {
    let name = args.name.trim().to_string();
    if name.is_empty() {
        anyhow::bail!("device name must not be empty (use -n/--name)");
    }
    if name.contains('\n') {
        anyhow::bail!("device name must not contain newlines");
    }
    let error = args
        .error
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    if error.as_deref().is_some_and(|e| e.contains('\n')) {
        anyhow::bail!("error message must not contain newlines");
    }

    Ok(VolumeEvent {
        device_name: name,
        device_type: DeviceType::parse(args.device_type.trim()),
        volume: VolumeState::parse(args.volume.trim()),
        muted: MuteState::parse(args.muted.trim()),
        error,
    })
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path).await.map_err(|e| anyhow::anyhow!(e))
    } else {
        Ok(AppConfig::default())
    }
}
