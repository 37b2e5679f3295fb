//! padlink entry point.
//!
//! Keeps one virtual gamepad alive for the lifetime of the process and relays
//! the physical controller into it, surviving any number of unplug/replug
//! cycles.
//!
//! # Usage
//!
//! ```text
//! padlink [OPTIONS]
//!
//! Options:
//!   --device-link <PATH>        Physical device event node
//!   --event-path <PATH>         Alias for the virtual device's event node
//!   --js-path <PATH>            Alias for the virtual device's joystick node
//!   --virtual-name <NAME>       Display name of the virtual device
//!   --poll-interval-ms <MS>     Poll interval while the device is absent
//!   --backoff-ms <MS>           Delay after a lost link
//!   --no-mirror-identity        Present BUS_VIRTUAL 0/0/0 instead of the
//!                               physical device's ids
//!   -c, --config <FILE>         TOML configuration file
//! ```
//!
//! # Configuration precedence
//!
//! Built-in defaults, then the TOML file, then environment variables, then
//! flags.  Later sources win.
//!
//! | Variable               | Flag             | Default                        |
//! |------------------------|------------------|--------------------------------|
//! | `PADLINK_DEVICE`       | `--device-link`  | Stratus Duo `by-id` link       |
//! | `PADLINK_EVENT_ALIAS`  | `--event-path`   | `/tmp/gamepad-event`           |
//! | `PADLINK_JS_ALIAS`     | `--js-path`      | `/tmp/gamepad-js`              |
//! | `PADLINK_VIRTUAL_NAME` | `--virtual-name` | `VirtualGamepad`               |
//!
//! # Exit status
//!
//! | Status | Meaning                                          |
//! |--------|--------------------------------------------------|
//! | 0      | Stopped by SIGINT/SIGTERM                        |
//! | 1      | Invalid configuration                            |
//! | 2      | Command-line usage error                         |
//! | 3      | The physical device has no capabilities to copy  |
//! | 4      | The virtual device could not be created          |

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use padlink::domain::RelayConfig;
use padlink::infrastructure::storage::config::load_config;

/// Exit status for configuration errors.
const EXIT_CONFIG: u8 = 1;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Persistent virtual gamepad relay.
///
/// Mirrors a physical evdev controller onto a uinput device that outlives
/// disconnects.
#[derive(Debug, Parser)]
#[command(
    name = "padlink",
    about = "Relays a physical gamepad into a persistent virtual uinput device",
    version
)]
struct Cli {
    /// Event node of the physical controller.
    ///
    /// A udev `by-id` symlink survives re-enumeration; a plain
    /// `/dev/input/eventN` does not.
    #[arg(long, value_name = "PATH", env = "PADLINK_DEVICE")]
    device_link: Option<String>,

    /// Symlink to publish for the virtual device's event node.
    #[arg(long, value_name = "PATH", env = "PADLINK_EVENT_ALIAS")]
    event_path: Option<String>,

    /// Symlink to publish for the virtual device's joystick node.
    #[arg(long, value_name = "PATH", env = "PADLINK_JS_ALIAS")]
    js_path: Option<String>,

    /// Display name of the virtual device.
    #[arg(long, value_name = "NAME", env = "PADLINK_VIRTUAL_NAME")]
    virtual_name: Option<String>,

    /// Milliseconds between open attempts while the controller is absent.
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// Milliseconds to wait after the link is lost before polling again.
    #[arg(long, value_name = "MS")]
    backoff_ms: Option<u64>,

    /// Do not copy bus/vendor/product/version from the physical device.
    #[arg(long)]
    no_mirror_identity: bool,

    /// TOML configuration file.  Defaults to
    /// `$XDG_CONFIG_HOME/padlink/config.toml` when present.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Builds the [`RelayConfig`]: file values first, then these arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        let file = load_config(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("loading {}", path.display()),
            None => "loading default configuration file".to_string(),
        })?;
        let mut config = file.into_relay_config();

        if let Some(path) = self.device_link {
            config.device_path = PathBuf::from(path);
        }
        if let Some(path) = self.event_path {
            config.event_alias = PathBuf::from(path);
        }
        if let Some(path) = self.js_path {
            config.js_alias = PathBuf::from(path);
        }
        if let Some(name) = self.virtual_name {
            config.virtual_name = name;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.timing.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.backoff_ms {
            config.timing.backoff = Duration::from_millis(ms);
        }
        if self.no_mirror_identity {
            config.mirror_identity = false;
        }

        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Logging is initialised; `RUST_LOG` controls the level (default `info`).
/// 2. Arguments and the configuration file are merged into a [`RelayConfig`].
/// 3. The startup sequence waits for the controller, creates the virtual
///    device and publishes the aliases.
/// 4. The forwarding loop runs until SIGINT or SIGTERM.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.into_relay_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    run(config).await
}

#[cfg(target_os = "linux")]
async fn run(config: RelayConfig) -> ExitCode {
    use padlink::application::bootstrap::bootstrap;
    use padlink::infrastructure::discovery::SysfsAliasPublisher;
    use padlink::infrastructure::evdev_device::{EvdevFactory, EvdevOpener};
    use tracing::info;

    info!(
        "padlink {} relaying {} into {:?}",
        env!("CARGO_PKG_VERSION"),
        config.device_path.display(),
        config.virtual_name
    );

    let publisher = SysfsAliasPublisher::new(
        config.sysfs_input_root.clone(),
        config.dev_input_root.clone(),
    );

    let mut forwarder = tokio::select! {
        result = bootstrap(&config, EvdevOpener, EvdevFactory, &publisher) => match result {
            Ok(forwarder) => forwarder,
            Err(e) => {
                error!("{e}");
                return ExitCode::from(e.exit_code());
            }
        },
        () = shutdown_signal() => {
            info!("stopped before the virtual device was created");
            return ExitCode::SUCCESS;
        }
    };

    tokio::select! {
        never = forwarder.run() => match never {},
        () = shutdown_signal() => {}
    }

    let stats = forwarder.stats();
    info!(
        "stopped: {} events forwarded over {} sessions ({} reconnects)",
        stats.events_forwarded, stats.sessions, stats.reconnects
    );
    ExitCode::SUCCESS
}

#[cfg(not(target_os = "linux"))]
async fn run(_config: RelayConfig) -> ExitCode {
    error!("padlink needs the Linux evdev and uinput interfaces");
    ExitCode::FAILURE
}

/// Completes on the first SIGINT or SIGTERM.
#[cfg(target_os = "linux")]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    use tracing::info;

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = interrupt => info!("received SIGINT; shutting down"),
        () = terminate => info!("received SIGTERM; shutting down"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
