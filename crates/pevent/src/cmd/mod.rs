use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use pevent_frame::ParseMode;
use pevent_inject::InjectConfig;
use pevent_transport::{BridgeConfig, ChannelMedium, Interface, Loopback, UnixBridge};
use tracing::debug;

use crate::exit::{transport_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod file;
pub mod list;
pub mod listen;
pub mod send;
pub mod version;

/// Medium a dry run pretends to be on unless `--medium` says otherwise.
const DRY_RUN_MEDIUM: ChannelMedium = ChannelMedium::SystemInterface;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a numbered sample event.
    Send(SendArgs),
    /// Replay every event described in a file.
    File(FileArgs),
    /// List the sample events and usage.
    List,
    /// Decode raw frame bytes without sending them.
    Decode(DecodeArgs),
    /// Run a simulated controller that acknowledges platform events.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, conn, format),
        Command::File(args) => file::run(args, conn, format),
        Command::List => list::run(format),
        Command::Decode(args) => decode::run(args, conn, format),
        Command::Listen(args) => listen::run(args, conn, format),
        Command::Version(args) => version::run(args),
    }
}

/// How to reach the management controller.
#[derive(Args, Debug, Default)]
pub struct ConnectArgs {
    /// Management bridge socket.
    #[arg(long, value_name = "PATH", env = "PEVENT_SOCKET", global = true)]
    pub socket: Option<PathBuf>,

    /// Do not contact a controller; acknowledge every event locally.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Channel medium to assume instead of querying it (system, ipmb, lan, ...).
    #[arg(long, value_name = "MEDIUM", global = true)]
    pub medium: Option<ChannelMedium>,

    /// Reject event file fields that are not complete one-byte literals.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub timeout: String,
}

impl ConnectArgs {
    pub fn inject_config(&self) -> InjectConfig {
        InjectConfig {
            parse_mode: if self.strict {
                ParseMode::Strict
            } else {
                ParseMode::Lenient
            },
            medium_override: self.medium,
        }
    }

    /// Open the interface selected on the command line.
    pub fn open(&self) -> CliResult<Box<dyn Interface>> {
        if self.dry_run {
            let medium = self.medium.unwrap_or(DRY_RUN_MEDIUM);
            debug!(medium = %medium, "dry run: events are acknowledged locally");
            return Ok(Box::new(Loopback::new(medium)));
        }

        let Some(path) = &self.socket else {
            return Err(CliError::usage(
                "no management bridge: pass --socket PATH (or set PEVENT_SOCKET), or --dry-run",
            ));
        };
        let timeout = parse_duration(&self.timeout)?;
        let config = BridgeConfig {
            read_timeout: Some(timeout),
            write_timeout: Some(timeout),
            medium_override: self.medium,
        };
        let bridge = UnixBridge::connect_with_config(path, config)
            .map_err(|err| transport_error("connect failed", err))?;
        Ok(Box::new(bridge))
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Sample event number (see `pevent list`).
    pub num: String,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Event file: seven byte fields per line, `#` starts a comment.
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes (7, or 8 with a leading generator id on the system interface).
    #[arg(required = true, num_args = 1..)]
    pub bytes: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Exit after acknowledging N platform events.
    #[arg(long)]
    pub count: Option<usize>,
    /// Completion code to answer platform events with.
    #[arg(long, default_value = "0")]
    pub completion_code: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
