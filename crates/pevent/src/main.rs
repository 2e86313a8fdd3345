mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, ConnectArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "pevent", version, about = "Platform event injection CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(flatten)]
    connect: ConnectArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.connect, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from(["pevent", "--dry-run", "send", "1"])
            .expect("send args should parse");
        assert!(matches!(cli.command, Command::Send(_)));
        assert!(cli.connect.dry_run);
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "pevent",
            "file",
            "events.txt",
            "--socket",
            "/tmp/bmc.sock",
            "--medium",
            "lan",
            "--strict",
        ])
        .expect("file args should parse");
        assert!(matches!(cli.command, Command::File(_)));
        assert_eq!(
            cli.connect.medium,
            Some(pevent_transport::ChannelMedium::Lan8023)
        );
        assert!(cli.connect.strict);
    }

    #[test]
    fn file_without_path_still_parses() {
        let cli = Cli::try_parse_from(["pevent", "file"]).expect("missing path is checked later");
        match cli.command {
            Command::File(args) => assert!(args.path.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_medium() {
        let err = Cli::try_parse_from(["pevent", "--medium", "pigeon", "list"])
            .expect_err("unknown medium should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn decode_requires_bytes() {
        let err = Cli::try_parse_from(["pevent", "decode"]).expect_err("bytes are required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
