use pevent_inject::Replay;
use tracing::info;

use crate::cmd::{ConnectArgs, FileArgs};
use crate::exit::{inject_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_summary, EventPrinter, OutputFormat};

pub fn run(args: FileArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let Some(path) = args.path else {
        return Err(CliError::usage("usage: pevent file <filename>"));
    };

    let mut intf = conn.open()?;
    let mut replay = Replay::from_file(intf.as_mut(), &path, &conn.inject_config())
        .map_err(|err| inject_error("replay failed", err))?;
    info!(path = %path.display(), medium = %replay.medium(), "replaying event file");

    let mut printer = EventPrinter::new(format, replay.medium());
    for outcome in replay.by_ref() {
        printer.outcome(&outcome);
    }
    printer.finish();

    let summary = replay.summary();
    print_summary(&summary, format);

    if summary.status().is_success() {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}
