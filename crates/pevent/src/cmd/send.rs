use pevent_frame::parse_byte_literal;
use pevent_inject::send_sample_event;

use crate::cmd::{ConnectArgs, SendArgs};
use crate::exit::{inject_error, CliError, CliResult, SUCCESS};
use crate::output::{EventPrinter, OutputFormat};

pub fn run(args: SendArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let num = parse_byte_literal(&args.num)
        .ok_or_else(|| CliError::usage(format!("invalid event number: {}", args.num)))?;

    let mut intf = conn.open()?;
    let sent = send_sample_event(intf.as_mut(), num, &conn.inject_config())
        .map_err(|err| inject_error("send failed", err))?;

    let mut printer = EventPrinter::new(format, sent.medium);
    printer.record(None, "sent", &sent.record);
    printer.finish();

    Ok(SUCCESS)
}
