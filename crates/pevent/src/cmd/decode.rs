use pevent_frame::{
    parse_byte_literal, EventRecord, PlatformEventFrame, SYSTEM_INTERFACE_FRAME_LEN,
};
use pevent_transport::ChannelMedium;

use crate::cmd::{ConnectArgs, DecodeArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::{EventPrinter, OutputFormat};

pub fn run(args: DecodeArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = args
        .bytes
        .iter()
        .map(|token| {
            parse_byte_literal(token)
                .ok_or_else(|| CliError::usage(format!("not a byte value: {token}")))
        })
        .collect::<CliResult<Vec<u8>>>()?;

    let medium = conn.medium.unwrap_or_else(|| infer_medium(bytes.len()));
    let frame = PlatformEventFrame::decode(medium, &bytes)
        .map_err(|err| frame_error("decode failed", err))?;

    let mut printer = EventPrinter::new(format, medium);
    printer.record(None, "decoded", &EventRecord::decode(frame.fields()));
    printer.finish();

    Ok(SUCCESS)
}

/// Without `--medium`, an 8-byte frame can only have come over the system interface.
fn infer_medium(len: usize) -> ChannelMedium {
    if len == SYSTEM_INTERFACE_FRAME_LEN {
        ChannelMedium::SystemInterface
    } else {
        ChannelMedium::Ipmb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_medium_from_length() {
        assert_eq!(infer_medium(8), ChannelMedium::SystemInterface);
        assert_eq!(infer_medium(7), ChannelMedium::Ipmb);
    }
}
