use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pevent_frame::{parse_byte_literal, EventRecord, PlatformEventFrame};
use pevent_transport::{
    completion_code_str, BridgeListener, ChannelMedium, Request, Response, CMD_GET_CHANNEL_INFO,
    NETFN_APP,
};
use tracing::{debug, info, warn};

use crate::cmd::{ConnectArgs, ListenArgs};
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{EventPrinter, OutputFormat};

const CC_INVALID_COMMAND: u8 = 0xC1;
const CC_REQUEST_LENGTH_INVALID: u8 = 0xC7;

/// Medium the simulator reports unless `--medium` says otherwise.
const LISTEN_MEDIUM: ChannelMedium = ChannelMedium::SystemInterface;

pub fn run(args: ListenArgs, conn: &ConnectArgs, format: OutputFormat) -> CliResult<i32> {
    let ccode = parse_byte_literal(&args.completion_code).ok_or_else(|| {
        CliError::usage(format!(
            "invalid completion code: {}",
            args.completion_code
        ))
    })?;
    let medium = conn.medium.unwrap_or(LISTEN_MEDIUM);
    // Tables only render once complete; stream pretty lines instead.
    let format = match format {
        OutputFormat::Table => OutputFormat::Pretty,
        other => other,
    };

    let listener =
        BridgeListener::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;
    info!(
        path = %listener.path().display(),
        medium = %medium,
        ccode = %completion_code_str(ccode),
        "simulated controller ready"
    );

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printer = EventPrinter::new(format, medium);
    let mut events = 0usize;

    while running.load(Ordering::SeqCst) {
        let mut client = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        if let Some((uid, _gid, pid)) = client.peer_credentials() {
            debug!(uid, pid, "bridge client connected");
        }

        while running.load(Ordering::SeqCst) {
            let request = match client.recv_request() {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "dropping bridge client");
                    break;
                }
            };

            let (response, record) = answer(&request, medium, ccode);
            if let Err(err) = client.send_response(&response) {
                warn!(error = %err, "failed sending response");
                break;
            }

            if let Some(record) = record {
                let status = if response.is_success() {
                    "received"
                } else {
                    "rejected"
                };
                printer.record(None, status, &record);
                events = events.saturating_add(1);
                if args.count.is_some_and(|count| events >= count) {
                    printer.finish();
                    return Ok(SUCCESS);
                }
            }
        }
    }

    printer.finish();
    Ok(SUCCESS)
}

/// Answer one request the way a controller on `medium` would.
///
/// Returns the decoded record for well-formed platform events.
fn answer(request: &Request, medium: ChannelMedium, ccode: u8) -> (Response, Option<EventRecord>) {
    if request.netfn == NETFN_APP && request.cmd == CMD_GET_CHANNEL_INFO {
        let channel = request.data.first().copied().unwrap_or(0x0E);
        let data = vec![channel, medium.code(), 0x01, 0, 0, 0, 0, 0, 0];
        return (Response::new(0, data), None);
    }

    if !request.is_platform_event() {
        debug!(netfn = request.netfn, cmd = request.cmd, "unsupported command");
        return (Response::new(CC_INVALID_COMMAND, Vec::new()), None);
    }

    match PlatformEventFrame::decode(medium, &request.data) {
        Ok(frame) => (
            Response::new(ccode, Vec::new()),
            Some(EventRecord::decode(frame.fields())),
        ),
        Err(err) => {
            warn!(error = %err, "malformed platform event");
            (Response::new(CC_REQUEST_LENGTH_INVALID, Vec::new()), None)
        }
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use pevent_frame::SAMPLE_EVENTS;
    use pevent_transport::{CMD_PLATFORM_EVENT, NETFN_SENSOR_EVENT};

    use super::*;

    #[test]
    fn reports_configured_medium() {
        let (rsp, record) = answer(&Request::get_channel_info(), ChannelMedium::Lan8023, 0);
        assert!(rsp.is_success());
        assert_eq!(rsp.data[1], ChannelMedium::Lan8023.code());
        assert!(record.is_none());
    }

    #[test]
    fn acknowledges_well_formed_event() {
        let frame =
            PlatformEventFrame::build(ChannelMedium::SystemInterface, SAMPLE_EVENTS[0].fields);
        let (rsp, record) = answer(&frame.to_request(), ChannelMedium::SystemInterface, 0);
        assert!(rsp.is_success());
        assert_eq!(record.map(|r| r.sensor_num), Some(0x30));
    }

    #[test]
    fn rejects_frame_shaped_for_another_medium() {
        let frame = PlatformEventFrame::build(ChannelMedium::Ipmb, SAMPLE_EVENTS[0].fields);
        let (rsp, record) = answer(&frame.to_request(), ChannelMedium::SystemInterface, 0);
        assert_eq!(rsp.completion_code, CC_REQUEST_LENGTH_INVALID);
        assert!(record.is_none());
    }

    #[test]
    fn configured_completion_code_is_returned() {
        let req = Request::new(NETFN_SENSOR_EVENT, CMD_PLATFORM_EVENT, vec![0u8; 7]);
        let (rsp, record) = answer(&req, ChannelMedium::Ipmb, 0xC0);
        assert_eq!(rsp.completion_code, 0xC0);
        assert!(record.is_some());
    }

    #[test]
    fn unknown_commands_are_invalid() {
        let (rsp, _) = answer(&Request::new(0x0A, 0x40, Vec::new()), ChannelMedium::Ipmb, 0);
        assert_eq!(rsp.completion_code, CC_INVALID_COMMAND);
    }
}
