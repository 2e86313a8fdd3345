use pevent_frame::{sample_event, EventFields, EventRecord, PlatformEventFrame};
use pevent_transport::{
    completion_code_str, ChannelMedium, Interface, MediumResolver, PrivilegeLevel,
    PrivilegeNegotiator as _, Transport,
};
use tracing::{debug, error, info};

use crate::config::InjectConfig;
use crate::error::{InjectError, Result};

/// An event the controller accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEvent {
    pub medium: ChannelMedium,
    pub frame: PlatformEventFrame,
    pub record: EventRecord,
}

/// Send canned sample event `id`.
///
pub fn send_sample_event<I: Interface + ?Sized>(
    intf: &mut I,
    id: u8,
    config: &InjectConfig,
) -> Result<SentEvent> {
    let sample = sample_event(id).ok_or_else(|| {
        error!(id, "invalid event number");
        InjectError::UnknownSample(id)
    })?;
    info!(id, "Sending SAMPLE event: {}", sample.description);
    send_platform_event(intf, sample.fields, config)
}

/// Send one platform event built from `fields`.
///
/// Requests administrator privilege, resolves the channel medium once and
/// reports any missing response or non-zero completion code as an error.
pub fn send_platform_event<I: Interface + ?Sized>(
    intf: &mut I,
    fields: EventFields,
    config: &InjectConfig,
) -> Result<SentEvent> {
    intf.set_privilege_level(PrivilegeLevel::Administrator);
    let medium = resolve_medium(&mut *intf, config)?;
    let frame = PlatformEventFrame::build(medium, fields);
    transmit(intf, &frame)?;
    Ok(SentEvent {
        medium,
        record: EventRecord::decode(frame.fields()),
        frame,
    })
}

pub(crate) fn resolve_medium<M: MediumResolver + ?Sized>(
    intf: &mut M,
    config: &InjectConfig,
) -> Result<ChannelMedium> {
    let medium = match config.medium_override {
        Some(medium) => medium,
        None => intf.current_channel_medium()?,
    };
    debug!(medium = %medium, "using channel medium");
    Ok(medium)
}

/// One Platform Event Message exchange.
pub(crate) fn transmit<T: Transport + ?Sized>(
    transport: &mut T,
    frame: &PlatformEventFrame,
) -> Result<()> {
    let request = frame.to_request();
    debug!(bytes = ?request.data.as_ref(), "sending platform event");

    match transport.send_recv(&request)? {
        None => {
            error!("Platform Event Message command failed");
            Err(InjectError::NoResponse)
        }
        Some(rsp) if !rsp.is_success() => {
            let message = completion_code_str(rsp.completion_code).into_owned();
            error!(
                ccode = rsp.completion_code,
                "Platform Event Message command failed: {message}"
            );
            Err(InjectError::CompletionCode {
                code: rsp.completion_code,
                message,
            })
        }
        Some(_) => Ok(()),
    }
}
