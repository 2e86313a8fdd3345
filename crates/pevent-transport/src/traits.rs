use tracing::debug;

use crate::error::{Result, TransportError};
use crate::message::{completion_code_str, ChannelMedium, PrivilegeLevel, Request, Response};

/// One blocking request/response exchange with a management controller.
pub trait Transport {
    /// Send `request` and wait for its response.
    ///
    /// `Ok(None)` means the controller produced no response. Errors are
    /// reserved for the transport itself failing.
    fn send_recv(&mut self, request: &Request) -> Result<Option<Response>>;
}

/// Reports the medium of the channel the session is using.
pub trait MediumResolver {
    fn current_channel_medium(&mut self) -> Result<ChannelMedium>;
}

/// Raises or lowers the privilege requested for subsequent commands.
pub trait PrivilegeNegotiator {
    fn set_privilege_level(&mut self, level: PrivilegeLevel);
}

/// Everything a platform event sender needs from its session.
pub trait Interface: Transport + MediumResolver + PrivilegeNegotiator {}

impl<T: Transport + MediumResolver + PrivilegeNegotiator + ?Sized> Interface for T {}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_recv(&mut self, request: &Request) -> Result<Option<Response>> {
        (**self).send_recv(request)
    }
}

impl<T: MediumResolver + ?Sized> MediumResolver for &mut T {
    fn current_channel_medium(&mut self) -> Result<ChannelMedium> {
        (**self).current_channel_medium()
    }
}

impl<T: PrivilegeNegotiator + ?Sized> PrivilegeNegotiator for &mut T {
    fn set_privilege_level(&mut self, level: PrivilegeLevel) {
        (**self).set_privilege_level(level)
    }
}

/// Resolve the current channel medium with a Get Channel Info request.
pub fn query_channel_medium<T: Transport + ?Sized>(transport: &mut T) -> Result<ChannelMedium> {
    let rsp = transport
        .send_recv(&Request::get_channel_info())?
        .ok_or_else(|| TransportError::MediumQuery("no response to Get Channel Info".into()))?;

    if !rsp.is_success() {
        return Err(TransportError::MediumQuery(format!(
            "Get Channel Info failed: {}",
            completion_code_str(rsp.completion_code)
        )));
    }

    let code = *rsp.data.get(1).ok_or_else(|| {
        TransportError::MediumQuery(format!(
            "Get Channel Info response too short ({} bytes)",
            rsp.data.len()
        ))
    })?;

    let medium = ChannelMedium::from_code(code);
    debug!(medium = %medium, "resolved current channel medium");
    Ok(medium)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    struct Canned(VecDeque<Option<Response>>);

    impl Transport for Canned {
        fn send_recv(&mut self, _request: &Request) -> Result<Option<Response>> {
            Ok(self.0.pop_front().flatten())
        }
    }

    #[test]
    fn query_reads_medium_byte() {
        let mut t = Canned(VecDeque::from([Some(Response::new(
            0,
            vec![0x0E, 0x0C, 0x05, 0x00],
        ))]));
        assert_eq!(
            query_channel_medium(&mut t).unwrap(),
            ChannelMedium::SystemInterface
        );
    }

    #[test]
    fn query_fails_without_response() {
        let mut t = Canned(VecDeque::from([None]));
        assert!(matches!(
            query_channel_medium(&mut t),
            Err(TransportError::MediumQuery(_))
        ));
    }

    #[test]
    fn query_fails_on_completion_code() {
        let mut t = Canned(VecDeque::from([Some(Response::new(0xC1, Vec::new()))]));
        let err = query_channel_medium(&mut t).unwrap_err();
        assert!(err.to_string().contains("Invalid command"));
    }

    #[test]
    fn query_fails_on_short_response() {
        let mut t = Canned(VecDeque::from([Some(Response::new(0, vec![0x0E]))]));
        assert!(query_channel_medium(&mut t).is_err());
    }
}
