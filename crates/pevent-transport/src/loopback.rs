//! In-memory transport for dry runs and tests.

use std::collections::VecDeque;

use bytes::Bytes;
use tracing::debug;

use crate::error::Result;
use crate::message::{
    ChannelMedium, PrivilegeLevel, Request, Response, CMD_GET_CHANNEL_INFO, NETFN_APP,
};
use crate::traits::{query_channel_medium, MediumResolver, PrivilegeNegotiator, Transport};

/// How the loopback answers the next non-channel-info request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Respond with this completion code.
    Respond(u8),
    /// Produce no response at all.
    NoResponse,
}

/// Transport that answers in memory.
///
/// Get Channel Info is answered with the configured medium. Every other
/// request consumes one [`ScriptedReply`]; once the script is exhausted
/// requests succeed.
///
/// Requests are only counted unless the loopback was created with
/// [`Loopback::recording`], so a long dry run stays flat in memory.
#[derive(Debug)]
pub struct Loopback {
    medium: ChannelMedium,
    privilege: Option<PrivilegeLevel>,
    script: VecDeque<ScriptedReply>,
    requests: Option<Vec<Request>>,
    request_count: usize,
    platform_event_count: usize,
}

impl Loopback {
    pub fn new(medium: ChannelMedium) -> Self {
        Self {
            medium,
            privilege: None,
            script: VecDeque::new(),
            requests: None,
            request_count: 0,
            platform_event_count: 0,
        }
    }

    /// Like [`Loopback::new`], but keeps a copy of every request.
    pub fn recording(medium: ChannelMedium) -> Self {
        Self {
            requests: Some(Vec::new()),
            ..Self::new(medium)
        }
    }

    /// Queue replies for upcoming requests.
    pub fn with_script(mut self, replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        self.script.extend(replies);
        self
    }

    /// Every request seen so far, in order. Empty unless recording.
    pub fn requests(&self) -> &[Request] {
        self.requests.as_deref().unwrap_or_default()
    }

    /// Only the recorded Platform Event Message requests.
    pub fn platform_events(&self) -> impl Iterator<Item = &Request> {
        self.requests().iter().filter(|req| req.is_platform_event())
    }

    /// Number of requests answered, recorded or not.
    pub fn request_count(&self) -> usize {
        self.request_count
    }

    /// Number of Platform Event Message requests answered.
    pub fn platform_event_count(&self) -> usize {
        self.platform_event_count
    }

    /// Privilege last requested through [`PrivilegeNegotiator`].
    pub fn privilege(&self) -> Option<PrivilegeLevel> {
        self.privilege
    }

    pub fn medium(&self) -> ChannelMedium {
        self.medium
    }
}

impl Transport for Loopback {
    fn send_recv(&mut self, request: &Request) -> Result<Option<Response>> {
        debug!(
            netfn = request.netfn,
            cmd = request.cmd,
            len = request.data.len(),
            "loopback request"
        );
        self.request_count += 1;
        if request.is_platform_event() {
            self.platform_event_count += 1;
        }
        if let Some(requests) = self.requests.as_mut() {
            requests.push(request.clone());
        }

        if request.netfn == NETFN_APP && request.cmd == CMD_GET_CHANNEL_INFO {
            let data = Bytes::from(vec![
                0x0E,
                self.medium.code(),
                0x01,
                0x00,
                0x00,
                0x00,
                0x00,
                0x00,
                0x00,
            ]);
            return Ok(Some(Response::new(0, data)));
        }

        match self.script.pop_front() {
            Some(ScriptedReply::NoResponse) => Ok(None),
            Some(ScriptedReply::Respond(code)) => Ok(Some(Response::new(code, Bytes::new()))),
            None => Ok(Some(Response::ok())),
        }
    }
}

impl MediumResolver for Loopback {
    fn current_channel_medium(&mut self) -> Result<ChannelMedium> {
        query_channel_medium(self)
    }
}

impl PrivilegeNegotiator for Loopback {
    fn set_privilege_level(&mut self, level: PrivilegeLevel) {
        debug!(privilege = level.name(), "loopback privilege level set");
        self.privilege = Some(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CMD_PLATFORM_EVENT, NETFN_SENSOR_EVENT};

    fn event() -> Request {
        Request::new(NETFN_SENSOR_EVENT, CMD_PLATFORM_EVENT, vec![0u8; 7])
    }

    #[test]
    fn answers_channel_info_with_configured_medium() {
        let mut lb = Loopback::recording(ChannelMedium::Lan8023);
        assert_eq!(lb.current_channel_medium().unwrap(), ChannelMedium::Lan8023);
        assert_eq!(lb.requests().len(), 1);
        assert_eq!(lb.platform_events().count(), 0);
    }

    #[test]
    fn follows_script_then_succeeds() {
        let mut lb = Loopback::recording(ChannelMedium::Ipmb)
            .with_script([ScriptedReply::Respond(0xC0), ScriptedReply::NoResponse]);

        let first = lb.send_recv(&event()).unwrap().unwrap();
        assert_eq!(first.completion_code, 0xC0);
        assert!(lb.send_recv(&event()).unwrap().is_none());
        assert!(lb.send_recv(&event()).unwrap().unwrap().is_success());
        assert_eq!(lb.platform_events().count(), 3);
    }

    #[test]
    fn counts_without_keeping_requests() {
        let mut lb = Loopback::new(ChannelMedium::SystemInterface);
        lb.current_channel_medium().unwrap();
        for _ in 0..1000 {
            lb.send_recv(&event()).unwrap();
        }
        assert_eq!(lb.request_count(), 1001);
        assert_eq!(lb.platform_event_count(), 1000);
        assert!(lb.requests().is_empty());
        assert_eq!(lb.platform_events().count(), 0);
    }

    #[test]
    fn records_privilege() {
        let mut lb = Loopback::new(ChannelMedium::Ipmb);
        assert_eq!(lb.privilege(), None);
        lb.set_privilege_level(PrivilegeLevel::Administrator);
        assert_eq!(lb.privilege(), Some(PrivilegeLevel::Administrator));
    }
}
