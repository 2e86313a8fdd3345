//! Batch replay of an event file.
//!
//! Each non-blank line becomes one platform event. Lines are independent:
//! a line that fails to parse or to send is counted and logged, and replay
//! moves on to the next one. The batch fails if any line failed.

use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Lines};
use std::path::Path;

use pevent_frame::{
    hex_dump, parse_line_with, EventRecord, ParseError, ParseMode, ParsedLine, PlatformEventFrame,
};
use pevent_transport::{ChannelMedium, Interface, PrivilegeLevel, PrivilegeNegotiator as _};
use tracing::{error, info, warn};

use crate::config::InjectConfig;
use crate::error::{InjectError, Result};
use crate::sender::{resolve_medium, transmit};

/// What happened to one line.
#[derive(Debug)]
pub enum LineOutcomeKind {
    /// Whitespace or comment only; nothing sent.
    Blank,
    /// The line could not be parsed; nothing sent.
    ParseFailed(ParseError),
    /// The line could not be read (for example, it is not valid UTF-8).
    ReadFailed(io::Error),
    /// The event was sent and acknowledged.
    Sent(EventRecord),
    /// The event was built but the controller rejected it or did not answer.
    SendFailed {
        record: EventRecord,
        error: InjectError,
    },
}

#[derive(Debug)]
pub struct LineOutcome {
    /// 1-based line number.
    pub line_no: usize,
    pub kind: LineOutcomeKind,
}

impl LineOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            LineOutcomeKind::ParseFailed(_)
                | LineOutcomeKind::ReadFailed(_)
                | LineOutcomeKind::SendFailed { .. }
        )
    }
}

/// Aggregate result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Success,
    Failure,
}

impl OverallStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Running totals for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub lines: usize,
    pub blank: usize,
    pub sent: usize,
    pub parse_failures: usize,
    pub read_failures: usize,
    pub send_failures: usize,
}

impl ReplaySummary {
    pub fn failures(&self) -> usize {
        self.parse_failures + self.read_failures + self.send_failures
    }

    /// Failure if and only if at least one line failed.
    pub fn status(&self) -> OverallStatus {
        if self.failures() == 0 {
            OverallStatus::Success
        } else {
            OverallStatus::Failure
        }
    }

    fn record(&mut self, kind: &LineOutcomeKind) {
        self.lines += 1;
        match kind {
            LineOutcomeKind::Blank => self.blank += 1,
            LineOutcomeKind::ParseFailed(_) => self.parse_failures += 1,
            LineOutcomeKind::ReadFailed(_) => self.read_failures += 1,
            LineOutcomeKind::Sent(_) => self.sent += 1,
            LineOutcomeKind::SendFailed { .. } => self.send_failures += 1,
        }
    }
}

/// Lazy, strictly sequential replay over a source of lines.
///
/// Yields one [`LineOutcome`] per line read. Each event is sent and its
/// response awaited before the next line is read.
pub struct Replay<'a, I: ?Sized, L> {
    intf: &'a mut I,
    lines: L,
    medium: ChannelMedium,
    parse_mode: ParseMode,
    line_no: usize,
    done: bool,
    summary: ReplaySummary,
}

impl<'a, I, L> Replay<'a, I, L>
where
    I: Interface + ?Sized,
    L: Iterator<Item = io::Result<String>>,
{
    /// Prepare a batch: request administrator privilege and resolve the
    /// channel medium once for every line.
    pub fn new(intf: &'a mut I, lines: L, config: &InjectConfig) -> Result<Self> {
        intf.set_privilege_level(PrivilegeLevel::Administrator);
        let medium = resolve_medium(&mut *intf, config)?;
        Ok(Self {
            intf,
            lines,
            medium,
            parse_mode: config.parse_mode,
            line_no: 0,
            done: false,
            summary: ReplaySummary::default(),
        })
    }

    /// Medium every frame of this batch is built for.
    pub fn medium(&self) -> ChannelMedium {
        self.medium
    }

    /// Totals for the lines consumed so far.
    pub fn summary(&self) -> ReplaySummary {
        self.summary
    }

    /// Consume the remaining lines and return the totals.
    pub fn finish(mut self) -> ReplaySummary {
        for _ in self.by_ref() {}
        self.summary
    }

    fn process(&mut self, raw: &str) -> LineOutcomeKind {
        let fields = match parse_line_with(raw, self.parse_mode) {
            Ok(ParsedLine::Blank) => return LineOutcomeKind::Blank,
            Ok(ParsedLine::Event(fields)) => fields,
            Err(err) => {
                match &err {
                    ParseError::TooFewFields { partial, .. } => error!(
                        line = self.line_no,
                        raw = raw.trim_end(),
                        partial = %hex_dump(partial),
                        "Invalid Event: {err}"
                    ),
                    _ => error!(
                        line = self.line_no,
                        raw = raw.trim_end(),
                        "Invalid Event: {err}"
                    ),
                }
                return LineOutcomeKind::ParseFailed(err);
            }
        };

        let frame = PlatformEventFrame::build(self.medium, fields);
        let record = EventRecord::decode(frame.fields());
        info!(line = self.line_no, "{record}");

        match transmit(&mut *self.intf, &frame) {
            Ok(()) => LineOutcomeKind::Sent(record),
            Err(error) => {
                warn!(line = self.line_no, "event not delivered: {error}");
                LineOutcomeKind::SendFailed { record, error }
            }
        }
    }
}

impl<'a, I, L> Iterator for Replay<'a, I, L>
where
    I: Interface + ?Sized,
    L: Iterator<Item = io::Result<String>>,
{
    type Item = LineOutcome;

    fn next(&mut self) -> Option<LineOutcome> {
        if self.done {
            return None;
        }
        let next = match self.lines.next() {
            Some(next) => next,
            None => {
                self.done = true;
                return None;
            }
        };
        self.line_no += 1;

        let kind = match next {
            Ok(raw) => self.process(&raw),
            Err(err) => {
                error!(line = self.line_no, "failed to read line: {err}");
                // Only undecodable lines are skippable; anything else ends the batch.
                if err.kind() != ErrorKind::InvalidData {
                    self.done = true;
                }
                LineOutcomeKind::ReadFailed(err)
            }
        };

        self.summary.record(&kind);
        Some(LineOutcome {
            line_no: self.line_no,
            kind,
        })
    }
}

impl<'a, I> Replay<'a, I, Lines<BufReader<File>>>
where
    I: Interface + ?Sized,
{
    /// Open `path` and prepare to replay it. The file is closed when the
    /// replay is dropped.
    pub fn from_file(intf: &'a mut I, path: &Path, config: &InjectConfig) -> Result<Self> {
        let file = File::open(path).map_err(|source| {
            error!(path = %path.display(), "failed to open event file: {source}");
            InjectError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::new(intf, BufReader::new(file).lines(), config)
    }
}

/// Replay in-memory lines and return the totals.
pub fn replay_lines<I, S>(
    intf: &mut I,
    lines: impl IntoIterator<Item = S>,
    config: &InjectConfig,
) -> Result<ReplaySummary>
where
    I: Interface + ?Sized,
    S: Into<String>,
{
    let lines = lines.into_iter().map(|line| Ok(line.into()));
    Ok(Replay::new(intf, lines, config)?.finish())
}

/// Replay every line of the event file at `path` and return the totals.
///
/// Failing to open the file is fatal. Per-line failures are not.
pub fn replay_file<I: Interface + ?Sized>(
    intf: &mut I,
    path: &Path,
    config: &InjectConfig,
) -> Result<ReplaySummary> {
    Ok(Replay::from_file(intf, path, config)?.finish())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pevent_frame::SOFTWARE_GENERATOR_ID;
    use pevent_transport::{Loopback, ScriptedReply};

    use super::*;

    const MIXED: [&str; 6] = [
        "# injected faults",
        "0x04 0x01 0x30 0x01 0x59 0x00 0x00 # temp high",
        "4 2 0x60 1 0x52 0 0",
        "1 2 3",
        "",
        "0x04 0x0c 0x53 0x6f 0x00 0x00 0x00 extra",
    ];

    #[test]
    fn three_valid_one_malformed() {
        let mut lb = Loopback::recording(ChannelMedium::Ipmb);
        let summary = replay_lines(&mut lb, MIXED, &InjectConfig::default()).unwrap();

        assert_eq!(summary.sent, 3);
        assert_eq!(summary.parse_failures, 1);
        assert_eq!(summary.blank, 2);
        assert_eq!(summary.lines, 6);
        assert_eq!(summary.status(), OverallStatus::Failure);
        assert_eq!(lb.platform_events().count(), 3);
    }

    #[test]
    fn all_valid_lines_succeed() {
        let mut lb = Loopback::recording(ChannelMedium::Ipmb);
        let summary = replay_lines(
            &mut lb,
            ["4 1 48 1 89 0 0", "   # comment", "4 1 48 0x81 89 0 0"],
            &InjectConfig::default(),
        )
        .unwrap();
        assert_eq!(summary.sent, 2);
        assert!(summary.status().is_success());
    }

    #[test]
    fn medium_resolved_once_and_applied_to_every_line() {
        let mut lb = Loopback::recording(ChannelMedium::SystemInterface);
        replay_lines(&mut lb, MIXED, &InjectConfig::default()).unwrap();

        let channel_queries = lb.requests().iter().filter(|r| !r.is_platform_event()).count();
        assert_eq!(channel_queries, 1);
        for req in lb.platform_events() {
            assert_eq!(req.data.len(), 8);
            assert_eq!(req.data[0], SOFTWARE_GENERATOR_ID);
        }
        assert_eq!(lb.privilege(), Some(PrivilegeLevel::Administrator));
    }

    #[test]
    fn send_failures_do_not_stop_the_batch() {
        let mut lb = Loopback::recording(ChannelMedium::Lan8023)
            .with_script([ScriptedReply::NoResponse, ScriptedReply::Respond(0xC0)]);
        let lines = ["4 1 48 1 89 0 0", "4 1 48 1 89 0 0", "4 1 48 1 89 0 0"];
        let summary = replay_lines(&mut lb, lines, &InjectConfig::default()).unwrap();

        assert_eq!(summary.send_failures, 2);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.status(), OverallStatus::Failure);
        assert_eq!(lb.platform_events().count(), 3);
    }

    #[test]
    fn outcomes_are_yielded_per_line() {
        let mut lb = Loopback::recording(ChannelMedium::Ipmb);
        let lines = MIXED.iter().map(|l| Ok(l.to_string()));
        let outcomes: Vec<_> = Replay::new(&mut lb, lines, &InjectConfig::default())
            .unwrap()
            .collect();

        assert_eq!(outcomes.len(), 6);
        assert!(matches!(outcomes[0].kind, LineOutcomeKind::Blank));
        assert!(matches!(outcomes[1].kind, LineOutcomeKind::Sent(_)));
        assert_eq!(outcomes[3].line_no, 4);
        assert!(matches!(
            outcomes[3].kind,
            LineOutcomeKind::ParseFailed(ParseError::TooFewFields { found: 3, .. })
        ));
        assert!(outcomes[3].is_failure());
    }

    #[test]
    fn strict_mode_rejects_junk_that_lenient_accepts() {
        let lines = ["4 1 48 1 89 0 junk"];

        let mut lb = Loopback::recording(ChannelMedium::Ipmb);
        let lenient = replay_lines(&mut lb, lines, &InjectConfig::default()).unwrap();
        assert_eq!(lenient.sent, 1);

        let mut lb = Loopback::recording(ChannelMedium::Ipmb);
        let strict = InjectConfig {
            parse_mode: ParseMode::Strict,
            ..InjectConfig::default()
        };
        let summary = replay_lines(&mut lb, lines, &strict).unwrap();
        assert_eq!(summary.parse_failures, 1);
        assert_eq!(lb.platform_events().count(), 0);
    }

    #[test]
    fn invalid_utf8_line_is_skipped() {
        let data: Vec<u8> = b"4 1 48 1 89 0 0\n\xff\xfe\n4 1 48 1 89 0 0\n".to_vec();
        let lines = BufReader::new(Cursor::new(data)).lines();
        let mut lb = Loopback::recording(ChannelMedium::Ipmb);
        let summary = Replay::new(&mut lb, lines, &InjectConfig::default())
            .unwrap()
            .finish();

        assert_eq!(summary.sent, 2);
        assert_eq!(summary.read_failures, 1);
        assert_eq!(summary.status(), OverallStatus::Failure);
    }

    #[test]
    fn replay_file_reads_from_disk() {
        let dir = std::env::temp_dir().join(format!("pevent-replay-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("events.txt");
        std::fs::write(&path, MIXED.join("\n")).unwrap();

        let mut lb = Loopback::recording(ChannelMedium::Ipmb);
        let summary = replay_file(&mut lb, &path, &InjectConfig::default()).unwrap();
        assert_eq!(summary.sent, 3);
        assert_eq!(summary.parse_failures, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_fatal() {
        let mut lb = Loopback::recording(ChannelMedium::Ipmb);
        let err = replay_file(
            &mut lb,
            Path::new("/nonexistent/pevent/events.txt"),
            &InjectConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InjectError::Open { .. }));
        assert_eq!(lb.platform_events().count(), 0);
    }
}
