use pevent_frame::ParseMode;
use pevent_transport::ChannelMedium;

/// Options shared by single-event sends and batch replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectConfig {
    /// How event file fields are validated. Default: lenient.
    pub parse_mode: ParseMode,
    /// Use this medium instead of asking the interface.
    pub medium_override: Option<ChannelMedium>,
}
