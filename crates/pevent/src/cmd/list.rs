use pevent_frame::SAMPLE_EVENTS;

use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_catalog, OutputFormat};

pub fn run(format: OutputFormat) -> CliResult<i32> {
    print_catalog(&SAMPLE_EVENTS, format);
    Ok(SUCCESS)
}
