use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pevent_frame::{hex_dump, EventRecord, SampleEvent};
use pevent_inject::{LineOutcome, LineOutcomeKind, ReplaySummary};
use pevent_transport::ChannelMedium;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    status: &'a str,
    medium: String,
    sensor_type_name: &'a str,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    record: &'a EventRecord,
}

#[derive(Serialize)]
struct SummaryOutput {
    status: &'static str,
    lines: usize,
    blank: usize,
    sent: usize,
    parse_failures: usize,
    read_failures: usize,
    send_failures: usize,
}

/// Prints decoded events. Table output is buffered and rendered on `finish`.
pub struct EventPrinter {
    format: OutputFormat,
    medium: ChannelMedium,
    table: Option<Table>,
    rows: usize,
}

impl EventPrinter {
    pub fn new(format: OutputFormat, medium: ChannelMedium) -> Self {
        let table = matches!(format, OutputFormat::Table).then(|| {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "LINE", "STATUS", "SENSOR", "NUMBER", "EVENT", "DIRECTION", "DATA",
                ]);
            table
        });
        Self {
            format,
            medium,
            table,
            rows: 0,
        }
    }

    pub fn record(&mut self, line: Option<usize>, status: &str, record: &EventRecord) {
        self.emit(line, status, record, None);
    }

    /// Print one replay outcome. Blank lines and parse failures produce no
    /// event output; they are reported through logging and the summary.
    pub fn outcome(&mut self, outcome: &LineOutcome) {
        match &outcome.kind {
            LineOutcomeKind::Sent(record) => self.emit(Some(outcome.line_no), "sent", record, None),
            LineOutcomeKind::SendFailed { record, error } => self.emit(
                Some(outcome.line_no),
                "failed",
                record,
                Some(error.to_string()),
            ),
            LineOutcomeKind::Blank
            | LineOutcomeKind::ParseFailed(_)
            | LineOutcomeKind::ReadFailed(_) => {}
        }
    }

    fn emit(
        &mut self,
        line: Option<usize>,
        status: &str,
        record: &EventRecord,
        error: Option<String>,
    ) {
        match self.format {
            OutputFormat::Json => {
                let out = EventOutput {
                    line,
                    status,
                    medium: self.medium.to_string(),
                    sensor_type_name: record.sensor_type_name(),
                    description: record.description(),
                    error,
                    record,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table => {
                if let Some(table) = self.table.as_mut() {
                    self.rows += 1;
                    table.add_row(vec![
                        line.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string()),
                        match error {
                            Some(err) => format!("{status}: {err}"),
                            None => status.to_string(),
                        },
                        record.sensor_type_name().to_string(),
                        format!("0x{:02x}", record.sensor_num),
                        record.description(),
                        record.event_direction.label().to_string(),
                        hex_dump(&record.event_data),
                    ]);
                }
            }
            OutputFormat::Pretty => {
                let prefix = line.map(|l| format!("line {l}: ")).unwrap_or_default();
                match error {
                    Some(err) => println!("{prefix}{status} {record} ({err})"),
                    None => println!("{prefix}{status} {record}"),
                }
            }
        }
    }

    /// Flush buffered output.
    pub fn finish(self) {
        if let Some(table) = self.table {
            if self.rows > 0 {
                println!("{table}");
            }
        }
    }
}

pub fn print_summary(summary: &ReplaySummary, format: OutputFormat) {
    let status = if summary.status().is_success() {
        "success"
    } else {
        "failure"
    };
    match format {
        OutputFormat::Json => {
            let out = SummaryOutput {
                status,
                lines: summary.lines,
                blank: summary.blank,
                sent: summary.sent,
                parse_failures: summary.parse_failures,
                read_failures: summary.read_failures,
                send_failures: summary.send_failures,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!(
                "{status}: {} lines, {} sent, {} parse failures, {} read failures, {} send failures",
                summary.lines,
                summary.sent,
                summary.parse_failures,
                summary.read_failures,
                summary.send_failures
            );
        }
    }
}

pub fn print_catalog(events: &[SampleEvent], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = events
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "id": e.id,
                        "description": e.description,
                        "fields": hex_dump(&e.fields.to_bytes()),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "DESCRIPTION", "FIELDS"]);
            for e in events {
                table.add_row(vec![
                    e.id.to_string(),
                    e.description.to_string(),
                    hex_dump(&e.fields.to_bytes()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("usage: pevent send <num>");
            for e in events {
                println!("   {} : {}", e.id, e.description);
            }
            println!("usage: pevent file <filename>");
            println!("   Will read list of events from file");
        }
    }
}
