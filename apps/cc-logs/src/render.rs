use cc_logs_core::proto::LogRecord;
use cc_logs_format::{AnsiPart, TimestampDisplay, Timezone, decode, format_parts};

use crate::config::DisplayConfig;

const SGR_RESET: &str = "\x1b[0m";
const SGR_DIM: &str = "\x1b[2m";

/// Turns records into terminal lines.
#[derive(Debug, Clone)]
pub struct Renderer {
    timestamps: TimestampDisplay,
    timezone: Timezone,
    color: bool,
    show_instance: bool,
}

impl Renderer {
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            timestamps: display.timestamp_display(),
            timezone: display.timezone,
            color: display.color,
            show_instance: display.show_instance,
        }
    }

    pub fn line(&self, record: &LogRecord) -> String {
        let mut out = String::new();

        if let Some(parts) = format_parts(record.timestamp, self.timestamps, self.timezone) {
            self.dimmed(&mut out, &parts.to_string());
            out.push(' ');
        }
        if self.show_instance {
            if let Some(instance) = record.instance_id() {
                self.dimmed(&mut out, &format!("[{}]", short_id(instance)));
                out.push(' ');
            }
        }

        let parts = decode(&record.message);
        if self.color {
            out.push_str(&encode_sgr(&parts));
        } else {
            parts.iter().for_each(|part| out.push_str(&part.text));
        }
        out
    }

    fn dimmed(&self, out: &mut String, text: &str) {
        if self.color {
            out.push_str(SGR_DIM);
            out.push_str(text);
            out.push_str(SGR_RESET);
        } else {
            out.push_str(text);
        }
    }
}

/// Re-encodes decoded parts, resetting after every styled run so styles never
/// leak into the next line.
pub fn encode_sgr(parts: &[AnsiPart]) -> String {
    let mut out = String::new();
    for part in parts {
        if part.styles.is_empty() {
            out.push_str(&part.text);
            continue;
        }
        let codes: Vec<String> = part.styles.iter().map(|s| s.sgr_code().to_string()).collect();
        out.push_str("\x1b[");
        out.push_str(&codes.join(";"));
        out.push('m');
        out.push_str(&part.text);
        out.push_str(SGR_RESET);
    }
    out
}

fn short_id(id: &str) -> &str {
    id.split('-').next().filter(|s| !s.is_empty()).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::{Renderer, encode_sgr, short_id};
    use crate::config::{DisplayConfig, TimestampsMode};
    use cc_logs_core::proto::LogRecord;
    use cc_logs_format::{Precision, Timezone, decode};

    fn display(color: bool) -> DisplayConfig {
        DisplayConfig {
            timestamps: TimestampsMode::Datetime,
            precision: Precision::Seconds,
            timezone: Timezone::Utc,
            zone_offset: true,
            color,
            show_instance: true,
        }
    }

    fn record() -> LogRecord {
        LogRecord::new("1", 1_709_287_445_678, "\x1b[1;31mfail\x1b[0m ok")
            .with_metadata("instanceId", "a1b2c3-4d5e")
    }

    #[test]
    fn plain_output_strips_styles() {
        let renderer = Renderer::new(&display(false));
        assert_eq!(renderer.line(&record()), "2024-03-01T10:04:05Z [a1b2c3] fail ok");
    }

    #[test]
    fn colored_output_re_encodes_styles() {
        let renderer = Renderer::new(&display(true));
        let line = renderer.line(&record());
        assert!(line.ends_with("\x1b[1;31mfail\x1b[0m ok"), "{line:?}");
        assert!(line.starts_with("\x1b[2m2024-03-01T10:04:05Z\x1b[0m"));
    }

    #[test]
    fn timestamps_can_be_hidden() {
        let mut config = display(false);
        config.timestamps = TimestampsMode::None;
        config.show_instance = false;
        let renderer = Renderer::new(&config);
        assert_eq!(renderer.line(&record()), "fail ok");
    }

    #[test]
    fn encoding_round_trips_through_decode() {
        let raw = "\x1b[4;92mgo\x1b[0m";
        assert_eq!(decode(&encode_sgr(&decode(raw))), decode(raw));
    }

    #[test]
    fn short_ids_use_the_first_segment() {
        assert_eq!(short_id("abc-def"), "abc");
        assert_eq!(short_id("plain"), "plain");
        assert_eq!(short_id("-lead"), "-lead");
    }
}
