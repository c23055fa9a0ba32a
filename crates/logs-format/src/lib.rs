//! Pure text formatting for log lines: ANSI SGR decoding and timestamp display.

pub mod ansi;
pub mod timestamp;

pub use ansi::{AnsiColor, AnsiPart, AnsiStyle, decode, strip_ansi};
pub use timestamp::{
    Pattern, Precision, TimestampDisplay, TimestampFormat, TimestampParseError, TimestampParts,
    Timezone, format, format_parts, parse_timestamp,
};
