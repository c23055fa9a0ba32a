//! ANSI SGR decoding.
//!
//! [`decode`] splits a raw log message into runs of text that share the same
//! style set. Every call starts from an empty style set; callers that stream
//! a message in chunks must carry style continuation themselves.
//!
//! Sequences are recognized by a `vte` state machine. Input is never
//! rejected: an escape sequence left unterminated at the end of the input
//! is kept as literal text, and so are complete non-CSI escapes such as
//! `ESC Z`. CSI sequences other than SGR (cursor movement, erase line) and
//! OSC strings carry no meaning in a log view and are dropped.

use std::fmt;

use vte::{Params, Parser, Perform};

const ESC: u8 = 0x1b;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl AnsiColor {
    const BASE: [AnsiColor; 8] = [
        AnsiColor::Black,
        AnsiColor::Red,
        AnsiColor::Green,
        AnsiColor::Yellow,
        AnsiColor::Blue,
        AnsiColor::Magenta,
        AnsiColor::Cyan,
        AnsiColor::White,
    ];
    const BRIGHT: [AnsiColor; 8] = [
        AnsiColor::BrightBlack,
        AnsiColor::BrightRed,
        AnsiColor::BrightGreen,
        AnsiColor::BrightYellow,
        AnsiColor::BrightBlue,
        AnsiColor::BrightMagenta,
        AnsiColor::BrightCyan,
        AnsiColor::BrightWhite,
    ];

    /// Color for a 256-color palette index. Only the 16 named entries map.
    fn from_palette(index: u16) -> Option<Self> {
        match index {
            0..=7 => Some(Self::BASE[index as usize]),
            8..=15 => Some(Self::BRIGHT[index as usize - 8]),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnsiColor::Black => "black",
            AnsiColor::Red => "red",
            AnsiColor::Green => "green",
            AnsiColor::Yellow => "yellow",
            AnsiColor::Blue => "blue",
            AnsiColor::Magenta => "magenta",
            AnsiColor::Cyan => "cyan",
            AnsiColor::White => "white",
            AnsiColor::BrightBlack => "bright-black",
            AnsiColor::BrightRed => "bright-red",
            AnsiColor::BrightGreen => "bright-green",
            AnsiColor::BrightYellow => "bright-yellow",
            AnsiColor::BrightBlue => "bright-blue",
            AnsiColor::BrightMagenta => "bright-magenta",
            AnsiColor::BrightCyan => "bright-cyan",
            AnsiColor::BrightWhite => "bright-white",
        }
    }

    /// Offset from the 30/40 (or 90/100 for bright) SGR base.
    fn sgr_offset(self) -> (bool, u8) {
        match self {
            AnsiColor::Black => (false, 0),
            AnsiColor::Red => (false, 1),
            AnsiColor::Green => (false, 2),
            AnsiColor::Yellow => (false, 3),
            AnsiColor::Blue => (false, 4),
            AnsiColor::Magenta => (false, 5),
            AnsiColor::Cyan => (false, 6),
            AnsiColor::White => (false, 7),
            AnsiColor::BrightBlack => (true, 0),
            AnsiColor::BrightRed => (true, 1),
            AnsiColor::BrightGreen => (true, 2),
            AnsiColor::BrightYellow => (true, 3),
            AnsiColor::BrightBlue => (true, 4),
            AnsiColor::BrightMagenta => (true, 5),
            AnsiColor::BrightCyan => (true, 6),
            AnsiColor::BrightWhite => (true, 7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsiStyle {
    Bold,
    Dim,
    Italic,
    Underline,
    Blink,
    Inverse,
    Hidden,
    Strikethrough,
    Foreground(AnsiColor),
    Background(AnsiColor),
}

impl AnsiStyle {
    const ATTRIBUTES: [AnsiStyle; 8] = [
        AnsiStyle::Bold,
        AnsiStyle::Dim,
        AnsiStyle::Italic,
        AnsiStyle::Underline,
        AnsiStyle::Blink,
        AnsiStyle::Inverse,
        AnsiStyle::Hidden,
        AnsiStyle::Strikethrough,
    ];

    pub fn name(self) -> String {
        match self {
            AnsiStyle::Bold => "bold".into(),
            AnsiStyle::Dim => "dim".into(),
            AnsiStyle::Italic => "italic".into(),
            AnsiStyle::Underline => "underline".into(),
            AnsiStyle::Blink => "blink".into(),
            AnsiStyle::Inverse => "inverse".into(),
            AnsiStyle::Hidden => "hidden".into(),
            AnsiStyle::Strikethrough => "strikethrough".into(),
            AnsiStyle::Foreground(color) => format!("fg-{}", color.name()),
            AnsiStyle::Background(color) => format!("bg-{}", color.name()),
        }
    }

    /// SGR code that turns this style on.
    pub fn sgr_code(self) -> u8 {
        match self {
            AnsiStyle::Bold => 1,
            AnsiStyle::Dim => 2,
            AnsiStyle::Italic => 3,
            AnsiStyle::Underline => 4,
            AnsiStyle::Blink => 5,
            AnsiStyle::Inverse => 7,
            AnsiStyle::Hidden => 8,
            AnsiStyle::Strikethrough => 9,
            AnsiStyle::Foreground(color) => match color.sgr_offset() {
                (false, n) => 30 + n,
                (true, n) => 90 + n,
            },
            AnsiStyle::Background(color) => match color.sgr_offset() {
                (false, n) => 40 + n,
                (true, n) => 100 + n,
            },
        }
    }

    fn attribute_bit(self) -> Option<u8> {
        Self::ATTRIBUTES
            .iter()
            .position(|attr| *attr == self)
            .map(|pos| 1 << pos)
    }
}

impl fmt::Display for AnsiStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A run of text rendered under one style set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiPart {
    pub styles: Vec<AnsiStyle>,
    pub text: String,
}

impl AnsiPart {
    pub fn style_names(&self) -> Vec<String> {
        self.styles.iter().map(|s| s.name()).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StyleSet {
    attributes: u8,
    foreground: Option<AnsiColor>,
    background: Option<AnsiColor>,
}

impl StyleSet {
    fn set(&mut self, style: AnsiStyle) {
        self.toggle(style, true);
    }

    fn clear(&mut self, style: AnsiStyle) {
        self.toggle(style, false);
    }

    fn toggle(&mut self, style: AnsiStyle, on: bool) {
        if let Some(bit) = style.attribute_bit() {
            if on {
                self.attributes |= bit;
            } else {
                self.attributes &= !bit;
            }
        }
    }

    /// Applies the parameters of one SGR sequence. Colon sub-parameters
    /// (`38:5:9`) are read from their group.
    fn apply(self, params: &Params) -> StyleSet {
        let groups: Vec<&[u16]> = params.iter().collect();
        if groups.is_empty() {
            return StyleSet::default();
        }

        let mut next = self;
        let mut iter = groups.into_iter();
        while let Some(group) = iter.next() {
            let code = first_param(group);
            match code {
                0 => next = StyleSet::default(),
                1 => next.set(AnsiStyle::Bold),
                2 => next.set(AnsiStyle::Dim),
                3 => next.set(AnsiStyle::Italic),
                4 => next.set(AnsiStyle::Underline),
                5 | 6 => next.set(AnsiStyle::Blink),
                7 => next.set(AnsiStyle::Inverse),
                8 => next.set(AnsiStyle::Hidden),
                9 => next.set(AnsiStyle::Strikethrough),
                22 => {
                    next.clear(AnsiStyle::Bold);
                    next.clear(AnsiStyle::Dim);
                }
                23 => next.clear(AnsiStyle::Italic),
                24 => next.clear(AnsiStyle::Underline),
                25 => next.clear(AnsiStyle::Blink),
                27 => next.clear(AnsiStyle::Inverse),
                28 => next.clear(AnsiStyle::Hidden),
                29 => next.clear(AnsiStyle::Strikethrough),
                30..=37 => next.foreground = Some(AnsiColor::BASE[(code - 30) as usize]),
                39 => next.foreground = None,
                40..=47 => next.background = Some(AnsiColor::BASE[(code - 40) as usize]),
                49 => next.background = None,
                90..=97 => next.foreground = Some(AnsiColor::BRIGHT[(code - 90) as usize]),
                100..=107 => next.background = Some(AnsiColor::BRIGHT[(code - 100) as usize]),
                38 | 48 => {
                    let color = if group.len() > 1 {
                        extended_color(&mut group[1..].iter().copied())
                    } else {
                        extended_color(&mut (&mut iter).map(first_param))
                    };
                    if let Some(color) = color {
                        if code == 38 {
                            next.foreground = Some(color);
                        } else {
                            next.background = Some(color);
                        }
                    }
                }
                _ => {}
            }
        }
        next
    }

    fn to_styles(self) -> Vec<AnsiStyle> {
        let mut styles: Vec<AnsiStyle> = AnsiStyle::ATTRIBUTES
            .iter()
            .enumerate()
            .filter(|(pos, _)| self.attributes & (1 << pos) != 0)
            .map(|(_, style)| *style)
            .collect();
        styles.extend(self.foreground.map(AnsiStyle::Foreground));
        styles.extend(self.background.map(AnsiStyle::Background));
        styles
    }
}

/// Consumes the arguments of a `38;…`/`48;…` sequence.
fn extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<AnsiColor> {
    match iter.next()? {
        5 => AnsiColor::from_palette(iter.next()?),
        2 => {
            // true color has no symbolic name
            for _ in 0..3 {
                iter.next()?;
            }
            None
        }
        _ => None,
    }
}

fn first_param(group: &[u16]) -> u16 {
    group.first().copied().unwrap_or(0)
}

/// Collects styled runs while `vte` walks the input.
#[derive(Default)]
struct Collector {
    parts: Vec<AnsiPart>,
    style: StyleSet,
    text: String,
    /// Offset of an escape sequence that has not been dispatched yet.
    escape_start: Option<usize>,
}

impl Collector {
    fn flush(&mut self) {
        if self.text.is_empty() {
            return;
        }
        self.parts.push(AnsiPart {
            styles: self.style.to_styles(),
            text: std::mem::take(&mut self.text),
        });
    }

    fn finish(mut self, raw: &str) -> Vec<AnsiPart> {
        if let Some(start) = self.escape_start.take() {
            self.text.push_str(&raw[start..]);
        }
        self.flush();
        self.parts
    }
}

impl Perform for Collector {
    fn print(&mut self, c: char) {
        self.escape_start = None;
        self.text.push(c);
    }

    fn execute(&mut self, byte: u8) {
        // tabs, newlines and other C0 controls stay in the text
        self.escape_start = None;
        self.text.push(char::from(byte));
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, action: char) {
        self.escape_start = None;
        // private markers (`?`, `>`) arrive as intermediates
        if action != 'm' || ignore || !intermediates.is_empty() {
            return;
        }
        let next = self.style.apply(params);
        if next != self.style {
            self.flush();
            self.style = next;
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
        self.escape_start = None;
        self.text.push(char::from(ESC));
        self.text.extend(intermediates.iter().copied().map(char::from));
        self.text.push(char::from(byte));
    }

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {
        self.escape_start = None;
    }

    fn unhook(&mut self) {
        self.escape_start = None;
    }
}

/// Splits `raw` into styled runs. Zero-length runs are never emitted.
pub fn decode(raw: &str) -> Vec<AnsiPart> {
    let bytes = raw.as_bytes();
    let mut parser = Parser::new();
    let mut collector = Collector::default();

    // feed the input in runs that each start at an ESC, so the collector
    // knows where a sequence still open at the end began
    let mut start = 0;
    for (at, _) in bytes.iter().enumerate().filter(|(_, b)| **b == ESC) {
        parser.advance(&mut collector, &bytes[start..at]);
        collector.escape_start = Some(at);
        start = at;
    }
    parser.advance(&mut collector, &bytes[start..]);
    collector.finish(raw)
}

/// Plain text of `raw` with all recognized escape sequences removed.
pub fn strip_ansi(raw: &str) -> String {
    decode(raw).into_iter().map(|part| part.text).collect()
}
