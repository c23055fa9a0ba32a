/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

/// Incremental `text/event-stream` decoder. Chunks may split anywhere,
/// including inside a UTF-8 sequence.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut out = Vec::new();
        while let Some(split_at) = find_blank_line(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..split_at + 2).collect();
            let raw = String::from_utf8_lossy(&raw[..split_at]);
            if let Some(frame) = parse_frame(&raw) {
                out.push(frame);
            }
        }
        out
    }
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Parses one event block. Blocks without data (comments, bare ids) are
/// not dispatched.
pub fn parse_frame(raw: &str) -> Option<SseFrame> {
    let mut frame = SseFrame::default();
    let mut data_lines = Vec::new();

    for line in raw.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => data_lines.push(value),
            "event" => frame.event = Some(value.to_string()),
            "id" => frame.id = Some(value.to_string()),
            _ => {}
        }
    }

    let payload = data_lines.join("\n");
    if payload.trim().is_empty() {
        return None;
    }
    frame.data = payload;
    Some(frame)
}
