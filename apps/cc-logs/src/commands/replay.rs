use anyhow::{Context, Result};
use cc_logs_core::proto::RawLogEvent;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::render::Renderer;

/// Renders newline-delimited wire events from `file`, or stdin when absent.
/// Lines that do not normalize are skipped.
pub async fn exec(file: Option<&Path>, renderer: Renderer) -> Result<()> {
    let mut out = String::new();
    let skipped = match file {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Log file not found: {}", path.display()))?;
            render_lines(BufReader::new(file), &renderer, &mut out).await?
        }
        None => render_lines(BufReader::new(tokio::io::stdin()), &renderer, &mut out).await?,
    };
    print!("{out}");
    if skipped > 0 {
        eprintln!("{skipped} malformed lines skipped");
    }
    Ok(())
}

async fn render_lines<R: AsyncBufRead + Unpin>(
    reader: R,
    renderer: &Renderer,
    out: &mut String,
) -> Result<usize> {
    let mut lines = reader.lines();
    let mut skipped = 0;
    let mut line_no = 0;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match RawLogEvent::from_json(&line).and_then(RawLogEvent::into_record) {
            Ok(record) => {
                out.push_str(&renderer.line(&record));
                out.push('\n');
            }
            Err(err) => {
                warn!(line = line_no, error = %err, "skipping log line");
                skipped += 1;
            }
        }
    }
    Ok(skipped)
}
