use std::collections::VecDeque;

use cc_logs_core::proto::LogRecord;

/// Append-only, capacity-bounded record store. The oldest record is evicted
/// when a push would exceed the capacity.
///
/// Each record gets a sequence number, counted from zero per connection, so
/// readers can page through the buffer with a cursor and notice evictions.
/// Records dropped before they were pushed still consume a number.
#[derive(Debug, Clone)]
pub struct RecordBuffer {
    records: VecDeque<(u64, LogRecord)>,
    capacity: usize,
    next_seq: u64,
}

/// Records at or after a cursor.
#[derive(Debug)]
pub struct Page<'a> {
    pub records: Vec<&'a LogRecord>,
    /// Records after the cursor that were evicted or dropped.
    pub skipped: u64,
    /// Cursor to pass on the next call.
    pub next_cursor: u64,
}

impl RecordBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total records ever numbered since the last clear.
    pub fn total(&self) -> u64 {
        self.next_seq
    }

    /// Sequence number of the oldest buffered record.
    pub fn first_seq(&self) -> u64 {
        self.records.front().map_or(self.next_seq, |(seq, _)| *seq)
    }

    /// Appends `record`, returning the evicted record if the buffer was full.
    pub fn push(&mut self, record: LogRecord) -> Option<LogRecord> {
        let seq = self.next_seq;
        self.next_seq += 1;
        push_bounded(&mut self.records, self.capacity, (seq, record)).map(|(_, evicted)| evicted)
    }

    /// Accounts for `count` records that were dropped before reaching the
    /// buffer, so pages report them as skipped.
    pub fn skip(&mut self, count: u64) {
        self.next_seq += count;
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogRecord> + ExactSizeIterator {
        self.records.iter().map(|(_, record)| record)
    }

    pub fn tail(&self, lines: usize) -> Vec<&LogRecord> {
        let count = lines.min(self.records.len());
        self.iter().skip(self.records.len() - count).collect()
    }

    pub fn page(&self, cursor: u64) -> Page<'_> {
        let records: Vec<&LogRecord> = self
            .records
            .iter()
            .filter(|(seq, _)| *seq >= cursor)
            .map(|(_, record)| record)
            .collect();
        let skipped = self
            .next_seq
            .saturating_sub(cursor)
            .saturating_sub(records.len() as u64);
        Page {
            records,
            skipped,
            next_cursor: self.next_seq,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.next_seq = 0;
    }
}

pub(crate) fn push_bounded<E>(buf: &mut VecDeque<E>, max_lines: usize, entry: E) -> Option<E> {
    let evicted = if buf.len() >= max_lines {
        buf.pop_front()
    } else {
        None
    };
    buf.push_back(entry);
    evicted
}
