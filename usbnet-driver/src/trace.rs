use std::collections::VecDeque;
use std::time::Instant;

/// Bytes of each traced frame that are kept
pub const TRACE_DATA_LEN: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceKind {
    Read,
    Write,
    MacGet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceOutcome {
    Ok,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    pub time: Instant,
    pub kind: TraceKind,
    pub outcome: TraceOutcome,
    /// Full length of the transfer; `data` holds at most `TRACE_DATA_LEN` of it
    pub length: usize,
    pub data: Vec<u8>,
}

/// Bounded record of recent transport activity. When full the oldest entry goes.
/// A capacity of zero disables recording altogether.
#[derive(Debug)]
pub struct TraceBuffer {
    entries: VecDeque<TraceEntry>,
    capacity: usize,
}

impl TraceBuffer {
    pub fn new(capacity: usize) -> Self {
        TraceBuffer {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, time: Instant, kind: TraceKind, outcome: TraceOutcome, data: &[u8]) {
        if !self.is_enabled() {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let kept = data.len().min(TRACE_DATA_LEN);
        self.entries.push_back(TraceEntry {
            time,
            kind,
            outcome,
            length: data.len(),
            data: data[..kept].to_vec(),
        });
    }

    /// Entries from oldest to newest
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_buffer_records_nothing() {
        let mut trace = TraceBuffer::new(0);
        trace.record(Instant::now(), TraceKind::Write, TraceOutcome::Ok, &[1, 2, 3]);
        assert!(!trace.is_enabled());
        assert!(trace.is_empty());
    }

    #[test]
    fn oldest_entry_is_overwritten() {
        let mut trace = TraceBuffer::new(2);
        let now = Instant::now();
        trace.record(now, TraceKind::Read, TraceOutcome::Ok, &[1]);
        trace.record(now, TraceKind::Write, TraceOutcome::Ok, &[2]);
        trace.record(now, TraceKind::MacGet, TraceOutcome::Failed, &[3]);

        let entries = trace.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, TraceKind::Write);
        assert_eq!(entries[1].kind, TraceKind::MacGet);
        assert_eq!(entries[1].outcome, TraceOutcome::Failed);
    }

    #[test]
    fn long_transfers_are_truncated() {
        let mut trace = TraceBuffer::new(1);
        trace.record(Instant::now(), TraceKind::Write, TraceOutcome::Ok, &[7; 200]);
        let entry = &trace.entries()[0];
        assert_eq!(entry.length, 200);
        assert_eq!(entry.data.len(), TRACE_DATA_LEN);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut trace = TraceBuffer::new(3);
        trace.record(Instant::now(), TraceKind::Read, TraceOutcome::Ok, &[1]);
        trace.clear();
        assert!(trace.is_empty());
        assert_eq!(trace.capacity(), 3);
    }
}
