//! Windowed term counting: per-epoch counters, missed ratchet, history.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::table::TableLayout;
use super::terms::TrackedTerms;

/// Errors from epoch bookkeeping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// The operation needs an open epoch and none is.
    #[error("no epoch is open")]
    EpochNotOpen,
}

/// A closed reporting window, immutable once recorded.
///
/// `counts` aligns index-for-index with the owning tracker's term order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochRecord {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub counts: Vec<u64>,
    pub missed: u64,
}

impl EpochRecord {
    /// Render this record as one table row.
    pub fn render(&self, layout: &TableLayout) -> String {
        let interval = (self.end - self.start).num_milliseconds() as f64 / 1000.0;
        render_row(layout, self.start, interval, self.missed, &self.counts)
    }
}

/// Counts tracked-term matches inside fixed reporting epochs.
///
/// Pure aggregation state; liveness and scheduling live elsewhere. Counters
/// record presence per text, not occurrences within it, and the missed count
/// only ratchets upward until the epoch closes.
#[derive(Debug)]
pub struct TermTracker {
    terms: TrackedTerms,
    counts: Vec<u64>,
    missed: u64,
    epoch_start: Option<DateTime<Utc>>,
    history: Vec<EpochRecord>,
}

impl TermTracker {
    pub fn new(terms: TrackedTerms) -> Self {
        let counts = vec![0; terms.len()];
        Self {
            terms,
            counts,
            missed: 0,
            epoch_start: None,
            history: Vec::new(),
        }
    }

    pub fn terms(&self) -> &TrackedTerms {
        &self.terms
    }

    /// True while an epoch is open.
    pub fn epoch_open(&self) -> bool {
        self.epoch_start.is_some()
    }

    /// Open a new epoch starting now.
    ///
    /// A no-op while an epoch is already open, so a reconnect mid-epoch
    /// keeps the window it will report.
    pub fn start_epoch(&mut self) {
        if self.epoch_start.is_none() {
            self.epoch_start = Some(Utc::now());
        }
    }

    /// Count one inbound text: +1 for every tracked term it contains,
    /// however many times the term occurs within it.
    pub fn process_text(&mut self, text: &str) {
        for (slot, term) in self.counts.iter_mut().zip(self.terms.iter()) {
            if text.contains(term) {
                *slot += 1;
            }
        }
    }

    /// Record a provider drop notice; keeps the largest value seen this
    /// epoch.
    pub fn record_missed(&mut self, dropped: u64) {
        self.missed = self.missed.max(dropped);
    }

    /// Close the open epoch: snapshot it into history and reset the live
    /// counters and missed count.
    pub fn end_epoch(&mut self) -> Result<(), TrackerError> {
        let start = self.epoch_start.take().ok_or(TrackerError::EpochNotOpen)?;
        self.history.push(EpochRecord {
            start,
            end: Utc::now(),
            counts: std::mem::replace(&mut self.counts, vec![0; self.terms.len()]),
            missed: std::mem::take(&mut self.missed),
        });
        Ok(())
    }

    /// Closed epochs, oldest first.
    pub fn history(&self) -> &[EpochRecord] {
        &self.history
    }

    /// Live count for one term, if tracked.
    pub fn count_of(&self, term: &str) -> Option<u64> {
        self.terms.iter().position(|t| t == term).map(|i| self.counts[i])
    }

    /// Largest drop notice seen this epoch.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    /// Header line: timestamp label, interval, missed, one quoted column
    /// per term.
    pub fn render_header(&self, layout: &TableLayout) -> String {
        let mut line = layout.pad_time("Time:D/M/Y:GMT");
        line.push_str(&layout.pad("interval/s"));
        line.push_str(&layout.pad("missed"));
        for term in self.terms.iter() {
            line.push_str(&layout.pad(&format!("\"{}\"", term)));
        }
        line
    }

    /// Count line for the live epoch; the interval column shows how long it
    /// has been open. Fails when no epoch is open.
    pub fn render_count_line(&self, layout: &TableLayout) -> Result<String, TrackerError> {
        let start = self.epoch_start.ok_or(TrackerError::EpochNotOpen)?;
        let interval = (Utc::now() - start).num_milliseconds() as f64 / 1000.0;
        Ok(render_row(layout, start, interval, self.missed, &self.counts))
    }

    /// Tabulated dump: header, the live line if an epoch is open, the most
    /// recent `last_n` closed epochs newest-first, then a blank line.
    pub fn render_tabulated(&self, layout: &TableLayout, last_n: usize) -> Vec<String> {
        let mut lines = vec![self.render_header(layout)];
        if let Ok(line) = self.render_count_line(layout) {
            lines.push(line);
        }
        for record in self.history.iter().rev().take(last_n) {
            lines.push(record.render(layout));
        }
        lines.push(String::new());
        lines
    }
}

fn render_row(
    layout: &TableLayout,
    start: DateTime<Utc>,
    interval_secs: f64,
    missed: u64,
    counts: &[u64],
) -> String {
    let mut line = layout.pad_time(&start.format("%d/%m/%Y %H:%M:%S").to_string());
    line.push_str(&layout.pad(&format!("{:.1}", interval_secs)));
    line.push_str(&layout.pad(&missed.to_string()));
    for n in counts {
        line.push_str(&layout.pad(&n.to_string()));
    }
    line
}
