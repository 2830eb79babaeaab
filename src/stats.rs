//! Syscall frequency tally
//!
//! Counts every syscall name observed in a trace, independent of dependency
//! classification. Names are kept in first-seen order so that ties in the sorted
//! view are broken deterministically.

use std::collections::HashMap;
use std::io::Write;

/// Occurrence count for one syscall name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyscallCount {
    pub name: String,
    pub count: u64,
}

/// Summary totals for the tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TallyTotals {
    /// Sum of all counts
    pub total_calls: u64,
    /// Number of distinct syscall names
    pub unique_syscalls: usize,
}

/// Tracks syscall counts over a single pass of a trace
#[derive(Debug, Default, Clone)]
pub struct SyscallTally {
    /// Counts in first-seen order
    counts: Vec<SyscallCount>,
    /// Map from syscall name to position in `counts`
    index: HashMap<String, usize>,
    /// Running sum of all counts
    total: u64,
}

impl SyscallTally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of a syscall
    pub fn record(&mut self, syscall_name: &str) {
        match self.index.get(syscall_name) {
            Some(&pos) => self.counts[pos].count += 1,
            None => {
                self.index
                    .insert(syscall_name.to_string(), self.counts.len());
                self.counts.push(SyscallCount {
                    name: syscall_name.to_string(),
                    count: 1,
                });
            }
        }
        self.total += 1;
    }

    /// Count for a syscall name (0 if never seen)
    pub fn count(&self, syscall_name: &str) -> u64 {
        self.index
            .get(syscall_name)
            .map(|&pos| self.counts[pos].count)
            .unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct syscall names
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn totals(&self) -> TallyTotals {
        TallyTotals {
            total_calls: self.total,
            unique_syscalls: self.counts.len(),
        }
    }

    /// Counts in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &SyscallCount> {
        self.counts.iter()
    }

    /// Counts sorted descending by count, ties in first-seen order
    pub fn sorted(&self) -> Vec<&SyscallCount> {
        let mut sorted: Vec<_> = self.counts.iter().collect();
        // Stable sort keeps first-seen order among equal counts
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }

    /// The `n` most frequent syscalls
    pub fn top(&self, n: usize) -> Vec<&SyscallCount> {
        let mut sorted = self.sorted();
        sorted.truncate(n);
        sorted
    }

    /// Share of the total as a percentage in `[0, 100]`
    pub fn percentage(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (count as f64 / self.total as f64) * 100.0
        }
    }

    /// Percentage formatted to three decimal places, e.g. `75.000%`
    pub fn format_percentage(&self, count: u64) -> String {
        format!("{:.3}%", self.percentage(count))
    }

    /// Write a summary table of the `limit` most frequent syscalls
    ///
    /// `None` prints every syscall.
    pub fn write_summary<W: Write>(&self, out: &mut W, limit: Option<usize>) -> std::io::Result<()> {
        if self.is_empty() {
            writeln!(out, "No syscalls found.")?;
            return Ok(());
        }

        let rows = match limit {
            Some(n) => self.top(n),
            None => self.sorted(),
        };

        writeln!(out, "  % calls      calls syscall")?;
        writeln!(out, "--------- ---------- ----------------")?;

        for row in &rows {
            writeln!(
                out,
                "{:>9} {:>10} {}",
                self.format_percentage(row.count),
                row.count,
                row.name
            )?;
        }

        writeln!(out, "--------- ---------- ----------------")?;
        writeln!(
            out,
            "{:>9} {:>10} total ({} unique)",
            "100.000%",
            self.total,
            self.counts.len()
        )?;
        Ok(())
    }
}

impl<'a> FromIterator<&'a str> for SyscallTally {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Self::new();
        for name in iter {
            tally.record(name);
        }
        tally
    }
}
