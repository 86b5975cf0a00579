//! Download run statistics.

use std::time::{Duration, Instant};

/// Statistics for one download run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Routes whose documents were all written.
    pub routes_completed: usize,
    /// Documents written to disk.
    pub documents: usize,
    /// Bytes written across all documents.
    pub total_bytes: u64,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl RunStats {
    /// Returns the average write speed in bytes per second.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn average_speed(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.total_bytes as f64 / secs) as u64
        } else {
            0
        }
    }
}

/// Accumulates [`RunStats`] while a run progresses.
#[derive(Debug)]
pub struct RunStatsBuilder {
    start_time: Instant,
    routes_completed: usize,
    documents: usize,
    total_bytes: u64,
}

impl Default for RunStatsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStatsBuilder {
    /// Starts the clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            routes_completed: 0,
            documents: 0,
            total_bytes: 0,
        }
    }

    /// Records one written document.
    pub const fn add_document(&mut self, bytes: u64) {
        self.documents += 1;
        self.total_bytes += bytes;
    }

    /// Records a route whose documents were all written.
    pub const fn add_route(&mut self) {
        self.routes_completed += 1;
    }

    /// Snapshot of the statistics so far.
    #[must_use]
    pub fn build(&self) -> RunStats {
        RunStats {
            routes_completed: self.routes_completed,
            documents: self.documents,
            total_bytes: self.total_bytes,
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_speed_zero_elapsed() {
        let stats = RunStats {
            total_bytes: 1000,
            ..RunStats::default()
        };
        assert_eq!(stats.average_speed(), 0);
    }

    #[test]
    fn average_speed() {
        let stats = RunStats {
            routes_completed: 1,
            documents: 2,
            total_bytes: 1000,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(stats.average_speed(), 500);
    }

    #[test]
    fn builder_accumulates() {
        let mut builder = RunStatsBuilder::new();
        builder.add_document(300);
        builder.add_document(200);
        builder.add_route();

        let stats = builder.build();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.total_bytes, 500);
        assert_eq!(stats.routes_completed, 1);
    }
}
