//! # Stats — Chain Counts, Totals, and the Periodic Banner
//!
//! Bookkeeping shared between workers and the reporter. Each worker folds
//! finds into a private [`StatsTable`] shadow and merges it into the global
//! table under the stats mutex; hash counts and phase timings travel
//! separately under the aggregation mutex (see [`crate::worker`]), so bulk
//! merging never stalls per-chain reporting.

use crate::chain::ChainKind;

/// Chain lengths are tracked up to (exclusive) this bound.
pub const MAX_TRACKED_LEN: usize = 50;

/// Per-length, per-kind find counts: rows are lengths 0..50 (only 2..50 can
/// be populated), columns are first kind / second kind / bi-twin.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StatsTable([[u64; 3]; MAX_TRACKED_LEN]);

impl StatsTable {
    pub fn new() -> Self {
        StatsTable([[0; 3]; MAX_TRACKED_LEN])
    }

    /// Count one find. Lengths at or past the tracking bound are dropped;
    /// nothing the hunt can produce gets near it.
    pub fn record(&mut self, kind: ChainKind, length: u32) {
        if let Some(row) = self.0.get_mut(length as usize) {
            row[kind.column()] += 1;
        }
    }

    pub fn merge(&mut self, other: &StatsTable) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            for (m, t) in mine.iter_mut().zip(theirs.iter()) {
                *m += t;
            }
        }
    }

    pub fn clear(&mut self) {
        self.0 = [[0; 3]; MAX_TRACKED_LEN];
    }

    pub fn count(&self, length: u32, kind: ChainKind) -> u64 {
        self.0
            .get(length as usize)
            .map_or(0, |row| row[kind.column()])
    }

    pub fn total(&self) -> u64 {
        self.0.iter().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Rows with at least one find, as (length, [first, second, twin]).
    pub fn nonzero_rows(&self) -> impl Iterator<Item = (usize, [u64; 3])> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&c| c != 0))
            .map(|(len, row)| (len, *row))
    }
}

impl Default for StatsTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregation-mutex data: hashes tried and wall time spent per phase.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Totals {
    pub tried: u64,
    pub sieve_secs: f64,
    pub prime_secs: f64,
}

impl Totals {
    /// Fold a worker's window into the running totals and reset the window.
    pub fn absorb(&mut self, window: &mut Totals) {
        self.tried += window.tried;
        self.sieve_secs += window.sieve_secs;
        self.prime_secs += window.prime_secs;
        *window = Totals::default();
    }
}

/// Print the periodic summary banner to stdout.
///
/// Shape and field widths follow the established report format: hashes
/// tried, elapsed seconds, sieve/primality time split, then one row per
/// populated length with the hourly rate and the per-kind triple.
pub fn print_banner(totals: &Totals, elapsed_secs: f64, table: &StatsTable, errors: u64) {
    let busy = totals.sieve_secs + totals.prime_secs;
    let (sieve_frac, prime_frac) = if busy > 0.0 {
        (totals.sieve_secs / busy, totals.prime_secs / busy)
    } else {
        (0.0, 0.0)
    };
    let rule = "=".repeat(79);
    println!("{rule}");
    println!(
        "after trying {} hashes ({:.2} sec) ({:.4} sieve, {:.4} primcheck):",
        totals.tried, elapsed_secs, sieve_frac, prime_frac
    );
    for (len, row) in table.nonzero_rows() {
        let rate = if elapsed_secs > 0.0 {
            (row[0] + row[1] + row[2]) as f64 / (elapsed_secs / 3600.0)
        } else {
            0.0
        };
        println!(
            " {:2}ch/h: {:9.2} [{} {} {}]",
            len, rate, row[0], row[1], row[2]
        );
    }
    if errors > 0 {
        println!("ERRORS FOUND {errors}");
    }
    println!("{rule}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_starts_empty() {
        let t = StatsTable::new();
        assert!(t.is_empty());
        assert_eq!(t.total(), 0);
        assert_eq!(t.nonzero_rows().count(), 0);
    }

    #[test]
    fn record_lands_in_the_right_cell() {
        let mut t = StatsTable::new();
        t.record(ChainKind::First, 6);
        t.record(ChainKind::First, 6);
        t.record(ChainKind::Second, 7);
        t.record(ChainKind::BiTwin, 12);
        assert_eq!(t.count(6, ChainKind::First), 2);
        assert_eq!(t.count(7, ChainKind::Second), 1);
        assert_eq!(t.count(12, ChainKind::BiTwin), 1);
        assert_eq!(t.count(6, ChainKind::Second), 0);
        assert_eq!(t.total(), 4);
    }

    #[test]
    fn record_drops_out_of_range_lengths() {
        let mut t = StatsTable::new();
        t.record(ChainKind::First, MAX_TRACKED_LEN as u32);
        t.record(ChainKind::First, u32::MAX);
        assert!(t.is_empty());
    }

    #[test]
    fn merge_is_cellwise_addition() {
        let mut a = StatsTable::new();
        let mut b = StatsTable::new();
        a.record(ChainKind::First, 5);
        b.record(ChainKind::First, 5);
        b.record(ChainKind::Second, 9);
        a.merge(&b);
        assert_eq!(a.count(5, ChainKind::First), 2);
        assert_eq!(a.count(9, ChainKind::Second), 1);
        // merging leaves the source untouched
        assert_eq!(b.total(), 2);
    }

    #[test]
    fn clear_resets_everything() {
        let mut t = StatsTable::new();
        t.record(ChainKind::BiTwin, 10);
        t.clear();
        assert!(t.is_empty());
    }

    #[test]
    fn nonzero_rows_in_length_order() {
        let mut t = StatsTable::new();
        t.record(ChainKind::Second, 9);
        t.record(ChainKind::First, 5);
        t.record(ChainKind::BiTwin, 14);
        let rows: Vec<_> = t.nonzero_rows().collect();
        assert_eq!(
            rows,
            vec![(5, [1, 0, 0]), (9, [0, 1, 0]), (14, [0, 0, 1])]
        );
    }

    #[test]
    fn totals_absorb_resets_window() {
        let mut global = Totals::default();
        let mut window = Totals {
            tried: 100,
            sieve_secs: 1.5,
            prime_secs: 2.5,
        };
        global.absorb(&mut window);
        global.absorb(&mut window); // second absorb is a no-op
        assert_eq!(global.tried, 100);
        assert_eq!(global.sieve_secs, 1.5);
        assert_eq!(global.prime_secs, 2.5);
        assert_eq!(window, Totals::default());
    }

    #[test]
    fn print_banner_does_not_panic() {
        let mut t = StatsTable::new();
        t.record(ChainKind::First, 6);
        let totals = Totals {
            tried: 1000,
            sieve_secs: 3.0,
            prime_secs: 1.0,
        };
        print_banner(&totals, 12.5, &t, 0);
        print_banner(&totals, 0.0, &t, 2);
        print_banner(&Totals::default(), 0.0, &StatsTable::new(), 0);
    }
}
