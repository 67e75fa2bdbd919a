use std::collections::HashMap;

use ladle_core::normalize_title;

/// Disposition of a candidate title as seen by the deduplicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    /// First occurrence; the record is kept.
    Fresh,
    /// Already seen; the record is dropped, never overwriting the kept one.
    Duplicate,
}

#[derive(Debug, Clone)]
struct SeenRecipe {
    raw_title: String,
    page_number: usize,
}

/// Detects recipes already seen under a normalized title within a
/// page-proximity window. Byte-identical raw titles are duplicates at any
/// distance.
#[derive(Debug)]
pub struct Deduplicator {
    window: usize,
    seen: HashMap<String, Vec<SeenRecipe>>,
}

impl Deduplicator {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            seen: HashMap::new(),
        }
    }

    /// Observe a validated candidate. `Fresh` records the title as kept;
    /// `Duplicate` leaves the kept record untouched.
    pub fn observe(&mut self, raw_title: &str, page_number: usize) -> DedupOutcome {
        let normalized = normalize_title(raw_title);
        let entries = self.seen.entry(normalized).or_default();
        for entry in entries.iter() {
            if entry.raw_title == raw_title {
                return DedupOutcome::Duplicate;
            }
            if page_number.abs_diff(entry.page_number) <= self.window {
                return DedupOutcome::Duplicate;
            }
        }
        entries.push(SeenRecipe {
            raw_title: raw_title.to_string(),
            page_number,
        });
        DedupOutcome::Fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_is_fresh() {
        let mut dedup = Deduplicator::new(5);
        assert_eq!(dedup.observe("Overnight Oats", 10), DedupOutcome::Fresh);
    }

    #[test]
    fn normalized_match_within_window_is_duplicate() {
        let mut dedup = Deduplicator::new(5);
        assert_eq!(dedup.observe("Overnight Oats", 10), DedupOutcome::Fresh);
        assert_eq!(dedup.observe("OVERNIGHT OATS!", 13), DedupOutcome::Duplicate);
    }

    #[test]
    fn normalized_match_outside_window_is_fresh() {
        let mut dedup = Deduplicator::new(5);
        assert_eq!(dedup.observe("Overnight Oats", 10), DedupOutcome::Fresh);
        // Different raw bytes and 20 pages apart: a different family recipe.
        assert_eq!(dedup.observe("OVERNIGHT OATS", 30), DedupOutcome::Fresh);
    }

    #[test]
    fn identical_raw_title_is_duplicate_at_any_distance() {
        let mut dedup = Deduplicator::new(5);
        assert_eq!(dedup.observe("Overnight Oats", 10), DedupOutcome::Fresh);
        assert_eq!(dedup.observe("Overnight Oats", 200), DedupOutcome::Duplicate);
    }

    #[test]
    fn window_is_inclusive() {
        let mut dedup = Deduplicator::new(5);
        assert_eq!(dedup.observe("Pecan Pie", 10), DedupOutcome::Fresh);
        assert_eq!(dedup.observe("PECAN PIE", 15), DedupOutcome::Duplicate);
        assert_eq!(dedup.observe("pecan pie", 16), DedupOutcome::Fresh);
    }

    #[test]
    fn dedup_over_accepted_set_is_idempotent() {
        // Anything a first pass accepts, a second pass over the accepted set
        // accepts again in full: no recipe is a duplicate of itself.
        let accepted = [("Overnight Oats", 10), ("Pecan Pie", 12), ("OVERNIGHT OATS", 30)];
        let mut first = Deduplicator::new(5);
        let kept: Vec<_> = accepted
            .iter()
            .filter(|(t, p)| first.observe(t, *p) == DedupOutcome::Fresh)
            .collect();
        assert_eq!(kept.len(), accepted.len());

        let mut second = Deduplicator::new(5);
        let kept_again: Vec<_> = kept
            .iter()
            .filter(|(t, p)| second.observe(t, *p) == DedupOutcome::Fresh)
            .collect();
        assert_eq!(kept_again.len(), kept.len());
    }

    #[test]
    fn zero_window_still_catches_same_page() {
        let mut dedup = Deduplicator::new(0);
        assert_eq!(dedup.observe("Deviled Eggs", 4), DedupOutcome::Fresh);
        assert_eq!(dedup.observe("DEVILED EGGS", 4), DedupOutcome::Duplicate);
        assert_eq!(dedup.observe("DEVILED  EGGS", 5), DedupOutcome::Fresh);
    }
}
