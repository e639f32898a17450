use {
    crate::decoder::ScoreEvent,
    std::collections::HashMap,
};

/// Running totals for a single category.
///
/// Both fields only grow; a category is created lazily on its first event
/// and never deleted. The stream is unbounded and categories do not expire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStat {
    pub total_score: i64,
    pub count: u64,
}

/// In-memory aggregation state for the review stream.
///
/// Owned exclusively by the consumer loop: folds go through `&mut self`, so
/// no reader can observe a half-applied update. Alongside the per-category
/// stats a shadow raw-event count is kept in lockstep with `CategoryStat::count`;
/// it feeds the percentage-share computation in `snapshot()`.
pub struct ScoreBoard {
    stats: HashMap<String, CategoryStat>,
    event_counts: HashMap<String, u64>,
}

/// One category's line in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub average_score: f64,
    pub share_pct: f64,
    pub count: u64,
}

/// Immutable point-in-time copy of the aggregation state.
///
/// Taken after each fold and handed to the snapshot sink; the renderer never
/// sees a live reference into the board. Categories are sorted by name so
/// repeated renders are stable.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub categories: Vec<CategorySummary>,
    pub total_events: u64,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            stats: HashMap::new(),
            event_counts: HashMap::new(),
        }
    }

    /// Fold one event into the running totals.
    ///
    /// The three updates (total_score, count, raw event count) form one
    /// atomic unit: nothing can observe the state between them because the
    /// board is behind `&mut self`.
    pub fn fold(&mut self, event: ScoreEvent) {
        let stat = self.stats.entry(event.category.clone()).or_default();
        stat.total_score += event.score;
        stat.count += 1;
        *self.event_counts.entry(event.category).or_insert(0) += 1;
    }

    /// Number of successfully folded events since process start.
    pub fn total_events(&self) -> u64 {
        self.event_counts.values().sum()
    }

    /// Number of distinct categories observed so far.
    pub fn category_count(&self) -> usize {
        self.stats.len()
    }

    pub fn get(&self, category: &str) -> Option<&CategoryStat> {
        self.stats.get(category)
    }

    /// Extract an immutable snapshot: average score and percentage share per
    /// category. O(k) in the number of distinct categories; does not mutate.
    ///
    /// Every present key has count >= 1, so the average division is safe.
    /// Shares sum to 100 (within floating-point tolerance) whenever the
    /// board is non-empty.
    pub fn snapshot(&self) -> Snapshot {
        let total = self.total_events();

        let mut categories: Vec<CategorySummary> = self
            .stats
            .iter()
            .map(|(category, stat)| {
                let raw_count = self.event_counts.get(category).copied().unwrap_or(0);
                CategorySummary {
                    category: category.clone(),
                    average_score: stat.total_score as f64 / stat.count as f64,
                    share_pct: if total == 0 {
                        0.0
                    } else {
                        raw_count as f64 / total as f64 * 100.0
                    },
                    count: stat.count,
                }
            })
            .collect();

        categories.sort_by(|a, b| a.category.cmp(&b.category));

        Snapshot {
            categories,
            total_events: total,
        }
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    pub fn get(&self, category: &str) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn event(category: &str, score: i64) -> ScoreEvent {
        ScoreEvent {
            category: category.to_string(),
            score,
        }
    }

    #[test]
    fn test_fold_is_atomic_over_sequences() {
        let mut board = ScoreBoard::new();
        let events = [
            event("Horror", 55),
            event("Action", 80),
            event("Horror", 65),
            event("RPG", 99),
            event("Action", 70),
        ];
        let expected_total: i64 = events.iter().map(|e| e.score).sum();

        for e in events.iter().cloned() {
            board.fold(e);
            // count and total_score always move together: every present key
            // has a raw count equal to its stat count
            for summary in board.snapshot().categories {
                assert_eq!(summary.count, board.get(&summary.category).unwrap().count);
            }
        }

        assert_eq!(board.total_events(), events.len() as u64);
        let folded_total: i64 = board
            .snapshot()
            .categories
            .iter()
            .map(|c| (c.average_score * c.count as f64).round() as i64)
            .sum();
        assert_eq!(folded_total, expected_total);
    }

    #[test]
    fn test_average_correctness() {
        let mut board = ScoreBoard::new();
        for score in [51, 62, 73, 84] {
            board.fold(event("Strategy", score));
        }
        let snapshot = board.snapshot();
        let strategy = snapshot.get("Strategy").unwrap();
        assert!((strategy.average_score - 67.5).abs() < EPSILON);
        assert_eq!(strategy.count, 4);
    }

    #[test]
    fn test_percentage_closure() {
        let mut board = ScoreBoard::new();
        for (cat, n) in [("Horror", 3), ("Action", 5), ("RPG", 1), ("MMO", 8)] {
            for _ in 0..n {
                board.fold(event(cat, 75));
            }
        }
        let snapshot = board.snapshot();
        let share_sum: f64 = snapshot.categories.iter().map(|c| c.share_pct).sum();
        assert!((share_sum - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_ordering_scenario() {
        // [(A,10), (B,20), (A,30)] delivered in order
        let mut board = ScoreBoard::new();
        board.fold(event("A", 10));
        board.fold(event("B", 20));
        board.fold(event("A", 30));

        let snapshot = board.snapshot();
        let a = snapshot.get("A").unwrap();
        let b = snapshot.get("B").unwrap();

        assert!((a.average_score - 20.0).abs() < EPSILON);
        assert_eq!(a.count, 2);
        assert!((b.average_score - 20.0).abs() < EPSILON);
        assert_eq!(b.count, 1);
        assert!((a.share_pct - 200.0 / 3.0).abs() < EPSILON);
        assert!((b.share_pct - 100.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_unknown_category_never_merges() {
        let mut board = ScoreBoard::new();
        board.fold(event("unknown", 50));
        board.fold(event("Unknown", 60));
        board.fold(event("", 70));

        assert_eq!(board.category_count(), 3);
        assert_eq!(board.get("unknown").unwrap().count, 1);
        assert_eq!(board.get("Unknown").unwrap().count, 1);
        assert_eq!(board.get("").unwrap().count, 1);
    }

    #[test]
    fn test_empty_board_snapshot() {
        let board = ScoreBoard::new();
        let snapshot = board.snapshot();
        assert!(snapshot.categories.is_empty());
        assert_eq!(snapshot.total_events, 0);
    }

    #[test]
    fn test_snapshot_does_not_mutate_state() {
        let mut board = ScoreBoard::new();
        board.fold(event("Mobile", 88));

        let first = board.snapshot();
        let second = board.snapshot();
        assert_eq!(first, second);
        assert_eq!(board.total_events(), 1);
    }

    #[test]
    fn test_snapshot_is_sorted_by_category() {
        let mut board = ScoreBoard::new();
        for cat in ["Sports", "Action", "Roguelike"] {
            board.fold(event(cat, 60));
        }
        let snapshot = board.snapshot();
        let names: Vec<&str> = snapshot
            .categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["Action", "Roguelike", "Sports"]);
    }

    #[test]
    fn test_redelivered_record_inflates_counts() {
        // At-least-once delivery, no deduplication: folding the same record
        // twice counts twice
        let mut board = ScoreBoard::new();
        board.fold(event("FPS", 90));
        board.fold(event("FPS", 90));
        assert_eq!(board.get("FPS").unwrap().count, 2);
        assert_eq!(board.get("FPS").unwrap().total_score, 180);
    }
}
