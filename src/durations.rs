//! Duration bucketing
//!
//! Folds an experiment's interval sequence into per-state totals. `wall*`
//! labels accumulate under `wall`; fruit labels (`apple*`, `snowberry*`)
//! accumulate under their own label and under the fruit total.

use serde::{Deserialize, Serialize};

use crate::types::{ActionInterval, StateDurations};

/// Label that marks the end of an experiment when it is the last interval
pub const END_MARKER: &str = "wall";

/// Label of the optional leading setup interval
pub const START_MARKER: &str = "start";

pub const WALL_STATE: &str = "wall";

/// Fruit prefixes whose time is split into sub-states and a total
pub const FRUITS: [&str; 2] = ["apple", "snowberry"];

/// Which leading marker intervals to discard before bucketing.
///
/// A trailing `wall` interval is always discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimPolicy {
    /// Drop a first interval labeled `start`
    pub drop_leading_start: bool,
    /// Drop a first interval labeled `wall` (checked after `start` is dropped)
    pub drop_leading_wall: bool,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self {
            drop_leading_start: true,
            drop_leading_wall: false,
        }
    }
}

impl TrimPolicy {
    /// The slice of `intervals` that takes part in bucketing
    pub fn trim<'a>(&self, intervals: &'a [ActionInterval]) -> &'a [ActionInterval] {
        let mut kept = intervals;

        if let Some((last, rest)) = kept.split_last() {
            if last.label == END_MARKER {
                kept = rest;
            }
        }
        if self.drop_leading_start {
            kept = strip_leading(kept, START_MARKER);
        }
        if self.drop_leading_wall {
            kept = strip_leading(kept, WALL_STATE);
        }

        kept
    }
}

fn strip_leading<'a>(intervals: &'a [ActionInterval], label: &str) -> &'a [ActionInterval] {
    match intervals.split_first() {
        Some((first, rest)) if first.label == label => rest,
        _ => intervals,
    }
}

/// Fruit total a label contributes to: the text before the first `_`
pub fn fruit_of(label: &str) -> &str {
    label.split('_').next().unwrap_or(label)
}

/// Sum an experiment's intervals into per-state durations
pub fn bucket_intervals(intervals: &[ActionInterval], policy: &TrimPolicy) -> StateDurations {
    let mut durations = StateDurations::new();

    for interval in policy.trim(intervals) {
        let label = interval.label.as_str();

        if label.starts_with(WALL_STATE) {
            durations.add(WALL_STATE, interval.duration_sec);
        } else if FRUITS.iter().any(|fruit| label.starts_with(fruit)) {
            durations.add(label, interval.duration_sec);
            durations.add(fruit_of(label), interval.duration_sec);
        }
    }

    durations
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seq(items: &[(&str, i64)]) -> Vec<ActionInterval> {
        items
            .iter()
            .map(|(label, seconds)| ActionInterval::new(*label, *seconds))
            .collect()
    }

    #[test]
    fn test_drops_leading_start_and_trailing_wall() {
        let intervals = seq(&[
            ("start", 0),
            ("wall", 5),
            ("apple_search", 10),
            ("apple_rest", 20),
            ("wall", 3),
        ]);

        let durations = bucket_intervals(&intervals, &TrimPolicy::default());

        assert_eq!(durations.get("wall"), 5);
        assert_eq!(durations.get("apple_search"), 10);
        assert_eq!(durations.get("apple_rest"), 20);
        assert_eq!(durations.get("apple"), 30);
        assert_eq!(durations.get("snowberry"), 0);
    }

    #[test]
    fn test_drop_leading_wall_policy() {
        let intervals = seq(&[
            ("start", 0),
            ("wall", 5),
            ("snowberry_search", 4),
            ("wall", 6),
            ("snowberry_rest", 8),
            ("wall", 3),
        ]);
        let policy = TrimPolicy {
            drop_leading_start: true,
            drop_leading_wall: true,
        };

        let durations = bucket_intervals(&intervals, &policy);

        assert_eq!(durations.get("wall"), 6);
        assert_eq!(durations.get("snowberry_search"), 4);
        assert_eq!(durations.get("snowberry_rest"), 8);
        assert_eq!(durations.get("snowberry"), 12);
    }

    #[test]
    fn test_keep_leading_start() {
        let intervals = seq(&[("start", 9), ("wall", 5)]);
        let policy = TrimPolicy {
            drop_leading_start: false,
            drop_leading_wall: false,
        };

        // "start" matches no bucket and the trailing wall is dropped
        let durations = bucket_intervals(&intervals, &policy);
        assert!(durations.is_empty());
    }

    #[test]
    fn test_wall_prefix_and_unknown_labels() {
        let intervals = seq(&[
            ("wall_left", 2),
            ("walls", 3),
            ("grooming", 50),
            ("apple", 7),
        ]);

        let durations = bucket_intervals(&intervals, &TrimPolicy::default());

        assert_eq!(durations.get("wall"), 5);
        // A bare fruit label is both its own bucket and the fruit total
        assert_eq!(durations.get("apple"), 14);
        assert_eq!(durations.get("grooming"), 0);
    }

    #[test]
    fn test_bare_fruit_label_adds_to_both_buckets() {
        let intervals = seq(&[("apple", 7), ("apple_search", 3)]);

        let durations = bucket_intervals(&intervals, &TrimPolicy::default());

        assert_eq!(durations.get("apple"), 17);
        assert_eq!(durations.get("apple_search"), 3);
    }

    #[test]
    fn test_empty_and_marker_only_sequences() {
        let policy = TrimPolicy {
            drop_leading_start: true,
            drop_leading_wall: true,
        };

        assert!(bucket_intervals(&[], &policy).is_empty());
        assert!(bucket_intervals(&seq(&[("wall", 4)]), &policy).is_empty());
        assert!(bucket_intervals(&seq(&[("start", 1), ("wall", 4)]), &policy).is_empty());
    }

    #[test]
    fn test_fruit_of() {
        assert_eq!(fruit_of("apple_search"), "apple");
        assert_eq!(fruit_of("snowberry_rest_long"), "snowberry");
        assert_eq!(fruit_of("apple"), "apple");
    }
}
