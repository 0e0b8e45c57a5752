//! Build-gating conditions evaluated against a parsed analysis report.
//!
//! Pure functions over in-memory data: by the time a condition runs, all hub
//! I/O is done. A build with no report at all never reaches evaluation; the
//! orchestrator aborts first, so "no report" is never confused with "zero
//! matching warnings".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::xml::Analysis;

/// Build outcomes, ordered from best to worst. `Ord` follows declaration
/// order, so `max()` across several condition results picks the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildOutcome {
    Success,
    Unstable,
    Failure,
    Aborted,
}

impl BuildOutcome {
    pub fn is_worse_than(self, other: BuildOutcome) -> bool {
        self > other
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildOutcome::Success => "SUCCESS",
            BuildOutcome::Unstable => "UNSTABLE",
            BuildOutcome::Failure => "FAILURE",
            BuildOutcome::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

fn default_warranted_result() -> BuildOutcome {
    BuildOutcome::Unstable
}

/// Gate rule: "more than `warning_count_threshold` warnings of
/// `significance` warrant `warranted_result`".
///
/// The threshold is a `u32`, so a negative value is rejected when the
/// configuration is read, never at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningCountCondition {
    pub significance: String,
    pub warning_count_threshold: u32,
    #[serde(default = "default_warranted_result")]
    pub warranted_result: BuildOutcome,
}

impl WarningCountCondition {
    /// Count-and-compare: strictly more matching warnings than the threshold
    /// yields the warranted result, anything else is success. Matching is an
    /// exact comparison against the hub's significance string.
    pub fn evaluate(&self, analysis: &Analysis) -> BuildOutcome {
        let count = analysis
            .warnings
            .iter()
            .filter(|w| w.significance == self.significance)
            .count();

        log::debug!(
            "{count} warnings of significance '{}' against threshold {}",
            self.significance,
            self.warning_count_threshold
        );

        if count > self.warning_count_threshold as usize {
            self.warranted_result
        } else {
            BuildOutcome::Success
        }
    }
}

/// Evaluate every condition and keep the worst outcome. No conditions means
/// nothing can fail the gate.
pub fn evaluate_all(analysis: &Analysis, conditions: &[WarningCountCondition]) -> BuildOutcome {
    conditions
        .iter()
        .map(|condition| condition.evaluate(analysis))
        .max()
        .unwrap_or(BuildOutcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(significances: &[&str]) -> Analysis {
        let xml = format!(
            "<analysis>{}</analysis>",
            significances
                .iter()
                .map(|s| format!(r#"<warning significance="{s}"/>"#))
                .collect::<String>()
        );
        Analysis::parse(&xml).unwrap()
    }

    fn rule(significance: &str, threshold: u32, result: BuildOutcome) -> WarningCountCondition {
        WarningCountCondition {
            significance: significance.to_string(),
            warning_count_threshold: threshold,
            warranted_result: result,
        }
    }

    #[test]
    fn count_above_threshold_warrants_the_configured_outcome() {
        let analysis = report(&["red", "red", "yellow"]);
        let condition = rule("red", 1, BuildOutcome::Unstable);
        assert_eq!(condition.evaluate(&analysis), BuildOutcome::Unstable);
    }

    #[test]
    fn count_equal_to_threshold_is_success() {
        let analysis = report(&["red", "red", "yellow"]);
        let condition = rule("red", 2, BuildOutcome::Unstable);
        assert_eq!(condition.evaluate(&analysis), BuildOutcome::Success);
    }

    #[test]
    fn empty_report_is_success_even_at_threshold_zero() {
        let analysis = report(&[]);
        let condition = rule("red", 0, BuildOutcome::Failure);
        assert_eq!(condition.evaluate(&analysis), BuildOutcome::Success);
    }

    #[test]
    fn single_warning_trips_a_zero_threshold() {
        let analysis = report(&["red"]);
        let condition = rule("red", 0, BuildOutcome::Failure);
        assert_eq!(condition.evaluate(&analysis), BuildOutcome::Failure);
    }

    #[test]
    fn significance_match_is_exact_not_partial() {
        let analysis = report(&["reddish", "red-ish", "RED"]);
        let condition = rule("red", 0, BuildOutcome::Failure);
        assert_eq!(condition.evaluate(&analysis), BuildOutcome::Success);
    }

    #[test]
    fn outcome_ordering_is_success_to_aborted() {
        assert!(BuildOutcome::Unstable.is_worse_than(BuildOutcome::Success));
        assert!(BuildOutcome::Failure.is_worse_than(BuildOutcome::Unstable));
        assert!(BuildOutcome::Aborted.is_worse_than(BuildOutcome::Failure));
        assert!(!BuildOutcome::Success.is_worse_than(BuildOutcome::Aborted));
    }

    #[test]
    fn evaluate_all_keeps_the_worst_outcome() {
        let analysis = report(&["red", "yellow", "yellow"]);
        let conditions = [
            rule("yellow", 1, BuildOutcome::Unstable),
            rule("red", 0, BuildOutcome::Failure),
            rule("green", 0, BuildOutcome::Aborted),
        ];
        assert_eq!(evaluate_all(&analysis, &conditions), BuildOutcome::Failure);
    }

    #[test]
    fn no_conditions_means_success() {
        let analysis = report(&["red"]);
        assert_eq!(evaluate_all(&analysis, &[]), BuildOutcome::Success);
    }

    #[test]
    fn outcome_names_round_trip_through_yaml() {
        let yaml = serde_yaml::to_string(&BuildOutcome::Unstable).unwrap();
        assert_eq!(yaml.trim(), "UNSTABLE");
        let back: BuildOutcome = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, BuildOutcome::Unstable);
    }
}
