//! Verdict aggregation: reducing judgments into one auditable verdict
//!
//! The aggregation policy:
//! 1. Judgments are partitioned by category.
//! 2. Any hard-requirement judgment that did not pass forces an
//!    overall fail, regardless of every other category.
//! 3. For the scored categories (built-in, custom guideline) the pass
//!    ratio is computed over conclusive judgments only; errored
//!    judgments are excluded from the ratio and counted as
//!    inconclusive.
//! 4. Overall pass requires: no hard-requirement failure, pass ratio
//!    at or above the quality threshold, and inconclusive count within
//!    tolerance.
//! 5. If every scored judge errored there is no evidence to certify
//!    quality, and the verdict is fail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AssessmentConfig;
use crate::judge::{JudgeCategory, JudgeOutcome, Judgment};

/// Overall verdict over a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The trace meets the configured quality bar
    Pass,
    /// The trace does not meet the quality bar, or there was not
    /// enough evidence to certify it
    Fail,
}

/// Pass/fail/inconclusive counts for one judge category
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CategoryCounts {
    /// Judgments that passed
    pub passed: usize,
    /// Judgments that failed
    pub failed: usize,
    /// Judgments that errored
    pub inconclusive: usize,
}

impl CategoryCounts {
    fn record(&mut self, outcome: JudgeOutcome) {
        match outcome {
            JudgeOutcome::Pass => self.passed += 1,
            JudgeOutcome::Fail => self.failed += 1,
            JudgeOutcome::Error => self.inconclusive += 1,
        }
    }

    /// Conclusive judgment count
    pub fn conclusive(&self) -> usize {
        self.passed + self.failed
    }
}

/// Per-category breakdown backing the overall verdict
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerdictBreakdown {
    /// Hard-requirement counts
    pub hard_requirement: CategoryCounts,
    /// Built-in judge counts
    pub built_in: CategoryCounts,
    /// Custom-guideline judge counts
    pub custom_guideline: CategoryCounts,
    /// Pass ratio over conclusive scored judgments, absent when no
    /// scored judgment was conclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_ratio: Option<f64>,
    /// Inconclusive count across the scored categories
    pub inconclusive: usize,
}

/// The unified quality assessment for one trace
///
/// Created once by the aggregator; judgments keep registry
/// registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Trace this report assesses
    pub trace_id: String,
    /// All judgments, in registry registration order
    pub judgments: Vec<Judgment>,
    /// Overall verdict
    pub verdict: Verdict,
    /// Per-category breakdown
    pub breakdown: VerdictBreakdown,
    /// When the report was created
    pub created_at: DateTime<Utc>,
}

impl AssessmentReport {
    /// Export to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Export to pretty JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to a human-readable summary
    pub fn to_summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Assessment Report: {}", self.trace_id));
        lines.push(format!(
            "Verdict: {}",
            match self.verdict {
                Verdict::Pass => "PASS",
                Verdict::Fail => "FAIL",
            }
        ));
        if let Some(ratio) = self.breakdown.pass_ratio {
            lines.push(format!("Pass ratio: {:.2}", ratio));
        }
        if self.breakdown.inconclusive > 0 {
            lines.push(format!("Inconclusive: {}", self.breakdown.inconclusive));
        }

        lines.push(String::new());
        lines.push("Judgments:".to_string());
        for judgment in &self.judgments {
            let status = match judgment.outcome {
                JudgeOutcome::Pass => "pass",
                JudgeOutcome::Fail => "FAIL",
                JudgeOutcome::Error => "ERROR",
            };
            let mut line = format!("  {:<24} {}", judgment.judge, status);
            if let Some(score) = judgment.score {
                line.push_str(&format!(" ({:.2})", score));
            }
            if let Some(ref detail) = judgment.error {
                line.push_str(&format!(" [{}]", detail));
            }
            lines.push(line);
        }

        lines.join("\n")
    }

    /// Judgments for a given category
    pub fn judgments_in(&self, category: JudgeCategory) -> impl Iterator<Item = &Judgment> {
        self.judgments.iter().filter(move |j| j.category == category)
    }

    /// Whether any hard requirement did not pass
    pub fn hard_requirement_failed(&self) -> bool {
        self.judgments_in(JudgeCategory::HardRequirement)
            .any(|j| j.outcome != JudgeOutcome::Pass)
    }
}

/// Reduces a set of judgments into an assessment report
#[derive(Debug, Clone)]
pub struct VerdictAggregator {
    quality_threshold: f64,
    inconclusive_tolerance: usize,
}

impl VerdictAggregator {
    /// Create an aggregator from configuration
    pub fn new(config: &AssessmentConfig) -> Self {
        Self {
            quality_threshold: config.quality_threshold,
            inconclusive_tolerance: config.inconclusive_tolerance,
        }
    }

    /// Aggregate judgments into a report
    ///
    /// Judgment order is preserved; the caller is responsible for
    /// passing judgments in registry registration order.
    pub fn aggregate(&self, trace_id: impl Into<String>, judgments: Vec<Judgment>) -> AssessmentReport {
        let trace_id = trace_id.into();
        let mut breakdown = VerdictBreakdown::default();

        for judgment in &judgments {
            match judgment.category {
                JudgeCategory::HardRequirement => {
                    breakdown.hard_requirement.record(judgment.outcome)
                }
                JudgeCategory::BuiltIn => breakdown.built_in.record(judgment.outcome),
                JudgeCategory::CustomGuideline => {
                    breakdown.custom_guideline.record(judgment.outcome)
                }
            }
        }

        // Hard requirements are blocking: error counts as not-pass
        let hard_failed =
            breakdown.hard_requirement.failed + breakdown.hard_requirement.inconclusive > 0;

        let conclusive =
            breakdown.built_in.conclusive() + breakdown.custom_guideline.conclusive();
        let passed = breakdown.built_in.passed + breakdown.custom_guideline.passed;
        breakdown.inconclusive =
            breakdown.built_in.inconclusive + breakdown.custom_guideline.inconclusive;
        breakdown.pass_ratio = if conclusive > 0 {
            Some(passed as f64 / conclusive as f64)
        } else {
            None
        };

        let verdict = if judgments.is_empty() || hard_failed {
            Verdict::Fail
        } else if conclusive == 0 {
            // Zero-evidence rule: scored judges existed but none
            // concluded. With no scored judges configured at all, the
            // hard requirements alone carry the verdict.
            if breakdown.inconclusive > 0 {
                Verdict::Fail
            } else {
                Verdict::Pass
            }
        } else if breakdown.pass_ratio.unwrap_or(0.0) >= self.quality_threshold
            && breakdown.inconclusive <= self.inconclusive_tolerance
        {
            Verdict::Pass
        } else {
            Verdict::Fail
        };

        tracing::debug!(
            trace_id = %trace_id,
            ?verdict,
            pass_ratio = ?breakdown.pass_ratio,
            inconclusive = breakdown.inconclusive,
            hard_failed,
            "aggregated verdict"
        );

        AssessmentReport {
            trace_id,
            judgments,
            verdict,
            breakdown,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssessmentConfig;
    use crate::judge::JudgeCategory::{BuiltIn, CustomGuideline, HardRequirement};

    fn aggregator() -> VerdictAggregator {
        VerdictAggregator::new(&AssessmentConfig::default())
    }

    #[test]
    fn test_hard_requirement_dominates() {
        // Ten passing guideline judges cannot outvote one failing gate
        let mut judgments: Vec<Judgment> = (0..10)
            .map(|i| Judgment::pass(format!("guideline_{}", i), CustomGuideline).with_score(1.0))
            .collect();
        judgments.push(Judgment::fail("non_empty_response", HardRequirement));

        let report = aggregator().aggregate("t", judgments);
        assert_eq!(report.verdict, Verdict::Fail);
        assert!(report.hard_requirement_failed());
        assert_eq!(report.breakdown.pass_ratio, Some(1.0));
    }

    #[test]
    fn test_hard_requirement_error_is_blocking() {
        let judgments = vec![
            Judgment::error("non_empty_response", HardRequirement, "timeout"),
            Judgment::pass("relevance_to_query", BuiltIn).with_score(1.0),
        ];

        let report = aggregator().aggregate("t", judgments);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn test_pass_ratio_below_threshold_fails() {
        // Worked example: two passing hard requirements, tone 0.8
        // passes, compliance 0.4 fails => ratio 0.5 < 0.7 => fail
        let judgments = vec![
            Judgment::pass("non_empty_response", HardRequirement),
            Judgment::pass("minimum_length", HardRequirement),
            Judgment::pass("tone", CustomGuideline).with_score(0.8),
            Judgment::fail("compliance", CustomGuideline).with_score(0.4),
        ];

        let report = aggregator().aggregate("t", judgments);
        assert_eq!(report.breakdown.pass_ratio, Some(0.5));
        assert_eq!(report.verdict, Verdict::Fail);
        assert!(!report.hard_requirement_failed());
    }

    #[test]
    fn test_errors_excluded_from_ratio() {
        // One timeout among four: inconclusive 1 <= tolerance 1, and
        // the ratio over the remaining three is 1.0 => pass
        let judgments = vec![
            Judgment::pass("relevance_to_query", BuiltIn).with_score(0.9),
            Judgment::pass("safety", BuiltIn).with_score(1.0),
            Judgment::error("tone", CustomGuideline, "timeout"),
            Judgment::pass("accuracy", CustomGuideline).with_score(0.8),
        ];

        let report = aggregator().aggregate("t", judgments);
        assert_eq!(report.breakdown.pass_ratio, Some(1.0));
        assert_eq!(report.breakdown.inconclusive, 1);
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn test_inconclusive_over_tolerance_fails() {
        let judgments = vec![
            Judgment::pass("relevance_to_query", BuiltIn).with_score(1.0),
            Judgment::pass("safety", BuiltIn).with_score(1.0),
            Judgment::error("tone", CustomGuideline, "timeout"),
            Judgment::error("accuracy", CustomGuideline, "timeout"),
        ];

        let report = aggregator().aggregate("t", judgments);
        assert_eq!(report.breakdown.inconclusive, 2);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn test_zero_evidence_fails() {
        let judgments = vec![
            Judgment::error("relevance_to_query", BuiltIn, "timeout"),
            Judgment::error("safety", BuiltIn, "timeout"),
            Judgment::error("tone", CustomGuideline, "timeout"),
        ];

        let report = aggregator().aggregate("t", judgments);
        assert_eq!(report.breakdown.pass_ratio, None);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn test_hard_requirements_only() {
        // With no scored judges configured, the gates alone decide
        let judgments = vec![
            Judgment::pass("non_empty_response", HardRequirement),
            Judgment::pass("minimum_length", HardRequirement),
        ];

        let report = aggregator().aggregate("t", judgments);
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn test_empty_judgment_set_fails() {
        let report = aggregator().aggregate("t", Vec::new());
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn test_summary_export() {
        let judgments = vec![
            Judgment::pass("safety", BuiltIn).with_score(1.0),
            Judgment::error("tone", CustomGuideline, "timeout"),
        ];
        let report = aggregator().aggregate("trace-9", judgments);

        let summary = report.to_summary();
        assert!(summary.contains("trace-9"));
        assert!(summary.contains("safety"));
        assert!(summary.contains("timeout"));

        let json = report.to_json_pretty().unwrap();
        let parsed: AssessmentReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.judgments.len(), 2);
    }
}
