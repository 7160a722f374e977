//! Review routing: deciding which traces reach a human reviewer
//!
//! Failed verdicts always escalate. Passing verdicts escalate when a
//! guideline score landed inside the borderline band around the
//! quality threshold, and otherwise at a small fixed calibration rate.
//! The calibration decision is keyed on the trace ID, not randomized,
//! so re-running the router over the same trace always yields the same
//! decision.

use serde::{Deserialize, Serialize};

use crate::config::AssessmentConfig;
use crate::judge::{JudgeCategory, JudgeOutcome};
use crate::verdict::{AssessmentReport, Verdict};

/// Priority of an escalated review
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPriority {
    /// Routine review (calibration samples, archived traces)
    Low,
    /// Quality concern (failed verdict or borderline guideline score)
    Medium,
    /// Blocking gate failed
    High,
}

/// The routing decision for one assessed trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDecision {
    /// Trace this decision routes
    pub trace_id: String,
    /// Whether the trace goes to the human-review queue
    pub escalated: bool,
    /// Review priority
    pub priority: ReviewPriority,
    /// The judge names (or sampling marker) that triggered escalation
    pub reasons: Vec<String>,
}

/// Routes assessment reports to the review queue or the archive
#[derive(Debug, Clone)]
pub struct ReviewRouter {
    quality_threshold: f64,
    borderline_band: f64,
    sampling_rate: f64,
}

/// Bucket count for the deterministic sampling hash; a 2% rate maps to
/// exactly 200 buckets
const SAMPLING_BUCKETS: u64 = 10_000;

impl ReviewRouter {
    /// Create a router from configuration
    pub fn new(config: &AssessmentConfig) -> Self {
        Self {
            quality_threshold: config.quality_threshold,
            borderline_band: config.borderline_band,
            sampling_rate: config.sampling_rate,
        }
    }

    /// Decide whether a trace is escalated, and with what priority
    ///
    /// The borderline check is two-sided: a guideline score within
    /// `borderline_band` of the quality threshold escalates whether it
    /// sits just under or just over it. A score barely over the
    /// threshold carries the same calibration uncertainty as one
    /// barely under, and sub-threshold scores low enough to fail the
    /// verdict already escalate on the failed-verdict path.
    pub fn route(&self, report: &AssessmentReport) -> ReviewDecision {
        let hard_failures: Vec<String> = report
            .judgments_in(JudgeCategory::HardRequirement)
            .filter(|j| j.outcome != JudgeOutcome::Pass)
            .map(|j| j.judge.clone())
            .collect();

        if !hard_failures.is_empty() {
            return self.decision(report, true, ReviewPriority::High, hard_failures);
        }

        if report.verdict == Verdict::Fail {
            let reasons: Vec<String> = report
                .judgments
                .iter()
                .filter(|j| j.outcome != JudgeOutcome::Pass)
                .map(|j| j.judge.clone())
                .collect();
            return self.decision(report, true, ReviewPriority::Medium, reasons);
        }

        // Passing verdict: check for guideline scores that landed too
        // close to the threshold to archive silently
        let borderline: Vec<String> = report
            .judgments_in(JudgeCategory::CustomGuideline)
            .filter(|j| {
                j.score
                    .is_some_and(|s| (s - self.quality_threshold).abs() <= self.borderline_band)
            })
            .map(|j| j.judge.clone())
            .collect();

        if !borderline.is_empty() {
            return self.decision(report, true, ReviewPriority::Medium, borderline);
        }

        // Calibration sample, keyed deterministically on the trace ID
        if self.sampled(&report.trace_id) {
            return self.decision(
                report,
                true,
                ReviewPriority::Low,
                vec!["calibration_sample".to_string()],
            );
        }

        self.decision(report, false, ReviewPriority::Low, Vec::new())
    }

    fn decision(
        &self,
        report: &AssessmentReport,
        escalated: bool,
        priority: ReviewPriority,
        reasons: Vec<String>,
    ) -> ReviewDecision {
        tracing::debug!(
            trace_id = %report.trace_id,
            escalated,
            ?priority,
            reasons = ?reasons,
            "routed trace"
        );
        ReviewDecision {
            trace_id: report.trace_id.clone(),
            escalated,
            priority,
            reasons,
        }
    }

    fn sampled(&self, trace_id: &str) -> bool {
        let hash: u64 = trace_id
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let cutoff = (self.sampling_rate * SAMPLING_BUCKETS as f64) as u64;
        (hash % SAMPLING_BUCKETS) < cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::judge::JudgeCategory::{CustomGuideline, HardRequirement};
    use crate::judge::Judgment;
    use crate::verdict::VerdictAggregator;

    fn router() -> ReviewRouter {
        ReviewRouter::new(&AssessmentConfig::default())
    }

    fn report(trace_id: &str, judgments: Vec<Judgment>) -> AssessmentReport {
        VerdictAggregator::new(&AssessmentConfig::default()).aggregate(trace_id, judgments)
    }

    #[test]
    fn test_hard_failure_is_high_priority() {
        let report = report(
            "t-hard",
            vec![
                Judgment::fail("non_empty_response", HardRequirement),
                Judgment::pass("tone", CustomGuideline).with_score(0.9),
            ],
        );

        let decision = router().route(&report);
        assert!(decision.escalated);
        assert_eq!(decision.priority, ReviewPriority::High);
        assert_eq!(decision.reasons, vec!["non_empty_response"]);
    }

    #[test]
    fn test_failed_verdict_is_medium_priority() {
        // Ratio 0.5 < 0.7 with both hard requirements passing
        let report = report(
            "t-ratio",
            vec![
                Judgment::pass("non_empty_response", HardRequirement),
                Judgment::pass("minimum_length", HardRequirement),
                Judgment::pass("tone", CustomGuideline).with_score(0.8),
                Judgment::fail("compliance", CustomGuideline).with_score(0.4),
            ],
        );
        assert_eq!(report.verdict, Verdict::Fail);

        let decision = router().route(&report);
        assert!(decision.escalated);
        assert_eq!(decision.priority, ReviewPriority::Medium);
        assert_eq!(decision.reasons, vec!["compliance"]);
    }

    #[test]
    fn test_borderline_pass_escalates_medium() {
        // Verdict passes (ratio 1.0) but one score sits inside the
        // band around the threshold
        let report = report(
            "t-borderline",
            vec![
                Judgment::pass("tone", CustomGuideline).with_score(0.95),
                Judgment::pass("compliance", CustomGuideline).with_score(0.72),
            ],
        );
        assert_eq!(report.verdict, Verdict::Pass);

        let decision = router().route(&report);
        assert!(decision.escalated);
        assert_eq!(decision.priority, ReviewPriority::Medium);
        assert_eq!(decision.reasons, vec!["compliance"]);
    }

    #[test]
    fn test_borderline_band_covers_both_sides() {
        // Ratio 3/4 passes the verdict while one score sits just
        // under the threshold
        let report = report(
            "t-under",
            vec![
                Judgment::pass("tone", CustomGuideline).with_score(0.95),
                Judgment::pass("accuracy", CustomGuideline).with_score(0.9),
                Judgment::pass("completeness", CustomGuideline).with_score(0.85),
                Judgment::fail("compliance", CustomGuideline).with_score(0.65),
            ],
        );
        assert_eq!(report.verdict, Verdict::Pass);

        let decision = router().route(&report);
        assert!(decision.escalated);
        assert_eq!(decision.priority, ReviewPriority::Medium);
        assert_eq!(decision.reasons, vec!["compliance"]);
    }

    #[test]
    fn test_clean_pass_archives_or_samples_low() {
        let report = report(
            "t-clean",
            vec![Judgment::pass("tone", CustomGuideline).with_score(0.95)],
        );
        assert_eq!(report.verdict, Verdict::Pass);

        let decision = router().route(&report);
        assert_eq!(decision.priority, ReviewPriority::Low);
        if decision.escalated {
            assert_eq!(decision.reasons, vec!["calibration_sample"]);
        } else {
            assert!(decision.reasons.is_empty());
        }
    }

    #[test]
    fn test_routing_is_deterministic() {
        for i in 0..50 {
            let trace_id = format!("trace-{}", i);
            let first = router().route(&report(
                &trace_id,
                vec![Judgment::pass("tone", CustomGuideline).with_score(0.95)],
            ));
            let second = router().route(&report(
                &trace_id,
                vec![Judgment::pass("tone", CustomGuideline).with_score(0.95)],
            ));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_sampling_rate_is_respected() {
        let full = ReviewRouter::new(
            &ConfigBuilder::new().sampling_rate(1.0).build().unwrap(),
        );
        let none = ReviewRouter::new(
            &ConfigBuilder::new().sampling_rate(0.0).build().unwrap(),
        );

        for i in 0..100 {
            let trace_id = format!("sample-{}", i);
            assert!(full.sampled(&trace_id));
            assert!(!none.sampled(&trace_id));
        }
    }
}
