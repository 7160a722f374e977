//! Judges: scoring functions over captured traces
//!
//! A judge evaluates one [`TraceRecord`](crate::trace::TraceRecord)
//! and produces one [`Judgment`]. Three variants exist:
//! - Rule-based: deterministic checks (non-empty, min length,
//!   placeholder detection)
//! - Model-based: a guideline-conditioned evaluator model
//! - Heuristic: built-in reference-free checks (relevance, safety)
//!
//! The contract is that `evaluate` never propagates failures: a judge
//! catches its own internal errors and returns an error judgment with
//! a populated detail instead.

mod heuristic;
mod model;
mod rule;

pub use heuristic::HeuristicJudge;
pub use model::{
    default_guidelines, EvaluatorModel, EvaluatorVerdict, Guideline, GuidelineCatalog,
    GuidelineJudge,
};
pub use rule::RuleBasedJudge;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::trace::TraceRecord;

/// Category of a judge, driving aggregation semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeCategory {
    /// Generic built-in check (relevance, safety)
    BuiltIn,
    /// Domain-specific natural-language guideline
    CustomGuideline,
    /// Blocking binary quality gate
    HardRequirement,
}

/// Outcome of a single judge invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeOutcome {
    /// The trace satisfied the judge
    Pass,
    /// The trace did not satisfy the judge
    Fail,
    /// The judge could not produce a verdict
    Error,
}

/// The verdict of one judge over one trace
///
/// Never mutated after creation. An error judgment carries no score
/// and does not contribute to category pass counts; the constructors
/// enforce this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgment {
    /// Name of the judge that produced this judgment
    pub judge: String,
    /// Category of the judge
    pub category: JudgeCategory,
    /// Outcome
    pub outcome: JudgeOutcome,
    /// Numeric score in [0, 1], only for scored judges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Rationale text (always populated by model-based judges)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Error detail, present iff outcome is error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Judgment {
    /// Create a passing judgment
    pub fn pass(judge: impl Into<String>, category: JudgeCategory) -> Self {
        Self {
            judge: judge.into(),
            category,
            outcome: JudgeOutcome::Pass,
            score: None,
            rationale: None,
            error: None,
        }
    }

    /// Create a failing judgment
    pub fn fail(judge: impl Into<String>, category: JudgeCategory) -> Self {
        Self {
            judge: judge.into(),
            category,
            outcome: JudgeOutcome::Fail,
            score: None,
            rationale: None,
            error: None,
        }
    }

    /// Create an error judgment with a detail message
    pub fn error(
        judge: impl Into<String>,
        category: JudgeCategory,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            judge: judge.into(),
            category,
            outcome: JudgeOutcome::Error,
            score: None,
            rationale: None,
            error: Some(detail.into()),
        }
    }

    /// Attach a score, clamped to [0, 1]; ignored on error judgments
    pub fn with_score(mut self, score: f64) -> Self {
        if self.outcome != JudgeOutcome::Error {
            self.score = Some(score.clamp(0.0, 1.0));
        }
        self
    }

    /// Attach a rationale
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Whether the judgment produced a usable verdict (pass or fail)
    pub fn is_conclusive(&self) -> bool {
        self.outcome != JudgeOutcome::Error
    }

    /// Whether the judgment passed
    pub fn is_pass(&self) -> bool {
        self.outcome == JudgeOutcome::Pass
    }
}

/// A judge evaluates a trace and returns exactly one judgment
///
/// Implementations must not propagate failures to the caller: network
/// or model errors map to an error judgment. Retry policy, if any, is
/// internal to the judge; the orchestrator never re-invokes a judge
/// within a run.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Unique name within a registry
    fn name(&self) -> &str;

    /// Category driving aggregation semantics
    fn category(&self) -> JudgeCategory;

    /// Evaluate a trace
    async fn evaluate(&self, trace: &TraceRecord) -> Judgment;
}
