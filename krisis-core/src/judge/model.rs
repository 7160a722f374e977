//! Model-based judges: guideline-conditioned evaluator calls
//!
//! A [`GuidelineJudge`] hands the trace context plus a natural-language
//! guideline to an external evaluator model and maps the reply onto the
//! judgment contract. Repeated calls may disagree (the evaluator is
//! non-deterministic); network or model failures map to an error
//! judgment, never to an unhandled failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Judge, JudgeCategory, Judgment};
use crate::error::Result;
use crate::trace::TraceRecord;

/// Default per-judge pass threshold for scored judges
const DEFAULT_PASS_THRESHOLD: f64 = 0.7;

/// Reply from an evaluator model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorVerdict {
    /// Score in [0, 1]
    pub score: f64,
    /// Reasoning behind the score
    pub rationale: String,
}

impl EvaluatorVerdict {
    /// Create a new verdict, clamping the score to [0, 1]
    pub fn new(score: f64, rationale: impl Into<String>) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            rationale: rationale.into(),
        }
    }
}

/// External evaluator model collaborator
///
/// Implementations own their transport (and retry policy, if any);
/// errors returned here are captured into error judgments by the
/// calling judge.
#[async_trait]
pub trait EvaluatorModel: Send + Sync {
    /// Score a trace against a natural-language guideline
    async fn judge(&self, guideline: &str, trace: &TraceRecord) -> Result<EvaluatorVerdict>;

    /// Evaluator name, for logging
    fn name(&self) -> &str;
}

/// A named natural-language quality guideline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guideline {
    /// Judge name this guideline backs
    pub name: String,
    /// The guideline text handed to the evaluator
    pub text: String,
}

impl Guideline {
    /// Create a new guideline
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// An explicit catalog of guidelines, passed into registry
/// construction rather than held as process-wide state
pub type GuidelineCatalog = Vec<Guideline>;

/// The guideline set used by the default suite: domain-quality rules
/// for a tool-calling financial assistant
pub fn default_guidelines() -> GuidelineCatalog {
    vec![
        Guideline::new(
            "tool_usage",
            "The response should be backed by appropriate tool calls: portfolio \
             queries should consult portfolio tools, market questions should \
             consult market data tools, and earnings questions should search \
             earnings reports.",
        ),
        Guideline::new(
            "data_quality",
            "The response should include relevant retrieved data: ticker symbols \
             when discussing stocks, specific numbers when data was retrieved, and \
             an explicit statement when data is not available.",
        ),
        Guideline::new(
            "professional_tone",
            "The response should use clear, professional language, present \
             information objectively without hype, and maintain an advisory tone.",
        ),
        Guideline::new(
            "regulatory_compliance",
            "The response must not give buy/sell recommendations without \
             disclaimers, must not guarantee future returns, and should emphasize \
             risk for speculative questions.",
        ),
        Guideline::new(
            "accuracy",
            "The response should not invent data that was not retrieved, should \
             not fabricate holdings, and should acknowledge missing data.",
        ),
        Guideline::new(
            "completeness",
            "The response should directly answer what was asked and include the \
             key information relevant to the query.",
        ),
    ]
}

/// A guideline-conditioned model-based judge
pub struct GuidelineJudge {
    guideline: Guideline,
    evaluator: Arc<dyn EvaluatorModel>,
    pass_threshold: f64,
}

impl GuidelineJudge {
    /// Create a new guideline judge with the default pass threshold
    pub fn new(guideline: Guideline, evaluator: Arc<dyn EvaluatorModel>) -> Self {
        Self {
            guideline,
            evaluator,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }

    /// Override the pass threshold for this judge
    pub fn with_pass_threshold(mut self, threshold: f64) -> Self {
        self.pass_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// The guideline text this judge evaluates against
    pub fn guideline_text(&self) -> &str {
        &self.guideline.text
    }
}

#[async_trait]
impl Judge for GuidelineJudge {
    fn name(&self) -> &str {
        &self.guideline.name
    }

    fn category(&self) -> JudgeCategory {
        JudgeCategory::CustomGuideline
    }

    async fn evaluate(&self, trace: &TraceRecord) -> Judgment {
        match self.evaluator.judge(&self.guideline.text, trace).await {
            Ok(verdict) => {
                let judgment = if verdict.score >= self.pass_threshold {
                    Judgment::pass(&self.guideline.name, JudgeCategory::CustomGuideline)
                } else {
                    Judgment::fail(&self.guideline.name, JudgeCategory::CustomGuideline)
                };
                judgment
                    .with_score(verdict.score)
                    .with_rationale(verdict.rationale)
            }
            Err(e) => {
                tracing::warn!(
                    judge = %self.guideline.name,
                    evaluator = %self.evaluator.name(),
                    error = %e,
                    "evaluator call failed"
                );
                Judgment::error(
                    &self.guideline.name,
                    JudgeCategory::CustomGuideline,
                    e.to_string(),
                )
            }
        }
    }
}
