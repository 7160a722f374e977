//! Rule-based judges: deterministic, side-effect-free checks
//!
//! These are the production quality gates: strict binary pass/fail
//! with no partial credit. Identical input always yields an identical
//! outcome, which the reproducibility tests rely on.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::RegexSet;

use super::{Judge, JudgeCategory, Judgment};
use crate::trace::TraceRecord;

/// Default minimum response length in characters
const DEFAULT_MIN_LENGTH: usize = 50;

/// Template markers and placeholder patterns that must never reach a
/// user-facing response
static PLACEHOLDER_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\[(?i:INSERT|TODO|PLACEHOLDER|TBD)[^\]]*\]",
        r"<(?i:PLACEHOLDER|INSERT)[^>]*>",
        r"\{\{[^}]*\}\}",
        r"\$\{[^}]*\}",
        r"XXXX",
        r"____",
    ])
    .expect("placeholder patterns are valid")
});

/// The check a rule-based judge performs
#[derive(Debug, Clone)]
enum RuleCheck {
    /// Response must contain non-whitespace content
    NonEmpty,
    /// Response must be at least this many characters
    MinLength(usize),
    /// Response must not contain placeholder or template text
    NoPlaceholders,
}

/// A deterministic rule-based judge
pub struct RuleBasedJudge {
    name: String,
    category: JudgeCategory,
    check: RuleCheck,
}

impl RuleBasedJudge {
    /// Response must not be empty or whitespace-only
    pub fn non_empty() -> Self {
        Self {
            name: "non_empty_response".to_string(),
            category: JudgeCategory::HardRequirement,
            check: RuleCheck::NonEmpty,
        }
    }

    /// Response must be at least `min_chars` characters
    pub fn min_length(min_chars: usize) -> Self {
        Self {
            name: "minimum_length".to_string(),
            category: JudgeCategory::HardRequirement,
            check: RuleCheck::MinLength(min_chars),
        }
    }

    /// Response must be at least the default 50 characters
    pub fn min_length_default() -> Self {
        Self::min_length(DEFAULT_MIN_LENGTH)
    }

    /// Response must not contain placeholder text or template variables
    pub fn no_placeholders() -> Self {
        Self {
            name: "no_placeholders".to_string(),
            category: JudgeCategory::HardRequirement,
            check: RuleCheck::NoPlaceholders,
        }
    }

    /// Override the judge name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the category (hard requirement by default)
    pub fn with_category(mut self, category: JudgeCategory) -> Self {
        self.category = category;
        self
    }

    fn check_response(&self, response: &str) -> (bool, String) {
        match &self.check {
            RuleCheck::NonEmpty => {
                let ok = !response.trim().is_empty();
                let rationale = if ok {
                    "response contains non-whitespace content".to_string()
                } else {
                    "response is empty or whitespace-only".to_string()
                };
                (ok, rationale)
            }
            RuleCheck::MinLength(min) => {
                let len = response.chars().count();
                let ok = len >= *min;
                (
                    ok,
                    format!("response is {} characters, minimum is {}", len, min),
                )
            }
            RuleCheck::NoPlaceholders => {
                let matches: Vec<usize> = PLACEHOLDER_PATTERNS.matches(response).iter().collect();
                if matches.is_empty() {
                    (true, "no placeholder text detected".to_string())
                } else {
                    (
                        false,
                        format!("{} placeholder pattern(s) detected", matches.len()),
                    )
                }
            }
        }
    }
}

#[async_trait]
impl Judge for RuleBasedJudge {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> JudgeCategory {
        self.category
    }

    async fn evaluate(&self, trace: &TraceRecord) -> Judgment {
        let (passed, rationale) = self.check_response(trace.final_response());
        if passed {
            Judgment::pass(&self.name, self.category).with_rationale(rationale)
        } else {
            Judgment::fail(&self.name, self.category).with_rationale(rationale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::JudgeOutcome;

    fn trace_with_response(response: &str) -> TraceRecord {
        TraceRecord::builder()
            .trace_id("rule-test")
            .user_input("query")
            .final_response(response)
            .build()
    }

    #[tokio::test]
    async fn test_non_empty() {
        let judge = RuleBasedJudge::non_empty();

        let judgment = judge.evaluate(&trace_with_response("   \n\t ")).await;
        assert_eq!(judgment.outcome, JudgeOutcome::Fail);

        let judgment = judge.evaluate(&trace_with_response("Holdings: AAPL")).await;
        assert_eq!(judgment.outcome, JudgeOutcome::Pass);
    }

    #[tokio::test]
    async fn test_min_length() {
        let judge = RuleBasedJudge::min_length(10);

        let judgment = judge.evaluate(&trace_with_response("short")).await;
        assert_eq!(judgment.outcome, JudgeOutcome::Fail);

        let judgment = judge
            .evaluate(&trace_with_response("a response of adequate length"))
            .await;
        assert_eq!(judgment.outcome, JudgeOutcome::Pass);
    }

    #[tokio::test]
    async fn test_no_placeholders() {
        let judge = RuleBasedJudge::no_placeholders();

        for bad in [
            "The price is [INSERT PRICE].",
            "Dear {{client_name}}, your portfolio is ready.",
            "Revenue was ${amount} last quarter.",
            "Account number: XXXX-1234",
            "Fill in here: ____",
            "See <PLACEHOLDER> for details.",
        ] {
            let judgment = judge.evaluate(&trace_with_response(bad)).await;
            assert_eq!(judgment.outcome, JudgeOutcome::Fail, "should fail: {}", bad);
        }

        let judgment = judge
            .evaluate(&trace_with_response("AAPL closed at $192.53, up 1.2%."))
            .await;
        assert_eq!(judgment.outcome, JudgeOutcome::Pass);
    }

    #[tokio::test]
    async fn test_deterministic_across_calls() {
        let judge = RuleBasedJudge::min_length_default();
        let trace = trace_with_response("deterministic check");

        let first = judge.evaluate(&trace).await;
        for _ in 0..10 {
            let again = judge.evaluate(&trace).await;
            assert_eq!(again.outcome, first.outcome);
        }
    }
}
