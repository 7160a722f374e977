//! Assessment orchestration: fanning a trace out to every judge
//!
//! Each judge runs in its own spawned task with its own deadline, so a
//! slow or failing judge degrades only its own judgment. Results are
//! reassembled into registry registration order after collection, and
//! every run yields exactly one report — even when every judge errors.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AssessmentConfig;
use crate::error::Result;
use crate::judge::Judgment;
use crate::registry::JudgeRegistry;
use crate::router::{ReviewDecision, ReviewRouter};
use crate::sink::{ReportStore, ReviewQueue};
use crate::trace::TraceRecord;
use crate::verdict::{AssessmentReport, VerdictAggregator};

/// Runs every registered judge against a trace and aggregates the
/// judgments into one report
pub struct AssessmentOrchestrator {
    registry: Arc<JudgeRegistry>,
    aggregator: VerdictAggregator,
    judge_timeout: Duration,
}

impl AssessmentOrchestrator {
    /// Create an orchestrator over a registry
    pub fn new(registry: Arc<JudgeRegistry>, config: &AssessmentConfig) -> Self {
        Self {
            registry,
            aggregator: VerdictAggregator::new(config),
            judge_timeout: config.judge_timeout,
        }
    }

    /// Assess a trace: invoke every judge once, collect all judgments
    /// (including errors), and aggregate them into a report
    ///
    /// Judges are never re-invoked within a run; retry policy, if any,
    /// lives inside the judge.
    pub async fn run(&self, trace: &TraceRecord) -> AssessmentReport {
        let trace = Arc::new(trace.clone());
        let judges = self.registry.list().to_vec();

        tracing::info!(
            trace_id = %trace.trace_id(),
            judges = judges.len(),
            "starting assessment run"
        );

        // Identity captured up front so a panicked task can still be
        // accounted for at its registered position
        let idents: Vec<(String, crate::judge::JudgeCategory)> = judges
            .iter()
            .map(|j| (j.name().to_string(), j.category()))
            .collect();

        let handles: Vec<_> = judges
            .into_iter()
            .enumerate()
            .map(|(idx, judge)| {
                let trace = trace.clone();
                let timeout = self.judge_timeout;
                tokio::spawn(async move {
                    let judgment =
                        match tokio::time::timeout(timeout, judge.evaluate(&trace)).await {
                            Ok(judgment) => judgment,
                            Err(_) => {
                                tracing::warn!(judge = judge.name(), "judge timed out");
                                Judgment::error(judge.name(), judge.category(), "timeout")
                            }
                        };
                    (idx, judgment)
                })
            })
            .collect();

        // Reassemble into registration order regardless of completion
        // order; a panicked judge becomes an error judgment in place
        let mut ordered: Vec<Option<Judgment>> = idents.iter().map(|_| None).collect();
        for (i, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok((idx, judgment)) => ordered[idx] = Some(judgment),
                Err(e) => {
                    let (name, category) = &idents[i];
                    tracing::warn!(judge = %name, error = %e, "judge task panicked");
                    ordered[i] = Some(Judgment::error(
                        name,
                        *category,
                        format!("judge task panicked: {}", e),
                    ));
                }
            }
        }
        let judgments: Vec<Judgment> = ordered.into_iter().flatten().collect();

        self.aggregator.aggregate(trace.trace_id(), judgments)
    }
}

/// Outcome of one pipeline pass: the report plus the routing decision
#[derive(Debug, Clone)]
pub struct AssessmentOutcome {
    /// The aggregated report
    pub report: AssessmentReport,
    /// The routing decision derived from it
    pub decision: ReviewDecision,
}

/// The full assessment flow: orchestrate, persist, route, and enqueue
/// escalations
pub struct AssessmentPipeline {
    orchestrator: AssessmentOrchestrator,
    router: ReviewRouter,
    store: Arc<dyn ReportStore>,
    queue: Arc<dyn ReviewQueue>,
}

impl AssessmentPipeline {
    /// Create a pipeline over a registry and collaborator sinks
    pub fn new(
        registry: Arc<JudgeRegistry>,
        config: &AssessmentConfig,
        store: Arc<dyn ReportStore>,
        queue: Arc<dyn ReviewQueue>,
    ) -> Self {
        Self {
            orchestrator: AssessmentOrchestrator::new(registry, config),
            router: ReviewRouter::new(config),
            store,
            queue,
        }
    }

    /// Assess a trace end to end
    ///
    /// # Errors
    ///
    /// Only sink failures propagate; judge failures are captured in
    /// the report itself.
    pub async fn process(&self, trace: &TraceRecord) -> Result<AssessmentOutcome> {
        let report = self.orchestrator.run(trace).await;
        self.store.append(&report).await?;

        let decision = self.router.route(&report);
        if decision.escalated {
            self.queue.enqueue(&decision).await?;
        }

        tracing::info!(
            trace_id = %report.trace_id,
            verdict = ?report.verdict,
            escalated = decision.escalated,
            priority = ?decision.priority,
            "assessment complete"
        );

        Ok(AssessmentOutcome { report, decision })
    }
}
