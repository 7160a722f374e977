//! Persistence and review-queue collaborator interfaces
//!
//! Reports and decisions are handed to external collaborators: an
//! append-only store keyed by trace ID, and a human-review queue for
//! escalated traces. The in-memory implementations back tests and the
//! CLI; production deployments supply their own.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::router::ReviewDecision;
use crate::verdict::AssessmentReport;

/// Append-only store for assessment reports, keyed by trace ID
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Append a report
    async fn append(&self, report: &AssessmentReport) -> Result<()>;

    /// Latest report for a trace
    async fn latest(&self, trace_id: &str) -> Result<Option<AssessmentReport>>;

    /// All reports for a trace, oldest first
    async fn history(&self, trace_id: &str) -> Result<Vec<AssessmentReport>>;
}

/// Human-review queue for escalated traces
#[async_trait]
pub trait ReviewQueue: Send + Sync {
    /// Enqueue an escalated decision
    async fn enqueue(&self, decision: &ReviewDecision) -> Result<()>;

    /// Number of pending reviews
    async fn pending(&self) -> Result<usize>;
}

/// In-memory append-only report store
pub struct InMemoryReportStore {
    reports: Arc<RwLock<HashMap<String, Vec<AssessmentReport>>>>,
}

impl InMemoryReportStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            reports: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn append(&self, report: &AssessmentReport) -> Result<()> {
        let mut reports = self.reports.write().await;
        reports
            .entry(report.trace_id.clone())
            .or_default()
            .push(report.clone());
        Ok(())
    }

    async fn latest(&self, trace_id: &str) -> Result<Option<AssessmentReport>> {
        let reports = self.reports.read().await;
        Ok(reports.get(trace_id).and_then(|r| r.last().cloned()))
    }

    async fn history(&self, trace_id: &str) -> Result<Vec<AssessmentReport>> {
        let reports = self.reports.read().await;
        Ok(reports.get(trace_id).cloned().unwrap_or_default())
    }
}

/// In-memory review queue
pub struct InMemoryReviewQueue {
    queue: Arc<RwLock<Vec<ReviewDecision>>>,
}

impl InMemoryReviewQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            queue: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Snapshot of all queued decisions, in arrival order
    pub async fn drain(&self) -> Vec<ReviewDecision> {
        let mut queue = self.queue.write().await;
        std::mem::take(&mut *queue)
    }
}

impl Default for InMemoryReviewQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewQueue for InMemoryReviewQueue {
    async fn enqueue(&self, decision: &ReviewDecision) -> Result<()> {
        let mut queue = self.queue.write().await;
        queue.push(decision.clone());
        Ok(())
    }

    async fn pending(&self) -> Result<usize> {
        let queue = self.queue.read().await;
        Ok(queue.len())
    }
}
