//! # Krisis - Agent Quality Assessment Engine
//!
//! Krisis (Κρίσις) takes a captured agent execution trace and runs it
//! through a battery of independent judges to produce a unified,
//! auditable quality verdict, then decides which traces are worth a
//! human reviewer's time:
//! - Rule-based, heuristic, and model-based judges behind one trait
//! - Failure-isolated parallel fan-out with per-judge timeouts
//! - Deterministic verdict aggregation with hard-requirement gates
//! - Review routing with borderline detection and stable calibration
//!   sampling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use krisis_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AssessmentConfig::default();
//!     let registry = Arc::new(JudgeRegistry::with_default_suite());
//!
//!     let trace = TraceRecord::builder()
//!         .user_input("What stocks does client C001 own?")
//!         .final_response("Client C001 holds AAPL (120 shares) and NVDA (45 shares).")
//!         .build();
//!
//!     let orchestrator = AssessmentOrchestrator::new(registry, &config);
//!     let report = orchestrator.run(&trace).await;
//!
//!     let decision = ReviewRouter::new(&config).route(&report);
//!     println!("{}", report.to_summary());
//!     println!("escalated: {}", decision.escalated);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Trace Record → Assessment Orchestrator → Judgments → Verdict
//! Aggregator → Assessment Report → Review Router → escalate/archive.
//! Trace capture, evaluator models, and durable storage are external
//! collaborators behind the `EvaluatorModel`, `ReportStore`, and
//! `ReviewQueue` traits.

pub mod config;
pub mod error;
pub mod judge;
pub mod orchestrator;
pub mod registry;
pub mod router;
pub mod sink;
pub mod trace;
pub mod verdict;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{AssessmentConfig, ConfigBuilder};
    pub use crate::error::{KrisisError, Result};
    pub use crate::judge::{
        default_guidelines, EvaluatorModel, EvaluatorVerdict, Guideline, GuidelineCatalog,
        GuidelineJudge, HeuristicJudge, Judge, JudgeCategory, JudgeOutcome, Judgment,
        RuleBasedJudge,
    };
    pub use crate::orchestrator::{AssessmentOrchestrator, AssessmentOutcome, AssessmentPipeline};
    pub use crate::registry::{JudgeRegistry, RegistryError};
    pub use crate::router::{ReviewDecision, ReviewPriority, ReviewRouter};
    pub use crate::sink::{InMemoryReportStore, InMemoryReviewQueue, ReportStore, ReviewQueue};
    pub use crate::trace::{Step, StepKind, TraceRecord, TraceRecordBuilder};
    pub use crate::verdict::{
        AssessmentReport, CategoryCounts, Verdict, VerdictAggregator, VerdictBreakdown,
    };
}
