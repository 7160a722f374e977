//! Trace records: read-only views over captured agent executions
//!
//! A [`TraceRecord`] is produced by an external instrumentation layer
//! and consumed here by reference. It is immutable once built: fields
//! are private and exposed through read accessors only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of step in an agent execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// The agent invoked a tool
    ToolCall,
    /// The agent queried a retrieval index
    Retrieval,
    /// The agent called the underlying model
    LlmCall,
    /// The agent emitted its final response
    FinalResponse,
}

/// One step of a captured agent execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Step kind
    pub kind: StepKind,
    /// Step payload (tool arguments, retrieved documents, model output)
    pub payload: Value,
    /// When the step started
    pub timestamp: DateTime<Utc>,
    /// Step duration in milliseconds
    pub duration_ms: u64,
}

impl Step {
    /// Create a new step stamped with the current time
    pub fn new(kind: StepKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            timestamp: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Set the step duration
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// A captured agent execution: ordered steps, the user input, and the
/// final response text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    trace_id: String,
    user_input: String,
    final_response: String,
    steps: Vec<Step>,
    captured_at: DateTime<Utc>,
}

impl TraceRecord {
    /// Create a builder for a trace record
    pub fn builder() -> TraceRecordBuilder {
        TraceRecordBuilder::new()
    }

    /// Opaque unique identifier of the trace
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// The user input that started the execution
    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// The agent's final response text
    pub fn final_response(&self) -> &str {
        &self.final_response
    }

    /// Ordered steps of the execution
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Steps that invoked a tool
    pub fn tool_calls(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.kind == StepKind::ToolCall)
    }

    /// Steps that queried a retrieval index
    pub fn retrievals(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.kind == StepKind::Retrieval)
    }

    /// When the trace was captured
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Total duration across all steps in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    /// Parse a trace record from JSON
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the trace record to JSON
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builder for [`TraceRecord`]
pub struct TraceRecordBuilder {
    trace_id: Option<String>,
    user_input: String,
    final_response: String,
    steps: Vec<Step>,
    captured_at: Option<DateTime<Utc>>,
}

impl TraceRecordBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            trace_id: None,
            user_input: String::new(),
            final_response: String::new(),
            steps: Vec::new(),
            captured_at: None,
        }
    }

    /// Set the trace ID; a v4 UUID is generated when omitted
    pub fn trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Set the user input
    pub fn user_input(mut self, input: impl Into<String>) -> Self {
        self.user_input = input.into();
        self
    }

    /// Set the final response text
    pub fn final_response(mut self, response: impl Into<String>) -> Self {
        self.final_response = response.into();
        self
    }

    /// Append a step
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Set the capture timestamp
    pub fn captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }

    /// Build the immutable trace record
    pub fn build(self) -> TraceRecord {
        TraceRecord {
            trace_id: self
                .trace_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_input: self.user_input,
            final_response: self.final_response,
            steps: self.steps,
            captured_at: self.captured_at.unwrap_or_else(Utc::now),
        }
    }
}

impl Default for TraceRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}
