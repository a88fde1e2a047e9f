//! Routing decision records

use serde::{Deserialize, Serialize};

use super::Hit;

/// One external-collaborator invocation in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Tool identifier (e.g. "government", "research", "rag")
    pub tool: String,
    /// Tool parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

impl PlanStep {
    /// Create a step with empty parameters
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            params: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Create a step with parameters
    pub fn with_params(tool: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            params,
        }
    }
}

/// Which path the router took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Route {
    /// Local retrieval was sufficient; answered from the index
    RagFastPath,
    /// A plan of collection steps was assembled
    PlannerOnly,
    /// The quality-gate search found nothing at all
    WebFallback,
}

/// The outcome of routing one query. Built once, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    /// Classified intent (e.g. "research", "government")
    pub intent: String,
    /// Planner confidence in the intent
    pub confidence: f32,
    /// Human-readable routing diagnostics
    pub reasons: Vec<String>,
    /// Ordered collection steps to execute
    pub plan: Vec<PlanStep>,
    /// Report type the final formatter should produce
    pub final_output: String,
    /// Composed markdown answer (fast path only)
    pub answer: Option<String>,
    /// Path taken
    pub route: Route,
    /// Quality-gate hits, attached for auditability
    pub hits: Vec<Hit>,
}
