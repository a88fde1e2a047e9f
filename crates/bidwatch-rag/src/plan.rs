//! Tolerant parsing and normalization of planner responses
//!
//! Planner output is LLM text: it may be clean JSON, JSON buried in prose,
//! partially structured, or garbage. Everything normalizes to a usable
//! outline; nothing here returns an error.

use serde_json::Value;

use crate::types::PlanStep;

/// Default intent when the planner gives none
pub const DEFAULT_INTENT: &str = "research";
/// Generic web-research collection tool
pub const RESEARCH_TOOL: &str = "research";
/// Domain notice-collection tool
pub const GOVERNMENT_TOOL: &str = "government";
/// Generic report type
pub const RESEARCH_REPORT: &str = "research_report";
/// Domain report type
pub const GOVERNMENT_REPORT: &str = "government_proposal";

/// Normalized planner output
#[derive(Debug, Clone)]
pub struct PlanOutline {
    /// Classified intent
    pub intent: String,
    /// Planner confidence
    pub confidence: f32,
    /// Diagnostics accumulated so far
    pub reasons: Vec<String>,
    /// Ordered plan steps
    pub plan: Vec<PlanStep>,
    /// Report type, if the planner chose one
    pub final_output: Option<String>,
}

/// Parse a raw planner response into a normalized outline
pub fn parse_response(raw: &str) -> PlanOutline {
    let value = serde_json::from_str::<Value>(raw.trim())
        .ok()
        .or_else(|| extract_json_object(raw));
    normalize(value)
}

/// The minimal fallback outline used when planning failed entirely
pub fn fallback_outline() -> PlanOutline {
    normalize(None)
}

/// Normalize a (possibly absent, possibly partial) planner value.
///
/// A `plan`-bearing object keeps its plan and gets default intent and
/// confidence; an `intent`-bearing object without a plan gets an empty plan
/// at lower confidence; anything else becomes the minimal fallback.
pub fn normalize(value: Option<Value>) -> PlanOutline {
    match value {
        Some(Value::Object(map)) if map.contains_key("plan") => PlanOutline {
            intent: string_field(&map, "intent").unwrap_or_else(|| DEFAULT_INTENT.to_string()),
            confidence: float_field(&map, "confidence").unwrap_or(0.7),
            reasons: string_list(&map, "reasons"),
            plan: parse_steps(map.get("plan")),
            final_output: string_field(&map, "final_output"),
        },
        Some(Value::Object(map)) if map.contains_key("intent") => PlanOutline {
            intent: string_field(&map, "intent").unwrap_or_else(|| DEFAULT_INTENT.to_string()),
            confidence: float_field(&map, "confidence").unwrap_or(0.6),
            reasons: string_list(&map, "reasons"),
            plan: Vec::new(),
            final_output: string_field(&map, "final_output"),
        },
        _ => PlanOutline {
            intent: DEFAULT_INTENT.to_string(),
            confidence: 0.5,
            reasons: vec!["planner-fallback".to_string()],
            plan: Vec::new(),
            final_output: None,
        },
    }
}

/// Pull the first balanced JSON object out of surrounding prose
fn extract_json_object(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &raw[start..start + offset + ch.len_utf8()];
                    return serde_json::from_str(candidate).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_steps(value: Option<&Value>) -> Vec<PlanStep> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            let tool = map.get("tool")?.as_str()?.trim();
            if tool.is_empty() {
                return None;
            }
            let params = map
                .get("params")
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
            Some(PlanStep::with_params(tool, params))
        })
        .collect()
}

fn string_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn float_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<f32> {
    map.get(key).and_then(Value::as_f64).map(|f| f as f32)
}

fn string_list(map: &serde_json::Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
