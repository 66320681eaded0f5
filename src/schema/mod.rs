use serde::Serialize;

pub const CALL_CENTER_ALIASES: [&str; 4] = ["Call Center", "call center", "Center", "CallCenter"];

pub const TIMESTAMP_HINTS: [&str; 1] = ["Timestamp"];
pub const AGENT_HINTS: [&str; 3] = ["Agent's Name", "Agent Name", "Agent"];
pub const CONCERN_HINTS: [&str; 3] = ["Concern for Review", "Concern", "Review"];
pub const FEEDBACK_TYPE_HINTS: [&str; 2] = ["type of feedback", "feedback"];
pub const ITINERARY_HINTS: [&str; 2] = ["Itinerary #", "Itinerary"];

/// Resolved column names for the current header set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub call_center: Option<String>,
    pub timestamp: Option<String>,
    pub agent: Option<String>,
    pub concern: Option<String>,
    pub feedback_type: Option<String>,
    pub itinerary: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailColumn {
    Timestamp,
    Agent,
    Concern,
    FeedbackType,
    Itinerary,
}

impl FieldMapping {
    pub fn infer(headers: &[String]) -> Self {
        Self {
            call_center: resolve_call_center_field(headers),
            timestamp: resolve_header_by_hints(headers, &TIMESTAMP_HINTS),
            agent: resolve_header_by_hints(headers, &AGENT_HINTS),
            concern: resolve_header_by_hints(headers, &CONCERN_HINTS),
            feedback_type: resolve_header_by_hints(headers, &FEEDBACK_TYPE_HINTS),
            itinerary: resolve_header_by_hints(headers, &ITINERARY_HINTS),
        }
    }

    pub fn call_center_field(&self) -> Option<&str> {
        self.call_center.as_deref()
    }

    /// Optional report columns that resolved, in report order.
    pub fn detail_columns(&self) -> Vec<(DetailColumn, &str)> {
        [
            (DetailColumn::Timestamp, self.timestamp.as_deref()),
            (DetailColumn::Agent, self.agent.as_deref()),
            (DetailColumn::Concern, self.concern.as_deref()),
            (DetailColumn::FeedbackType, self.feedback_type.as_deref()),
            (DetailColumn::Itinerary, self.itinerary.as_deref()),
        ]
        .into_iter()
        .filter_map(|(col, field)| field.map(|f| (col, f)))
        .collect()
    }
}

pub fn resolve_call_center_field(headers: &[String]) -> Option<String> {
    for alias in CALL_CENTER_ALIASES.iter() {
        let alias = alias.to_lowercase();
        if let Some(found) = headers.iter().find(|h| h.to_lowercase() == alias) {
            return Some(found.clone());
        }
    }
    headers
        .iter()
        .find(|h| {
            let lower = h.to_lowercase();
            lower.contains("call") && lower.contains("center")
        })
        .or_else(|| headers.first())
        .cloned()
}

/// First header containing every word of some hint, hints tried in order.
pub fn resolve_header_by_hints(headers: &[String], hints: &[&str]) -> Option<String> {
    let lower: Vec<(&String, String)> = headers.iter().map(|h| (h, h.to_lowercase())).collect();
    for hint in hints {
        let hint = hint.to_lowercase();
        let tokens: Vec<&str> = hint.split(' ').filter(|t| !t.is_empty()).collect();
        if let Some((orig, _)) = lower
            .iter()
            .find(|(_, low)| tokens.iter().all(|t| low.contains(t)))
        {
            return Some((*orig).clone());
        }
    }
    None
}
