//! Investigation Events
//!
//! Typed fragments delivered by the investigation backend. The transport layer
//! decodes the wire envelope into [`InputFragment`] values; everything after
//! that point (buffering, ordering, deduplication) happens in the
//! [`StreamProcessor`](crate::processor::StreamProcessor).
//!
//! # Payloads
//!
//! Most payloads are a small JSON record carrying optional named fields. The
//! decoding is deliberately forgiving:
//!
//! - missing fields decode to the empty string
//! - a payload that is not a JSON object is treated as raw free text and lands
//!   in [`PayloadRecord::investigation`]

use serde::{Deserialize, Serialize};

/// Category of a fragment produced by the investigation backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentCategory {
    /// Status line ("Searching logs (3 found)")
    Progress,
    /// A document or data source consulted by the backend
    Source,
    /// Chain-of-thought step text
    Reasoning,
    /// Final answer text
    Answer,
    /// Suggested follow-up questions, one per line
    #[serde(alias = "follow_up")]
    FollowUp,
    /// Investigation title
    Title,
    /// Internal retry diagnostics (never shown)
    Error,
    /// Total investigation time in milliseconds
    Duration,
}

/// Delivery sub-protocol marker of a fragment
///
/// `None` is the legacy protocol: the payload holds the full text accumulated
/// so far. `Start`/`Delta`/`End` carry only new text. `Full` is a one-shot
/// snapshot of the final text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaKind {
    /// Legacy full-snapshot delivery
    #[default]
    None,
    /// First fragment of a delta-delivered block
    Start,
    /// Incremental text
    Delta,
    /// Last fragment of a delta-delivered block
    End,
    /// Complete text delivered at once
    Full,
}

impl DeltaKind {
    /// Whether this kind belongs to the incremental protocol
    #[must_use]
    pub fn is_incremental(self) -> bool {
        matches!(self, Self::Start | Self::Delta | Self::End)
    }
}

/// A single fragment from the transport layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFragment {
    /// What kind of content this fragment carries
    pub category: FragmentCategory,
    /// Delivery sub-protocol
    #[serde(default, rename = "delta")]
    pub delta_kind: DeltaKind,
    /// Raw payload text (often a JSON record)
    #[serde(default)]
    pub payload: String,
}

impl InputFragment {
    /// Create a fragment
    pub fn new(category: FragmentCategory, delta_kind: DeltaKind, payload: impl Into<String>) -> Self {
        Self {
            category,
            delta_kind,
            payload: payload.into(),
        }
    }

    /// Legacy-protocol fragment (no delta marker)
    pub fn legacy(category: FragmentCategory, payload: impl Into<String>) -> Self {
        Self::new(category, DeltaKind::None, payload)
    }

    /// Progress/status fragment
    pub fn progress(text: impl Into<String>) -> Self {
        Self::legacy(FragmentCategory::Progress, text)
    }

    /// Answer text delivered incrementally
    pub fn answer_delta(text: impl Into<String>) -> Self {
        Self::new(FragmentCategory::Answer, DeltaKind::Delta, text)
    }

    /// Reasoning fragment built from a record
    #[must_use]
    pub fn reasoning(delta_kind: DeltaKind, record: &PayloadRecord) -> Self {
        Self::new(FragmentCategory::Reasoning, delta_kind, record.encode())
    }

    /// Decode the payload as a record
    #[must_use]
    pub fn record(&self) -> PayloadRecord {
        PayloadRecord::decode(&self.payload)
    }
}

/// Named fields carried inside a fragment payload
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadRecord {
    /// Step or source identifier
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// Human-readable step description (used as the step header)
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    /// Optional note shown under the step header
    #[serde(deserialize_with = "lenient_string")]
    pub explanation: String,
    /// Step text (new text in delta mode, accumulated text in legacy mode)
    #[serde(deserialize_with = "lenient_string")]
    pub investigation: String,
    /// Backend status of the step ("in_progress", "completed", ...)
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    /// Display title (sources and titles)
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
}

impl PayloadRecord {
    /// Decode a payload, falling back to raw text
    #[must_use]
    pub fn decode(payload: &str) -> Self {
        let trimmed = payload.trim_start();
        if trimmed.starts_with('{') {
            if let Ok(record) = serde_json::from_str::<Self>(trimmed) {
                return record;
            }
        }
        Self {
            investigation: payload.to_string(),
            ..Self::default()
        }
    }

    /// Encode as the JSON text a backend would send
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Set the identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the explanation
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Set the step text
    #[must_use]
    pub fn with_investigation(mut self, investigation: impl Into<String>) -> Self {
        self.investigation = investigation.into();
        self
    }

    /// Set the status
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Accept strings, numbers, booleans and null for any record field
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
