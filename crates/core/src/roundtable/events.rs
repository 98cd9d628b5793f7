//! Roundtable wire events.
//!
//! Every event travels as one JSON object per line:
//!
//! ```text
//! {"type":"message_chunk","data":{"agent":"director","chunk":"Open on "},"timestamp":"2026-01-04T10:00:00Z"}
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Workflow stage reported by `status` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analysis,
    Debate,
    Synthesis,
    Shots,
    Complete,
}

/// One shot in the synthesized shot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub number: u32,
    pub shot_type: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_movement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

/// The roundtable event vocabulary.
///
/// Serialized adjacently tagged: the variant name becomes `type` and the
/// fields become the `data` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RoundtableEvent {
    Status {
        message: String,
        progress: u8,
        stage: Stage,
    },
    TypingStart {
        agent: String,
    },
    MessageChunk {
        agent: String,
        chunk: String,
    },
    MessageComplete {
        agent: String,
        message: String,
    },
    DebateStart {
        agent: String,
    },
    DebateChunk {
        agent: String,
        chunk: String,
    },
    DebateComplete {
        agent: String,
        message: String,
    },
    SynthesisStart {},
    SynthesisChunk {
        chunk: String,
    },
    SynthesisComplete {
        prompt: String,
    },
    ShotsStart {},
    ShotsChunk {
        chunk: String,
    },
    ShotsComplete {
        shot_list: String,
        #[serde(default)]
        shots: Vec<Shot>,
    },
    Complete {
        segment_id: DbId,
        prompt: String,
        shot_list: String,
    },
    Error {
        message: String,
    },
}

/// All `type` tags understood by this version of the protocol.
pub const KNOWN_EVENT_TYPES: &[&str] = &[
    "status",
    "typing_start",
    "message_chunk",
    "message_complete",
    "debate_start",
    "debate_chunk",
    "debate_complete",
    "synthesis_start",
    "synthesis_chunk",
    "synthesis_complete",
    "shots_start",
    "shots_chunk",
    "shots_complete",
    "complete",
    "error",
];

impl RoundtableEvent {
    /// The wire `type` tag of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::TypingStart { .. } => "typing_start",
            Self::MessageChunk { .. } => "message_chunk",
            Self::MessageComplete { .. } => "message_complete",
            Self::DebateStart { .. } => "debate_start",
            Self::DebateChunk { .. } => "debate_chunk",
            Self::DebateComplete { .. } => "debate_complete",
            Self::SynthesisStart {} => "synthesis_start",
            Self::SynthesisChunk { .. } => "synthesis_chunk",
            Self::SynthesisComplete { .. } => "synthesis_complete",
            Self::ShotsStart {} => "shots_start",
            Self::ShotsChunk { .. } => "shots_chunk",
            Self::ShotsComplete { .. } => "shots_complete",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    /// `complete` and `error` end a roundtable run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    pub fn status(message: impl Into<String>, progress: u8, stage: Stage) -> Self {
        Self::Status {
            message: message.into(),
            progress,
            stage,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Encode as a single NDJSON line (terminated by `\n`) stamped with
    /// `timestamp`.
    pub fn to_line_at(&self, timestamp: Timestamp) -> String {
        let mut value = serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "type": "error", "data": { "message": "unencodable event" } })
        });
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp.to_rfc3339()),
            );
        }
        let mut line = value.to_string();
        line.push('\n');
        line
    }

    /// Encode as an NDJSON line stamped with the current time.
    pub fn to_line(&self) -> String {
        self.to_line_at(chrono::Utc::now())
    }
}
