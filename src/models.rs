//! Core data models for the expense agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Conversation =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        write!(f, "{}", s)
    }
}

/// One entry of the transcript sent to the model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

//
// ================= Ledger =================
//

/// A single expense row loaded from a CSV source.
///
/// Category and description are trimmed at ingestion; the date is stored
/// exactly as given. The amount is normalized to a number at load time so
/// aggregate queries never reparse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub date: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

//
// ================= Action Protocol =================
//

/// A structured action request extracted from a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub name: String,
    pub input: String,
}

//
// ================= Query Result =================
//

/// Per-turn trace entry recorded by the control loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub action: Option<ActionRequest>,
    pub observation: Option<String>,
    pub at: DateTime<Utc>,
}

/// How a query ended. Turn-budget exhaustion is a defined non-answer
/// outcome, distinct from both an answer and an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum QueryOutcome {
    Answered(String),
    Exhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReport {
    pub query_id: Uuid,
    pub outcome: QueryOutcome,
    pub turns_used: u32,
    pub trace: Vec<TurnRecord>,
    pub execution_time_ms: u64,
}

impl QueryReport {
    /// Final answer text, if the query produced one.
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            QueryOutcome::Answered(text) => Some(text),
            QueryOutcome::Exhausted => None,
        }
    }
}
