//! Expense ReAct Agent
//!
//! A command-loop agent that:
//! - Converses with an LLM steered purely by a textual action protocol
//! - Parses `Action: <name>: <input>` lines out of model responses
//! - Dispatches actions against an in-memory expense ledger
//! - Feeds observations back into the transcript until a final answer
//!
//! TURN LOOP:
//! AWAITING_MODEL → PARSING → (DISPATCHING → AWAITING_MODEL) | TERMINATED

pub mod agent;
pub mod calc;
pub mod config;
pub mod error;
pub mod ledger;
pub mod llm;
pub mod models;
pub mod parser;
pub mod tools;

pub use error::{AgentError, Result};

// Re-export common types
pub use agent::{ExpenseAgent, UnknownActionPolicy};
pub use models::*;
