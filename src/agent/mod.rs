//! Control loop for the expense agent
//!
//! Drives one query through the turn state machine:
//! AWAITING_MODEL → PARSING → (DISPATCHING → AWAITING_MODEL) | TERMINATED
//!
//! Each turn sends the full transcript to the model, parses the reply for
//! an action request, dispatches it against the tool registry and feeds the
//! observation back as the next user turn. A reply without an action line
//! is the final answer; running out of turns is a defined non-answer
//! outcome.

use crate::config::AgentConfig;
use crate::llm::CompletionBackend;
use crate::models::{Message, QueryOutcome, QueryReport, TurnRecord};
use crate::parser::parse_action;
use crate::tools::ToolRegistry;
use crate::AgentError;
use crate::Result;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// System instructions for the model. The action menu and the
/// Action/PAUSE/Observation/Answer conventions are the protocol contract;
/// the parser and dispatcher depend on this exact wording.
const SYSTEM_PROMPT: &str = "\
You are a personal finance assistant using ReAct.

Format:
Thought: ...
Action: <tool>: <input>
PAUSE

Then you will receive:
Observation: ...

When you have enough information, output:
Answer: ...

Available tools:
- load_csv_expenses: <path>
- sum_by_category: <category or ALL>
- suggest_cuts: <target_saving_number>
- calculate: <math expression>
- top_category: <no input>

Rules:
- If no CSV is loaded yet and the user asks about expenses, first call load_csv_expenses.
- Use sum_by_category(\"ALL\") for total.
- Keep the final Answer concise and actionable.
- If the user asks for savings suggestions, call suggest_cuts with the target amount.
- top_category: no input
- Use top_category to get the top category.";

/// What to do when the model requests an action name that is not in the
/// registry. `Fail` treats it as a protocol violation and ends the query;
/// `Observe` feeds an "Unknown action" observation back so the model can
/// self-correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownActionPolicy {
    #[default]
    Fail,
    Observe,
}

/// One-session expense agent: a completion backend, a tool registry bound
/// to this session's ledger, and the loop limits.
pub struct ExpenseAgent {
    backend: Box<dyn CompletionBackend>,
    registry: ToolRegistry,
    max_turns: u32,
    request_timeout: Duration,
    query_deadline: Duration,
    unknown_action: UnknownActionPolicy,
}

impl ExpenseAgent {
    pub fn new(
        backend: Box<dyn CompletionBackend>,
        registry: ToolRegistry,
        config: &AgentConfig,
    ) -> Self {
        Self {
            backend,
            registry,
            max_turns: config.max_turns,
            request_timeout: config.request_timeout,
            query_deadline: config.query_deadline,
            unknown_action: UnknownActionPolicy::default(),
        }
    }

    pub fn with_unknown_action_policy(mut self, policy: UnknownActionPolicy) -> Self {
        self.unknown_action = policy;
        self
    }

    /// Run one question to completion, an exhausted turn budget, or an
    /// error. Strictly sequential: one completion and at most one action
    /// per turn.
    pub async fn query(&self, question: &str) -> Result<QueryReport> {
        let query_id = Uuid::new_v4();
        let started = Instant::now();

        let mut transcript = vec![Message::system(SYSTEM_PROMPT)];
        let mut next_prompt = question.to_string();
        let mut trace: Vec<TurnRecord> = Vec::new();

        info!(%query_id, question = %question, "Query started");

        for turn in 1..=self.max_turns {
            if started.elapsed() >= self.query_deadline {
                warn!(%query_id, turn, "Query deadline exceeded");
                return Err(AgentError::DeadlineExceeded(self.query_deadline.as_secs()));
            }

            transcript.push(Message::user(next_prompt.clone()));

            let completion =
                tokio::time::timeout(self.request_timeout, self.backend.complete(&transcript))
                    .await
                    .map_err(|_| {
                        AgentError::CompletionTimeout(self.request_timeout.as_secs())
                    })??;

            transcript.push(Message::assistant(completion.clone()));
            debug!(%query_id, turn, response_len = completion.len(), "Model responded");

            let Some(action) = parse_action(&completion) else {
                trace.push(TurnRecord {
                    turn,
                    action: None,
                    observation: None,
                    at: Utc::now(),
                });

                info!(%query_id, turn, "Final answer produced");
                return Ok(QueryReport {
                    query_id,
                    outcome: QueryOutcome::Answered(completion),
                    turns_used: turn,
                    trace,
                    execution_time_ms: started.elapsed().as_millis() as u64,
                });
            };

            let observation = match self.registry.get(&action.name) {
                Some(tool) => {
                    debug!(%query_id, turn, action = %action.name, input = %action.input, "Dispatching action");
                    tool.execute(&action.input).await?
                }
                None if self.unknown_action == UnknownActionPolicy::Observe => {
                    warn!(%query_id, turn, action = %action.name, "Unknown action, feeding back");
                    format!("Unknown action: {}", action.name)
                }
                None => {
                    warn!(%query_id, turn, action = %action.name, "Unknown action, aborting query");
                    return Err(AgentError::Protocol {
                        name: action.name,
                        input: action.input,
                    });
                }
            };

            debug!(%query_id, turn, observation = %observation, "Observation recorded");
            trace.push(TurnRecord {
                turn,
                action: Some(action),
                observation: Some(observation.clone()),
                at: Utc::now(),
            });

            next_prompt = format!("Observation: {}", observation);
        }

        warn!(%query_id, max_turns = self.max_turns, "Turn budget exhausted without an answer");
        Ok(QueryReport {
            query_id,
            outcome: QueryOutcome::Exhausted,
            turns_used: self.max_turns,
            trace,
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}
