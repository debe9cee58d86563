use expense_agent::{
    agent::ExpenseAgent,
    config::AgentConfig,
    ledger::Ledger,
    llm::OpenAiClient,
    models::QueryOutcome,
    tools::create_default_registry,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let question: String = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        eprintln!("Usage: expense-agent \"<question>\"");
        std::process::exit(2);
    }

    let config = AgentConfig::from_env()?;

    info!(model = %config.model, max_turns = config.max_turns, "Expense agent starting");

    // One ledger and one registry per session
    let ledger = Arc::new(RwLock::new(Ledger::new()));
    let registry = create_default_registry(ledger);
    let backend = Box::new(OpenAiClient::new(&config)?);

    let agent = ExpenseAgent::new(backend, registry, &config);

    match agent.query(&question).await {
        Ok(report) => {
            match &report.outcome {
                QueryOutcome::Answered(answer) => {
                    println!("{}", answer);
                }
                QueryOutcome::Exhausted => {
                    println!(
                        "No answer after {} turns (turn budget exhausted).",
                        report.turns_used
                    );
                }
            }

            println!("\n=== TURN TRACE ({}) ===", report.query_id);
            for record in &report.trace {
                match (&record.action, &record.observation) {
                    (Some(action), Some(observation)) => {
                        println!(
                            "  turn {}: {} ({}) -> {}",
                            record.turn, action.name, action.input, observation
                        );
                    }
                    _ => println!("  turn {}: final answer", record.turn),
                }
            }
            println!("Elapsed: {} ms", report.execution_time_ms);
            Ok(())
        }
        Err(e) => {
            eprintln!("Query failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
