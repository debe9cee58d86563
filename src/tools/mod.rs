//! Tool trait and registry
//!
//! Tools are the actions the model can request through the textual
//! protocol: string in, observation string out. Business failures are part
//! of the observation (an `ERROR:` string the model can react to), never a
//! hard error.

use crate::calc;
use crate::ledger::Ledger;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the session ledger.
pub type SharedLedger = Arc<RwLock<Ledger>>;

/// Trait for a single tool
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn execute(&self, input: &str) -> Result<String>;
}

/// Tool registry for looking up and executing tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Load (or reload) the expense CSV, replacing the ledger contents.
pub struct LoadCsvExpensesTool {
    ledger: SharedLedger,
}

#[async_trait::async_trait]
impl Tool for LoadCsvExpensesTool {
    fn name(&self) -> &'static str {
        "load_csv_expenses"
    }

    fn description(&self) -> &'static str {
        "Load expenses from a CSV file with date, category, amount, description columns"
    }

    async fn execute(&self, input: &str) -> Result<String> {
        let mut ledger = self.ledger.write().await;
        Ok(ledger.load_csv(input))
    }
}

/// Sum amounts for one category, or all of them with `ALL`.
pub struct SumByCategoryTool {
    ledger: SharedLedger,
}

#[async_trait::async_trait]
impl Tool for SumByCategoryTool {
    fn name(&self) -> &'static str {
        "sum_by_category"
    }

    fn description(&self) -> &'static str {
        "Sum expense amounts for a category, or ALL for the grand total"
    }

    async fn execute(&self, input: &str) -> Result<String> {
        let ledger = self.ledger.read().await;
        Ok(ledger.sum_by_category(input))
    }
}

/// Propose per-category cuts toward a savings target.
pub struct SuggestCutsTool {
    ledger: SharedLedger,
}

#[async_trait::async_trait]
impl Tool for SuggestCutsTool {
    fn name(&self) -> &'static str {
        "suggest_cuts"
    }

    fn description(&self) -> &'static str {
        "Suggest spending cuts per category to reach a savings target"
    }

    async fn execute(&self, input: &str) -> Result<String> {
        let ledger = self.ledger.read().await;
        Ok(ledger.suggest_cuts(input))
    }
}

/// Report the category with the highest total spend.
pub struct TopCategoryTool {
    ledger: SharedLedger,
}

#[async_trait::async_trait]
impl Tool for TopCategoryTool {
    fn name(&self) -> &'static str {
        "top_category"
    }

    fn description(&self) -> &'static str {
        "Return the category with the highest total spend (no input)"
    }

    async fn execute(&self, _input: &str) -> Result<String> {
        let ledger = self.ledger.read().await;
        Ok(ledger.top_category())
    }
}

/// Evaluate a restricted arithmetic expression.
pub struct CalculateTool;

#[async_trait::async_trait]
impl Tool for CalculateTool {
    fn name(&self) -> &'static str {
        "calculate"
    }

    fn description(&self) -> &'static str {
        "Evaluate an arithmetic expression (numbers, + - * / and parentheses)"
    }

    async fn execute(&self, input: &str) -> Result<String> {
        match calc::evaluate(input.trim()) {
            Ok(value) => Ok(value.to_string()),
            Err(e) => Ok(format!("ERROR: {}", e)),
        }
    }
}

/// Create the default registry wired to one session ledger.
pub fn create_default_registry(ledger: SharedLedger) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(LoadCsvExpensesTool {
        ledger: ledger.clone(),
    }));
    registry.register(Arc::new(SumByCategoryTool {
        ledger: ledger.clone(),
    }));
    registry.register(Arc::new(SuggestCutsTool {
        ledger: ledger.clone(),
    }));
    registry.register(Arc::new(TopCategoryTool { ledger }));
    registry.register(Arc::new(CalculateTool));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        create_default_registry(Arc::new(RwLock::new(Ledger::new())))
    }

    #[test]
    fn test_default_registry_has_all_five_actions() {
        let registry = registry();
        let mut names = registry.list();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "calculate",
                "load_csv_expenses",
                "suggest_cuts",
                "sum_by_category",
                "top_category"
            ]
        );
        assert!(registry.get("browse_web").is_none());
    }

    #[tokio::test]
    async fn test_calculate_tool_formats_results() {
        let tool = CalculateTool;
        assert_eq!(tool.execute("2+2").await.unwrap(), "4");
        assert_eq!(tool.execute(" 10 / 4 ").await.unwrap(), "2.5");
        assert_eq!(
            tool.execute("1/0").await.unwrap(),
            "ERROR: division by zero"
        );
    }

    #[tokio::test]
    async fn test_ledger_tools_share_one_ledger() {
        let ledger: SharedLedger = Arc::new(RwLock::new(Ledger::new()));
        let registry = create_default_registry(ledger.clone());

        let sum = registry.get("sum_by_category").unwrap();
        let observation = sum.execute("ALL").await.unwrap();
        assert_eq!(
            observation,
            "ERROR: no expenses loaded. Use load_csv_expenses first."
        );

        // A load through the tool is visible to the query tools.
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,category,amount,description").unwrap();
        writeln!(file, "2024-01-01,Food,12.50,lunch").unwrap();
        file.flush().unwrap();

        let load = registry.get("load_csv_expenses").unwrap();
        let observation = load
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert!(observation.starts_with("Loaded 1 expenses"));

        let observation = sum.execute("ALL").await.unwrap();
        assert_eq!(observation, "Total amount: 12.50");
    }
}
