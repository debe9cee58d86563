//! In-memory expense ledger
//!
//! Holds the currently loaded expense records. `load_csv` is the sole
//! mutator and replaces the record set wholesale; the aggregate queries are
//! read-only. Business failures are encoded in the returned observation
//! string, never as a hard error.

use crate::models::ExpenseRecord;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const REQUIRED_COLUMNS: [&str; 4] = ["date", "category", "amount", "description"];
const NOT_LOADED: &str = "ERROR: no expenses loaded. Use load_csv_expenses first.";

/// Per-session expense store. Owned by the session that created it and
/// shared with the tool set behind a lock; there is no process-wide
/// singleton.
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<ExpenseRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    /// Load a CSV expense file, replacing the current record set.
    ///
    /// All-or-nothing: any malformed row aborts the load and leaves the
    /// previously loaded records untouched.
    pub fn load_csv(&mut self, raw_path: &str) -> String {
        let path = raw_path.trim();

        if !Path::new(path).exists() {
            warn!(%path, "Expense file not found");
            return format!("Path {} doesn't exist", path);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(%path, error = %e, "Failed to read expense file");
                return format!("ERROR: failed to read {}: {}", path, e);
            }
        };

        match parse_expense_csv(&content) {
            Ok(records) => {
                let count = records.len();
                self.records = records;
                info!(%path, count, "Expenses loaded");
                format!("Loaded {} expenses from {}", count, path)
            }
            Err(message) => {
                warn!(%path, %message, "Expense load rejected");
                message
            }
        }
    }

    /// Sum of amounts for one category (case-insensitive), or for the whole
    /// ledger when the argument is the literal `ALL`.
    pub fn sum_by_category(&self, raw_category: &str) -> String {
        if self.records.is_empty() {
            return NOT_LOADED.to_string();
        }

        let category = raw_category.trim();
        if category.eq_ignore_ascii_case("ALL") {
            let total: f64 = self.records.iter().map(|r| r.amount).sum();
            return format!("Total amount: {:.2}", total);
        }

        let needle = category.to_lowercase();
        let total: f64 = self
            .records
            .iter()
            .filter(|r| r.category.to_lowercase() == needle)
            .map(|r| r.amount)
            .sum();

        format!("TOTAL_{}={:.2}", category, total)
    }

    /// Greedy per-category cut proposals toward a savings target.
    ///
    /// Categories are ranked by total spend descending; each proposal is
    /// capped at min(10% of the category total, 30% of the category total,
    /// remaining target). The 10% cap always dominates the 30% one.
    pub fn suggest_cuts(&self, raw_target: &str) -> String {
        if self.records.is_empty() {
            return NOT_LOADED.to_string();
        }

        let target = match raw_target.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => return "ERROR: target_saving must be a number like '50'".to_string(),
        };

        let mut ranked = self.totals_by_category();
        // Stable sort keeps first-seen order among equal totals.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut suggestions = Vec::new();
        let mut remaining = target;

        for (category, total) in &ranked {
            if remaining <= 0.0 {
                break;
            }

            let proposed = (total * 0.10).min(remaining).min(total * 0.30);
            if proposed > 0.0 {
                suggestions.push(format!(
                    "- Cut ~{:.2} from {} (current {:.2})",
                    proposed, category, total
                ));
                remaining -= proposed;
            }
        }

        if suggestions.is_empty() {
            return "No suggestions available.".to_string();
        }

        if remaining > 0.0 {
            suggestions.push(format!(
                "(Note: still missing ~{:.2} to reach the target)",
                remaining
            ));
        }

        debug!(target, lines = suggestions.len(), "Cut suggestions built");
        suggestions.join("\n")
    }

    /// Category with the strictly largest total spend. Ties go to the
    /// category seen first in the ledger.
    pub fn top_category(&self) -> String {
        if self.records.is_empty() {
            return "ERROR: no expenses loaded.".to_string();
        }

        let totals = self.totals_by_category();
        let mut best = &totals[0];
        for entry in &totals[1..] {
            if entry.1 > best.1 {
                best = entry;
            }
        }

        format!("TOP_CATEGORY={} ({:.2})", best.0, best.1)
    }

    /// Group totals by category, preserving first-seen order.
    fn totals_by_category(&self) -> Vec<(String, f64)> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for record in &self.records {
            match totals.iter_mut().find(|(cat, _)| *cat == record.category) {
                Some((_, total)) => *total += record.amount,
                None => totals.push((record.category.clone(), record.amount)),
            }
        }
        totals
    }
}

/// Header-driven CSV parsing: required columns may appear in any order and
/// extra columns are ignored. Returns the full record set or the first
/// error, never a partial set.
fn parse_expense_csv(content: &str) -> std::result::Result<Vec<ExpenseRecord>, String> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let header_line = lines.next().unwrap_or("");
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    let column_index = |name: &str| headers.iter().position(|h| *h == name);
    let date_idx = column_index("date");
    let category_idx = column_index("category");
    let amount_idx = column_index("amount");
    let description_idx = column_index("description");

    let (Some(date_idx), Some(category_idx), Some(amount_idx), Some(description_idx)) =
        (date_idx, category_idx, amount_idx, description_idx)
    else {
        let mut required = REQUIRED_COLUMNS;
        required.sort_unstable();
        return Err(format!(
            "ERROR: CSV must have columns: {}",
            required.join(", ")
        ));
    };

    let mut records = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != headers.len() {
            return Err(format!(
                "ERROR: row has {} columns, expected {}",
                fields.len(),
                headers.len()
            ));
        }
        let field = |idx: usize| fields[idx];

        let raw_amount = field(amount_idx);
        let amount = match raw_amount.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => return Err(format!("ERROR: invalid amount '{}'", raw_amount)),
        };

        records.push(ExpenseRecord {
            date: field(date_idx).to_string(),
            category: field(category_idx).trim().to_string(),
            amount,
            description: field(description_idx).trim().to_string(),
        });
    }

    Ok(records)
}
