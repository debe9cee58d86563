//! Response parser for the textual action protocol
//!
//! Scans a raw model response for `Action: <name>: <input>` lines. Only the
//! first match counts (single action per turn); a response with no match is
//! final.

use crate::models::ActionRequest;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ACTION_RE: Regex =
        Regex::new(r"(?m)^Action:\s*(\w+):\s*(.*)$").expect("action pattern is valid");
}

/// Extract the first action request from a model response, if any.
pub fn parse_action(response: &str) -> Option<ActionRequest> {
    let captures = ACTION_RE.captures(response)?;
    Some(ActionRequest {
        name: captures[1].to_string(),
        input: captures[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_name_and_input() {
        let response = "Thought: I should load the file.\n\
                        Action: load_csv_expenses: /tmp/expenses.csv\n\
                        PAUSE";
        let action = parse_action(response).unwrap();
        assert_eq!(action.name, "load_csv_expenses");
        assert_eq!(action.input, "/tmp/expenses.csv");
    }

    #[test]
    fn test_first_action_wins() {
        let response = "Action: sum_by_category: ALL\n\
                        Action: top_category: \n";
        let action = parse_action(response).unwrap();
        assert_eq!(action.name, "sum_by_category");
        assert_eq!(action.input, "ALL");
    }

    #[test]
    fn test_empty_input_allowed() {
        let action = parse_action("Action: top_category: ").unwrap();
        assert_eq!(action.name, "top_category");
        assert_eq!(action.input, "");
    }

    #[test]
    fn test_no_action_means_final() {
        assert!(parse_action("Answer: you spent 25.50 in total.").is_none());
        // Mid-line mentions are not action requests.
        assert!(parse_action("I would take an Action: calculate: 1+1 here").is_none());
    }
}
