//! Prompt text and the rating function schema.

use serde_json::{json, Value};

use crate::discovery::{CandidateMatch, Strength};
use crate::source::QueryResult;

pub const RATE_FUNCTION_NAME: &str = "rate_matches";

pub const RATING_SYSTEM_PROMPT: &str = "Rate each potential database relationship:
- very strong: Almost certain relationship (e.g., identical names, clear parent-child)
- strong: High confidence in relationship
- normal: Reasonable relationship possible
- weak: Possible but unlikely relationship
- very weak: Minimal indication of relationship";

pub const DESCRIBE_SYSTEM_PROMPT: &str = "You document relational databases. \
Given a table name and a few sample rows, describe in one or two sentences what \
the table stores. Reply with the description only.";

/// One line per candidate, `table1.field1 -> table2.field2`, pk side first.
pub fn rating_user_prompt(matches: &[CandidateMatch]) -> String {
    let lines: Vec<String> = matches.iter().map(|m| m.to_string()).collect();
    format!(
        "Rate the strength of these potential matches:\n{}",
        lines.join("\n")
    )
}

pub fn describe_user_prompt(table: &str, sample: &QueryResult) -> String {
    format!("Table: {}\nSample rows:\n{}", table, sample.to_text_table())
}

/// JSON schema of the `rate_matches` function.
pub fn rate_function() -> Value {
    let labels: Vec<&str> = Strength::ALL.iter().map(|s| s.as_str()).collect();
    json!({
        "name": RATE_FUNCTION_NAME,
        "description": "Returns strength ratings for each potential match",
        "parameters": {
            "type": "object",
            "properties": {
                "strengths": {
                    "type": "array",
                    "description": "Array of strength ratings for each match",
                    "items": {
                        "type": "string",
                        "enum": labels,
                        "description": "Strength rating based on naming patterns and database conventions"
                    }
                }
            },
            "required": ["strengths"]
        }
    })
}
