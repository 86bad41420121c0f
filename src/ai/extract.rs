use super::prompts::{DIAGRAM_FENCE_TAG, EXPLANATION_HEADING, FENCE, SQL_FENCE_TAG};
use crate::error::{ArchitectError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DIAGRAM_PLACEHOLDER: &str = "Could not extract Mermaid diagram";
pub const SQL_PLACEHOLDER: &str = "Could not extract SQL queries";

static DIAGRAM_REGEX: Lazy<Regex> = Lazy::new(|| fenced_block_regex(DIAGRAM_FENCE_TAG));
static SQL_REGEX: Lazy<Regex> = Lazy::new(|| fenced_block_regex(SQL_FENCE_TAG));

// Everything after the heading up to the next `##` heading (not `###`) or the
// end of the text.
static EXPLANATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?s){}[ \t]*\r?\n(.*?)(?:\n##(?:[^#]|\z)|\z)",
        regex::escape(EXPLANATION_HEADING)
    );
    Regex::new(&pattern).expect("explanation pattern is valid")
});

fn fenced_block_regex(tag: &str) -> Regex {
    let fence = regex::escape(FENCE);
    let pattern = format!(r"(?s){fence}{}[ \t]*\r?\n(.*?){fence}", regex::escape(tag));
    Regex::new(&pattern).expect("fenced block pattern is valid")
}

/// Sections recovered from a completion. An empty string means the section
/// was looked for and not found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSections {
    pub diagram: String,
    pub schema_sql: String,
    pub explanation: String,
}

/// Caller-facing design. Every field is always populated, degraded fields
/// carry a placeholder (or the raw completion for the explanation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignResult {
    #[serde(rename = "erd_mermaid")]
    pub diagram: String,
    #[serde(rename = "sql_queries")]
    pub schema_sql: String,
    pub explanation: String,
}

impl DesignResult {
    /// True when any field holds a fallback. An extracted explanation is a
    /// trimmed slice after a heading or fence, so it never equals `raw`.
    pub fn is_degraded(&self, raw: &str) -> bool {
        self.diagram == DIAGRAM_PLACEHOLDER
            || self.schema_sql == SQL_PLACEHOLDER
            || self.explanation == raw
    }
}

pub fn extract_sections(raw: &str) -> ExtractedSections {
    let diagram = DIAGRAM_REGEX.captures(raw).and_then(|c| c.get(1));
    let sql = SQL_REGEX.captures(raw).and_then(|c| c.get(1));

    let explanation = match EXPLANATION_REGEX.captures(raw).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim().to_string(),
        None => match (diagram, sql) {
            // Only trust the trailing text when both primary blocks were found.
            // Its end is the closing fence that follows the later block.
            (Some(d), Some(s)) => {
                let interior_end = d.end().max(s.end());
                let tail = &raw[interior_end..];
                tail.strip_prefix(FENCE).unwrap_or(tail).trim().to_string()
            }
            _ => String::new(),
        },
    };

    ExtractedSections {
        diagram: diagram.map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        schema_sql: sql.map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        explanation,
    }
}

impl ExtractedSections {
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.diagram.trim().is_empty() {
            missing.push("diagram");
        }
        if self.schema_sql.trim().is_empty() {
            missing.push("schema_sql");
        }
        if self.explanation.trim().is_empty() {
            missing.push("explanation");
        }
        missing
    }

    /// Fills the gaps: placeholders for the diagram and SQL, the full raw
    /// completion for the explanation.
    pub fn into_result(self, raw: &str) -> DesignResult {
        fn or_else(value: String, fallback: &str) -> String {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value
            }
        }

        DesignResult {
            diagram: or_else(self.diagram, DIAGRAM_PLACEHOLDER),
            schema_sql: or_else(self.schema_sql, SQL_PLACEHOLDER),
            explanation: or_else(self.explanation, raw),
        }
    }
}

/// Turns a completion into a fully populated design. Only a zero-length
/// completion is an error.
pub fn extract_design(raw: &str) -> Result<DesignResult> {
    if raw.is_empty() {
        return Err(ArchitectError::EmptyCompletion);
    }

    let sections = extract_sections(raw);
    let missing = sections.missing();
    if !missing.is_empty() {
        log::warn!("Completion missing sections {:?}, using fallbacks", missing);
    }
    Ok(sections.into_result(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::prompts::design_prompt;

    fn completion(diagram: &str, sql: &str, explanation: &str) -> String {
        format!(
            "## ERD (Mermaid)\n```mermaid\n{diagram}\n```\n\n## SQL Queries\n```sql\n{sql}\n```\n\n## Design Explanation\n{explanation}\n"
        )
    }

    #[test]
    fn well_formed_completion_extracts_every_section() {
        let raw = completion("X", "Y", "Z");
        let sections = extract_sections(&raw);
        assert_eq!(
            sections,
            ExtractedSections {
                diagram: "X".into(),
                schema_sql: "Y".into(),
                explanation: "Z".into(),
            }
        );

        let result = extract_design(&raw).unwrap();
        assert_eq!(result.diagram, "X");
        assert_eq!(result.schema_sql, "Y");
        assert_eq!(result.explanation, "Z");
        assert!(!result.is_degraded(&raw));
    }

    #[test]
    fn prompt_template_survives_extraction() {
        let prompt = design_prompt("An inventory system", "MySQL");
        let sections = extract_sections(&prompt);
        assert_eq!(
            sections,
            ExtractedSections {
                diagram: "erDiagram\n    [Your Entity Relationship Diagram here using Mermaid syntax]"
                    .into(),
                schema_sql: "-- Your CREATE TABLE statements here\n\
                             -- Include primary keys, foreign keys, indexes, and constraints\n\
                             -- Use syntax and data types specific to the target database"
                    .into(),
                explanation: "Provide a detailed explanation of:\n\
                              1. Why you chose this schema design\n\
                              2. Relationships between tables and their reasoning\n\
                              3. Key design decisions (normalization level, indexing strategy, etc.)\n\
                              4. Scalability considerations\n\
                              5. Any assumptions made about the requirements\n\
                              \n\
                              Focus on best practices for MySQL and ensure the design is normalized, \
                              efficient, and scalable."
                    .into(),
            }
        );
        assert!(sections.missing().is_empty());
    }

    #[test]
    fn missing_sql_block_gets_placeholder() {
        let raw = "```mermaid\nerDiagram\n  USER ||--o{ POST : writes\n```\n\n## Design Explanation\nUsers write posts.";
        let result = extract_design(raw).unwrap();
        assert_eq!(result.diagram, "erDiagram\n  USER ||--o{ POST : writes");
        assert_eq!(result.schema_sql, SQL_PLACEHOLDER);
        assert_eq!(result.explanation, "Users write posts.");
        assert!(result.is_degraded(raw));
    }

    #[test]
    fn unstructured_prose_falls_back_to_raw_text() {
        let raw = "I think you need a users table and an orders table.";
        let result = extract_design(raw).unwrap();
        assert_eq!(result.diagram, DIAGRAM_PLACEHOLDER);
        assert_eq!(result.schema_sql, SQL_PLACEHOLDER);
        assert_eq!(result.explanation, raw);
    }

    #[test]
    fn empty_completion_is_an_error() {
        assert!(matches!(extract_design(""), Err(ArchitectError::EmptyCompletion)));
    }

    #[test]
    fn whitespace_completion_degrades_instead_of_failing() {
        let raw = "  \n\t";
        let result = extract_design(raw).unwrap();
        assert_eq!(result.diagram, DIAGRAM_PLACEHOLDER);
        assert_eq!(result.schema_sql, SQL_PLACEHOLDER);
        assert_eq!(result.explanation, raw);
        assert!(result.is_degraded(raw));
    }

    #[test]
    fn raw_explanation_fallback_counts_as_degraded() {
        let raw = "```mermaid\nerDiagram\n```\n```sql\nCREATE TABLE t (id INT);\n```";
        let result = extract_design(raw).unwrap();
        assert_eq!(result.diagram, "erDiagram");
        assert_eq!(result.schema_sql, "CREATE TABLE t (id INT);");
        assert_eq!(result.explanation, raw);
        assert!(result.is_degraded(raw));
    }

    #[test]
    fn explanation_stops_at_next_top_level_heading() {
        let raw = "## Design Explanation\nFirst part.\n### Detail\nStill part.\n## Appendix\nNot part.";
        let sections = extract_sections(raw);
        assert_eq!(sections.explanation, "First part.\n### Detail\nStill part.");
    }

    #[test]
    fn explanation_falls_back_to_trailing_text_after_blocks() {
        let raw = "```mermaid\nerDiagram\n```\n```sql\nCREATE TABLE t (id INT);\n```\nThe table t holds ids.";
        let sections = extract_sections(raw);
        assert_eq!(sections.explanation, "The table t holds ids.");
    }

    #[test]
    fn trailing_text_fallback_needs_both_blocks() {
        let raw = "```sql\nCREATE TABLE t (id INT);\n```\nSome notes.";
        let sections = extract_sections(raw);
        assert_eq!(sections.schema_sql, "CREATE TABLE t (id INT);");
        assert!(sections.explanation.is_empty());

        let result = sections.into_result(raw);
        assert_eq!(result.explanation, raw);
    }

    #[test]
    fn trailing_fallback_keeps_extra_code_blocks() {
        let raw = "```mermaid\nerDiagram\n```\n```sql\nCREATE TABLE t (id INT);\n```\nIndex it:\n```\nCREATE INDEX i ON t (id);\n```\nDone.";
        let sections = extract_sections(raw);
        assert!(sections.explanation.starts_with("Index it:"));
        assert!(sections.explanation.ends_with("Done."));
    }

    #[test]
    fn first_block_of_each_tag_wins() {
        let raw = "```sql\nCREATE TABLE a (id INT);\n```\n```sql\nCREATE TABLE b (id INT);\n```";
        let sections = extract_sections(raw);
        assert_eq!(sections.schema_sql, "CREATE TABLE a (id INT);");
    }

    #[test]
    fn tolerates_crlf_and_trailing_spaces_after_tag() {
        let raw = "```mermaid  \r\nerDiagram\r\n```\r\n```sql\r\nSELECT 1;\r\n```\r\n## Design Explanation\r\nWhy.\r\n";
        let sections = extract_sections(raw);
        assert_eq!(sections.diagram, "erDiagram");
        assert_eq!(sections.schema_sql, "SELECT 1;");
        assert_eq!(sections.explanation, "Why.");
    }

    #[test]
    fn design_result_serializes_with_wire_names() {
        let result = ExtractedSections::default().into_result("raw");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["erd_mermaid"], DIAGRAM_PLACEHOLDER);
        assert_eq!(json["sql_queries"], SQL_PLACEHOLDER);
        assert_eq!(json["explanation"], "raw");
    }
}
