// The fence tags and the explanation heading below are what `extract` looks
// for. Change them together.
pub const DIAGRAM_FENCE_TAG: &str = "mermaid";
pub const SQL_FENCE_TAG: &str = "sql";
pub const EXPLANATION_HEADING: &str = "## Design Explanation";

pub const FENCE: &str = "```";

pub const DEFAULT_DIALECT: &str = "MySQL";

/// Renders the schema design prompt. `description` and `dialect` are embedded
/// verbatim.
pub fn design_prompt(description: &str, dialect: &str) -> String {
    format!(
        r#"You are an expert database architect. Based on the following application description, design a complete database schema.

Application Description: {description}
Database Type: {dialect}

Please provide your response in exactly this format:

## ERD (Mermaid)
{FENCE}{DIAGRAM_FENCE_TAG}
erDiagram
    [Your Entity Relationship Diagram here using Mermaid syntax]
{FENCE}

## SQL Queries
{FENCE}{SQL_FENCE_TAG}
-- Your CREATE TABLE statements here
-- Include primary keys, foreign keys, indexes, and constraints
-- Use syntax and data types specific to the target database
{FENCE}

{EXPLANATION_HEADING}
Provide a detailed explanation of:
1. Why you chose this schema design
2. Relationships between tables and their reasoning
3. Key design decisions (normalization level, indexing strategy, etc.)
4. Scalability considerations
5. Any assumptions made about the requirements

Focus on best practices for {dialect} and ensure the design is normalized, efficient, and scalable."#
    )
}

pub fn validation_prompt(design: &str, requirements: &str) -> String {
    format!(
        r#"Review this database design against the requirements and provide feedback:

Requirements: {requirements}

Current Design: {design}

Please analyze:
1. Completeness - does it meet all requirements?
2. Normalization - is it properly normalized?
3. Performance - are there potential bottlenecks?
4. Scalability - will it scale well?
5. Security - are there security considerations?

Provide specific recommendations for improvement."#
    )
}
