use serde::Serialize;
use std::fmt;

/// Rows returned by one executed statement, every cell already rendered to text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pipe table for prompts. Rows past `max_rows` are summarised in a trailing line.
    pub fn render_table(&self, max_rows: usize) -> String {
        if self.rows.is_empty() {
            return "(no rows)".to_string();
        }

        let mut out = String::new();
        if !self.columns.is_empty() {
            out.push_str("| ");
            out.push_str(&self.columns.join(" | "));
            out.push_str(" |\n|");
            for _ in &self.columns {
                out.push_str(" --- |");
            }
            out.push('\n');
        }

        for row in self.rows.iter().take(max_rows) {
            out.push_str("| ");
            out.push_str(&row.join(" | "));
            out.push_str(" |\n");
        }

        if self.rows.len() > max_rows {
            out.push_str(&format!(
                "... {} more rows not shown\n",
                self.rows.len() - max_rows
            ));
        }

        out.trim_end().to_string()
    }

    /// Tab separated header and rows, used for the sample rows in schema descriptions.
    pub fn to_tsv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.columns.join("\t"));
        for row in &self.rows {
            lines.push(row.join("\t"));
        }
        lines.join("\n")
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_table(usize::MAX))
    }
}
