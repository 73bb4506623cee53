//! Plain-text tables
//!
//! Rows arrive as JSON values so that commands can pass through whatever
//! they loaded. Each row has to be an array of scalars; the table is then
//! rendered as boxed text lines:
//!
//! ```text
//! +----+------+
//! | id | name |
//! +----+------+
//! | 1  | A    |
//! +----+------+
//! ```

use console::{measure_text_width, pad_str, Alignment};
use serde_json::Value;

use crate::errors::{ConsoleError, ConsoleResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from JSON rows. Fails unless every row is an array.
    pub fn from_values<I, S>(headers: I, rows: &[Value]) -> ConsoleResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(headers);
        for row in rows {
            let Value::Array(cells) = row else {
                return Err(ConsoleError::Format("Each row should be an array.".to_string()));
            };
            table.add_value_row(cells)?;
        }
        Ok(table)
    }

    pub fn add_row(&mut self, row: Vec<String>) -> &mut Self {
        self.rows.push(row);
        self
    }

    pub fn add_value_row(&mut self, cells: &[Value]) -> ConsoleResult<&mut Self> {
        let row = cells.iter().map(cell_text).collect::<ConsoleResult<Vec<_>>>()?;
        Ok(self.add_row(row))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|column| {
                std::iter::once(&self.headers)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(column))
                    .map(|cell| measure_text_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Renders the table into lines, without trailing newlines.
    pub fn render(&self) -> Vec<String> {
        let widths = self.column_widths();
        if widths.is_empty() {
            return Vec::new();
        }

        let separator = widths.iter().fold(String::from("+"), |mut line, width| {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
            line
        });
        let render_row = |row: &[String]| {
            widths
                .iter()
                .enumerate()
                .fold(String::from("|"), |mut line, (column, width)| {
                    let cell = row.get(column).map(String::as_str).unwrap_or("");
                    line.push(' ');
                    line.push_str(&pad_str(cell, *width, Alignment::Left, None));
                    line.push_str(" |");
                    line
                })
        };

        let mut lines = vec![separator.clone()];
        if !self.headers.is_empty() {
            lines.push(render_row(&self.headers));
            lines.push(separator.clone());
        }
        if !self.rows.is_empty() {
            lines.extend(self.rows.iter().map(|row| render_row(row)));
            lines.push(separator);
        }
        lines
    }
}

fn cell_text(value: &Value) -> ConsoleResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text.clone()),
        Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        Value::Array(_) | Value::Object(_) => Err(ConsoleError::Format(
            "Each table cell should be a scalar value.".to_string(),
        )),
    }
}
