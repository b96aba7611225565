//! Expected table layouts and the schema check run before any conversion

use std::fmt;

use unicode_width::UnicodeWidthStr;

use super::mode::BuildMode;
use super::table::Table;
use crate::error::{CxSheetError, Result};

/// Column names (must match the export writers)
pub mod cols {
    pub const DISPLAY_NAME: &str = "display_name";
    pub const TRAINING_PHRASE: &str = "training_phrase";
    pub const PART: &str = "part";
    pub const TEXT: &str = "text";
    pub const PARAMETER_ID: &str = "parameter_id";
    pub const ID: &str = "id";
    pub const ENTITY_TYPE: &str = "entity_type";
    pub const VALUE: &str = "value";
    pub const SYNONYMS: &str = "synonyms";
    pub const META: &str = "meta";
}

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Any text
    String,
    /// A non-negative integer ordinal no larger than `i32::MAX`
    Int32,
    /// JSON text, parsed when the record is built
    Json,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int32 => "int32",
            ColumnType::Json => "json",
        }
    }

    /// Whether a cell coerces to this type
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ColumnType::Int32 => value.trim().parse::<i32>().is_ok_and(|n| n >= 0),
            ColumnType::String | ColumnType::Json => true,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub ty: ColumnType,
    pub required: bool,
}

impl ColumnSpec {
    const fn required(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty, required: true }
    }

    const fn optional(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty, required: false }
    }
}

/// Layout a table must have for one kind of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// What the table is, e.g. "advanced mode train_phrases"
    pub subject: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Training phrase rows. `keyed` tables carry a `display_name` column;
    /// single-intent tables do not.
    pub fn training_phrases(mode: BuildMode, keyed: bool) -> Self {
        let mut columns = Vec::new();
        if keyed {
            columns.push(ColumnSpec::required(cols::DISPLAY_NAME, ColumnType::String));
        }
        match mode {
            BuildMode::Basic => {
                columns.push(ColumnSpec::required(cols::TEXT, ColumnType::String));
            }
            BuildMode::Advanced => {
                columns.push(ColumnSpec::required(cols::TRAINING_PHRASE, ColumnType::Int32));
                columns.push(ColumnSpec::required(cols::PART, ColumnType::Int32));
                columns.push(ColumnSpec::required(cols::TEXT, ColumnType::String));
                columns.push(ColumnSpec::required(cols::PARAMETER_ID, ColumnType::String));
            }
        }
        columns.push(ColumnSpec::optional(cols::META, ColumnType::Json));

        Self {
            subject: format!("{} mode train_phrases", mode),
            columns,
        }
    }

    pub fn parameters(keyed: bool) -> Self {
        let mut columns = Vec::new();
        if keyed {
            columns.push(ColumnSpec::required(cols::DISPLAY_NAME, ColumnType::String));
        }
        columns.push(ColumnSpec::required(cols::ID, ColumnType::String));
        columns.push(ColumnSpec::required(cols::ENTITY_TYPE, ColumnType::String));

        Self {
            subject: "advanced mode parameter".to_string(),
            columns,
        }
    }

    pub fn entity_values(keyed: bool) -> Self {
        let mut columns = Vec::new();
        if keyed {
            columns.push(ColumnSpec::required(cols::DISPLAY_NAME, ColumnType::String));
        }
        columns.push(ColumnSpec::required(cols::VALUE, ColumnType::String));
        columns.push(ColumnSpec::required(cols::SYNONYMS, ColumnType::Json));
        columns.push(ColumnSpec::optional(cols::META, ColumnType::Json));

        Self {
            subject: "entities".to_string(),
            columns,
        }
    }

    /// Check a table against this layout. Extra columns are ignored.
    pub fn check(&self, table: &Table) -> SchemaReport {
        let mut problems = Vec::new();

        for spec in &self.columns {
            let Some(col) = table.column_index(spec.name) else {
                if spec.required {
                    problems.push(SchemaProblem::MissingColumn {
                        column: spec.name.to_string(),
                        expected: spec.ty,
                    });
                }
                continue;
            };

            for row in 0..table.len() {
                let value = table.cell(row, col);
                if !spec.ty.accepts(value) {
                    problems.push(SchemaProblem::InvalidValue {
                        column: spec.name.to_string(),
                        row: sheet_row(row),
                        value: value.to_string(),
                        expected: spec.ty,
                    });
                }
            }
        }

        SchemaReport {
            subject: self.subject.clone(),
            expected: self.render(),
            problems,
        }
    }

    /// Render the layout as a psql-style table: names on top, types below
    pub fn render(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let types: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if c.required {
                    c.ty.as_str().to_string()
                } else {
                    format!("{} (optional)", c.ty)
                }
            })
            .collect();

        let widths: Vec<usize> = names
            .iter()
            .zip(&types)
            .map(|(n, t)| n.width().max(t.width()))
            .collect();

        let border = rule('+', &widths);
        let divider = rule('|', &widths);

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&content_line(&names, &widths));
        out.push('\n');
        out.push_str(&divider);
        out.push('\n');
        out.push_str(&content_line(&types, &widths));
        out.push('\n');
        out.push_str(&border);
        out
    }
}

/// Horizontal rule; columns are always joined with '+'
fn rule(edge: char, widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    format!("{edge}{}{edge}", segments.join("+"))
}

fn content_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| {
            let cell = cell.as_ref();
            format!("{}{}", cell, " ".repeat(w - cell.width()))
        })
        .collect();
    format!("| {} |", padded.join(" | "))
}

/// 1-based sheet row of a data row (the header is row 1)
pub(crate) fn sheet_row(data_index: usize) -> usize {
    data_index + 2
}

/// One mismatch between a table and its expected layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaProblem {
    MissingColumn {
        column: String,
        expected: ColumnType,
    },
    InvalidValue {
        column: String,
        row: usize,
        value: String,
        expected: ColumnType,
    },
    /// Training phrase ordinals that would leave more empty phrases than
    /// filled ones
    SparseOrdinals {
        display_name: String,
        max: u32,
        used: usize,
    },
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaProblem::MissingColumn { column, expected } => {
                write!(f, "missing column '{}' ({})", column, expected)
            }
            SchemaProblem::InvalidValue {
                column,
                row,
                value,
                expected,
            } => write!(
                f,
                "row {}: column '{}' value '{}' is not {}",
                row, column, value, expected
            ),
            SchemaProblem::SparseOrdinals {
                display_name,
                max,
                used,
            } => write!(
                f,
                "intent '{}': training_phrase {} is too sparse for the {} ordinal(s) in use",
                display_name, max, used
            ),
        }
    }
}

/// Result of checking a table: ok, or the list of problems found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub subject: String,
    /// Rendered expected layout, shown to the operator next to the problems
    pub expected: String,
    pub problems: Vec<SchemaProblem>,
}

impl SchemaReport {
    /// How many problems the display lists before summarizing the rest
    const SHOWN_PROBLEMS: usize = 10;

    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn has_missing_columns(&self) -> bool {
        self.problems
            .iter()
            .any(|p| matches!(p, SchemaProblem::MissingColumn { .. }))
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(CxSheetError::Schema(self))
        }
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} schema must be", self.subject)?;
        writeln!(f, "{}", self.expected)?;
        write!(f, "found {} problem(s):", self.problems.len())?;
        for problem in self.problems.iter().take(Self::SHOWN_PROBLEMS) {
            write!(f, "\n  - {}", problem)?;
        }
        if self.problems.len() > Self::SHOWN_PROBLEMS {
            write!(
                f,
                "\n  ... and {} more",
                self.problems.len() - Self::SHOWN_PROBLEMS
            )?;
        }
        Ok(())
    }
}
