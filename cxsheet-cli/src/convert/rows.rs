//! Typed rows extracted from checked tables

use std::collections::BTreeMap;

use super::mode::BuildMode;
use super::schema::{SchemaReport, TableSchema, cols, sheet_row};
use super::table::Table;
use crate::error::{CxSheetError, Result};

/// What to do when a table fails its schema check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaPolicy {
    /// Abort before anything is built
    #[default]
    Strict,
    /// Log the report and keep the rows that still coerce
    Lenient,
}

/// Where each row's collection display name comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource<'a> {
    /// The `display_name` column
    Column,
    /// Every row belongs to one collection
    Fixed(&'a str),
}

impl NameSource<'_> {
    pub(crate) fn is_keyed(&self) -> bool {
        matches!(self, NameSource::Column)
    }
}

/// Rows that belong to a named collection
pub trait Keyed {
    fn display_name(&self) -> &str;
}

/// Basic mode: the row is the whole phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicPhraseRow {
    pub row: usize,
    pub display_name: String,
    pub text: String,
}

/// Advanced mode: one part of one phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedPhraseRow {
    pub row: usize,
    pub display_name: String,
    pub training_phrase: u32,
    pub part: u32,
    pub text: String,
    pub parameter_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRow {
    pub row: usize,
    pub display_name: String,
    pub id: String,
    pub entity_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityValueRow {
    pub row: usize,
    pub display_name: String,
    pub value: String,
    /// JSON array text, parsed when the entity value is built
    pub synonyms: String,
}

macro_rules! impl_keyed {
    ($($ty:ty),+) => {
        $(impl Keyed for $ty {
            fn display_name(&self) -> &str {
                &self.display_name
            }
        })+
    };
}

impl_keyed!(BasicPhraseRow, AdvancedPhraseRow, ParameterRow, EntityValueRow);

/// Training phrase rows in the shape the build mode calls for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseRows {
    Basic(Vec<BasicPhraseRow>),
    Advanced(Vec<AdvancedPhraseRow>),
}

impl PhraseRows {
    pub fn empty(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Basic => PhraseRows::Basic(Vec::new()),
            BuildMode::Advanced => PhraseRows::Advanced(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PhraseRows::Basic(rows) => rows.len(),
            PhraseRows::Advanced(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run the schema check and apply the policy to a failing report
fn enforce(schema: &TableSchema, table: &Table, policy: SchemaPolicy) -> Result<()> {
    apply_policy(schema.check(table), policy)
}

pub(crate) fn apply_policy(report: SchemaReport, policy: SchemaPolicy) -> Result<()> {
    if report.is_ok() {
        return Ok(());
    }

    log::error!("{}", report);
    match policy {
        SchemaPolicy::Strict => Err(CxSheetError::Schema(report)),
        SchemaPolicy::Lenient => {
            warn_lenient(&report);
            Ok(())
        }
    }
}

fn warn_lenient(report: &SchemaReport) {
    if report.has_missing_columns() {
        log::warn!(
            "{}: required columns are missing, no rows can be converted",
            report.subject
        );
    } else {
        log::warn!(
            "{}: continuing with the rows that match the schema",
            report.subject
        );
    }
}

/// Cell access by column name for one table
struct RowReader<'t> {
    table: &'t Table,
    names: NameSource<'t>,
    name_col: Option<usize>,
}

impl<'t> RowReader<'t> {
    fn new(table: &'t Table, names: NameSource<'t>) -> Self {
        Self {
            table,
            names,
            name_col: table.column_index(cols::DISPLAY_NAME),
        }
    }

    fn col(&self, name: &str) -> Option<usize> {
        self.table.column_index(name)
    }

    fn name(&self, row: usize) -> Option<String> {
        match self.names {
            NameSource::Fixed(name) => Some(name.to_string()),
            NameSource::Column => self.text(row, self.name_col).map(|s| s.trim().to_string()),
        }
    }

    fn text(&self, row: usize, col: Option<usize>) -> Option<String> {
        col.map(|c| self.table.cell(row, c).to_string())
    }

    fn optional_text(&self, row: usize, col: Option<usize>) -> Option<String> {
        self.text(row, col).filter(|s| !s.trim().is_empty())
    }

    /// Same range as the `int32` column type: 0..=i32::MAX
    fn ordinal(&self, row: usize, col: Option<usize>) -> Option<u32> {
        col.and_then(|c| self.table.cell(row, c).trim().parse::<i32>().ok())
            .and_then(|n| u32::try_from(n).ok())
    }
}

fn skip_row(subject: &str, row: usize) {
    log::warn!("{}: skipping row {} (does not match the schema)", subject, sheet_row(row));
}

/// Extract training phrase rows for the given mode
pub fn read_phrase_rows(
    table: &Table,
    mode: BuildMode,
    names: NameSource<'_>,
    policy: SchemaPolicy,
) -> Result<PhraseRows> {
    if table.is_empty() {
        return Ok(PhraseRows::empty(mode));
    }

    let schema = TableSchema::training_phrases(mode, names.is_keyed());
    enforce(&schema, table, policy)?;

    let reader = RowReader::new(table, names);
    let text_col = reader.col(cols::TEXT);

    match mode {
        BuildMode::Basic => {
            let mut rows = Vec::with_capacity(table.len());
            for i in 0..table.len() {
                match (reader.name(i), reader.text(i, text_col)) {
                    (Some(display_name), Some(text)) => rows.push(BasicPhraseRow {
                        row: sheet_row(i),
                        display_name,
                        text,
                    }),
                    _ => skip_row(&schema.subject, i),
                }
            }
            Ok(PhraseRows::Basic(rows))
        }
        BuildMode::Advanced => {
            let tp_col = reader.col(cols::TRAINING_PHRASE);
            let part_col = reader.col(cols::PART);
            let param_col = reader.col(cols::PARAMETER_ID);

            let mut rows = Vec::with_capacity(table.len());
            for i in 0..table.len() {
                let parsed = (
                    reader.name(i),
                    reader.ordinal(i, tp_col),
                    reader.ordinal(i, part_col),
                    reader.text(i, text_col),
                    param_col,
                );
                match parsed {
                    (Some(display_name), Some(training_phrase), Some(part), Some(text), Some(_)) => {
                        rows.push(AdvancedPhraseRow {
                            row: sheet_row(i),
                            display_name,
                            training_phrase,
                            part,
                            text,
                            parameter_id: reader.optional_text(i, param_col),
                        })
                    }
                    _ => skip_row(&schema.subject, i),
                }
            }
            Ok(PhraseRows::Advanced(rows))
        }
    }
}

/// Extract parameter rows. An empty table means "no parameters".
pub fn read_parameter_rows(
    table: &Table,
    names: NameSource<'_>,
    policy: SchemaPolicy,
) -> Result<Vec<ParameterRow>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let schema = TableSchema::parameters(names.is_keyed());
    enforce(&schema, table, policy)?;

    let reader = RowReader::new(table, names);
    let id_col = reader.col(cols::ID);
    let entity_col = reader.col(cols::ENTITY_TYPE);

    let mut rows = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        match (reader.name(i), reader.text(i, id_col), reader.text(i, entity_col)) {
            (Some(display_name), Some(id), Some(entity_type)) => rows.push(ParameterRow {
                row: sheet_row(i),
                display_name,
                id,
                entity_type,
            }),
            _ => skip_row(&schema.subject, i),
        }
    }
    Ok(rows)
}

/// Extract entity value rows
pub fn read_entity_rows(
    table: &Table,
    names: NameSource<'_>,
    policy: SchemaPolicy,
) -> Result<Vec<EntityValueRow>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    let schema = TableSchema::entity_values(names.is_keyed());
    enforce(&schema, table, policy)?;

    let reader = RowReader::new(table, names);
    let value_col = reader.col(cols::VALUE);
    let synonyms_col = reader.col(cols::SYNONYMS);

    let mut rows = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        match (reader.name(i), reader.text(i, value_col), reader.text(i, synonyms_col)) {
            (Some(display_name), Some(value), Some(synonyms)) => rows.push(EntityValueRow {
                row: sheet_row(i),
                display_name,
                value,
                synonyms,
            }),
            _ => skip_row(&schema.subject, i),
        }
    }
    Ok(rows)
}

/// First non-empty `meta` cell per display name, unparsed
pub fn read_meta_cells(table: &Table, names: NameSource<'_>) -> BTreeMap<String, String> {
    let reader = RowReader::new(table, names);
    let mut cells = BTreeMap::new();

    let Some(meta_col) = reader.col(cols::META) else {
        return cells;
    };

    for i in 0..table.len() {
        let (Some(display_name), Some(meta)) = (reader.name(i), reader.optional_text(i, Some(meta_col)))
        else {
            continue;
        };
        cells.entry(display_name).or_insert(meta);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advanced_table() -> Table {
        let mut table = Table::new(["display_name", "training_phrase", "part", "text", "parameter_id", "meta"]);
        table.push_row(["order", "0", "0", "track order ", "", r#"{"priority": 10}"#]);
        table.push_row(["order", "0", "1", "A123", "order_id", ""]);
        table.push_row(["refund", "0", "0", "refund please", "", ""]);
        table
    }

    #[test]
    fn test_read_advanced_rows() {
        let rows = read_phrase_rows(&advanced_table(), BuildMode::Advanced, NameSource::Column, SchemaPolicy::Strict).unwrap();
        let PhraseRows::Advanced(rows) = rows else {
            panic!("expected advanced rows");
        };

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].text, "track order ");
        assert_eq!(rows[0].parameter_id, None);
        assert_eq!(rows[1].parameter_id.as_deref(), Some("order_id"));
        assert_eq!(rows[1].part, 1);
        assert_eq!(rows[1].row, 3);
    }

    #[test]
    fn test_read_basic_rows_with_fixed_name() {
        let mut table = Table::new(["text"]);
        table.push_row(["hello"]);
        table.push_row(["hi there"]);

        let rows = read_phrase_rows(&table, BuildMode::Basic, NameSource::Fixed("greet"), SchemaPolicy::Strict).unwrap();
        let PhraseRows::Basic(rows) = rows else {
            panic!("expected basic rows");
        };
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.display_name == "greet"));
    }

    #[test]
    fn test_strict_policy_rejects_bad_table() {
        let mut table = Table::new(["display_name", "text"]);
        table.push_row(["order", "hello"]);

        let err = read_phrase_rows(&table, BuildMode::Advanced, NameSource::Column, SchemaPolicy::Strict).unwrap_err();
        assert!(matches!(err, CxSheetError::Schema(_)));
    }

    #[test]
    fn test_lenient_policy_skips_bad_rows() {
        let mut table = advanced_table();
        table.push_row(["order", "x", "0", "broken", "", ""]);

        let rows = read_phrase_rows(&table, BuildMode::Advanced, NameSource::Column, SchemaPolicy::Lenient).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_lenient_policy_with_missing_column_yields_nothing() {
        let mut table = Table::new(["display_name", "text"]);
        table.push_row(["order", "hello"]);

        let rows = read_phrase_rows(&table, BuildMode::Advanced, NameSource::Column, SchemaPolicy::Lenient).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_table_is_not_a_schema_error() {
        let rows = read_phrase_rows(&Table::default(), BuildMode::Advanced, NameSource::Column, SchemaPolicy::Strict).unwrap();
        assert!(rows.is_empty());
        assert!(read_parameter_rows(&Table::default(), NameSource::Column, SchemaPolicy::Strict).unwrap().is_empty());
    }

    #[test]
    fn test_read_entity_rows() {
        let mut table = Table::new(["display_name", "value", "synonyms"]);
        table.push_row(["color", "red", r#"["red", "crimson"]"#]);

        let rows = read_entity_rows(&table, NameSource::Column, SchemaPolicy::Strict).unwrap();
        assert_eq!(rows[0].value, "red");
        assert_eq!(rows[0].synonyms, r#"["red", "crimson"]"#);
    }

    #[test]
    fn test_meta_cells_take_first_non_empty() {
        let mut table = advanced_table();
        table.push_row(["order", "1", "0", "again", "", r#"{"priority": 99}"#]);

        let meta = read_meta_cells(&table, NameSource::Column);
        assert_eq!(meta.len(), 1);
        assert_eq!(meta["order"], r#"{"priority": 10}"#);
    }
}
