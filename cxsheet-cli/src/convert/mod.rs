//! Conversion of spreadsheet tables into agent resources
//!
//! Tables are checked against their expected layout, split into typed rows,
//! grouped by display name (and, in advanced mode, by phrase ordinal), and
//! assembled into intents and entity types.

pub mod assemble;
pub mod build;
pub mod export;
pub mod group;
pub mod metadata;
pub mod mode;
pub mod rows;
pub mod schema;
pub mod table;
pub mod units;

pub use assemble::{
    assemble_entity_type, assemble_entity_type_update, assemble_intent, assemble_intent_update,
    parse_document,
};
pub use build::{EntityTypeRows, EntityTypeSource, IntentRows, IntentSource, PhraseGroup};
pub use export::{IntentTables, flatten_entity_types, flatten_intents};
pub use group::{group_by_name, group_parts};
pub use metadata::{EntityTypeMetadata, IntentMetadata};
pub use mode::BuildMode;
pub use rows::{
    AdvancedPhraseRow, BasicPhraseRow, EntityValueRow, Keyed, NameSource, ParameterRow, PhraseRows,
    SchemaPolicy,
};
pub use schema::{ColumnSpec, ColumnType, SchemaProblem, SchemaReport, TableSchema};
pub use table::Table;
