//! Per-collection sources: the grouped rows and metadata for every display
//! name in a set of tables, ready to be built one collection at a time

use std::collections::BTreeMap;

use super::assemble::{
    assemble_entity_type, assemble_entity_type_update, assemble_intent, assemble_intent_update,
};
use super::group::{group_by_name, group_parts, sparse_ordinals};
use super::metadata::{EntityTypeMetadata, IntentMetadata, parse_meta_cells};
use super::mode::BuildMode;
use super::rows::{
    AdvancedPhraseRow, BasicPhraseRow, EntityValueRow, NameSource, ParameterRow, PhraseRows,
    SchemaPolicy, apply_policy, read_entity_rows, read_meta_cells, read_parameter_rows,
    read_phrase_rows,
};
use super::schema::{SchemaProblem, SchemaReport, TableSchema};
use super::table::Table;
use super::units;
use crate::api::{EntityType, EntityValue, Intent, IntentParameter, TrainingPhrase};
use crate::error::Result;

/// Training phrase rows of one intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseGroup {
    Basic(Vec<BasicPhraseRow>),
    Advanced(Vec<AdvancedPhraseRow>),
}

/// Everything the tables say about one intent
#[derive(Debug, Clone, PartialEq)]
pub struct IntentRows {
    pub phrases: PhraseGroup,
    pub parameters: Vec<ParameterRow>,
    pub metadata: Option<IntentMetadata>,
}

impl IntentRows {
    pub fn training_phrases(&self) -> Vec<TrainingPhrase> {
        match &self.phrases {
            PhraseGroup::Basic(rows) => rows.iter().map(units::basic_phrase).collect(),
            PhraseGroup::Advanced(rows) => group_parts(rows)
                .iter()
                .map(|parts| units::advanced_phrase(parts))
                .collect(),
        }
    }

    pub fn parameters(&self) -> Vec<IntentParameter> {
        self.parameters.iter().map(units::parameter).collect()
    }
}

/// Apply the schema policy to intents with runaway `training_phrase`
/// ordinals; under the lenient policy those intents are left out.
fn drop_sparse_groups(
    groups: &mut BTreeMap<String, Vec<AdvancedPhraseRow>>,
    names: NameSource<'_>,
    policy: SchemaPolicy,
) -> Result<()> {
    let problems: Vec<SchemaProblem> = groups
        .iter()
        .filter_map(|(name, rows)| sparse_ordinals(name, rows))
        .collect();
    if problems.is_empty() {
        return Ok(());
    }

    for problem in &problems {
        if let SchemaProblem::SparseOrdinals { display_name, .. } = problem {
            groups.remove(display_name);
        }
    }
    let schema = TableSchema::training_phrases(BuildMode::Advanced, names.is_keyed());
    apply_policy(
        SchemaReport {
            subject: schema.subject.clone(),
            expected: schema.render(),
            problems,
        },
        policy,
    )
}

/// Intent rows grouped by display name
#[derive(Debug, Clone, PartialEq)]
pub struct IntentSource {
    mode: BuildMode,
    groups: BTreeMap<String, IntentRows>,
}

impl IntentSource {
    /// Check and group the phrase table and, in advanced mode, the parameter
    /// table. Parameters for names with no phrases are ignored.
    pub fn from_tables(
        phrases: &Table,
        parameters: Option<&Table>,
        mode: BuildMode,
        names: NameSource<'_>,
        policy: SchemaPolicy,
    ) -> Result<Self> {
        let phrase_rows = read_phrase_rows(phrases, mode, names, policy)?;
        let mut parameter_groups = match (mode, parameters) {
            (BuildMode::Advanced, Some(table)) => {
                group_by_name(read_parameter_rows(table, names, policy)?)
            }
            _ => BTreeMap::new(),
        };
        let mut metadata: BTreeMap<String, IntentMetadata> =
            parse_meta_cells(read_meta_cells(phrases, names))?;

        let phrase_groups: Vec<(String, PhraseGroup)> = match phrase_rows {
            PhraseRows::Basic(rows) => group_by_name(rows)
                .into_iter()
                .map(|(name, rows)| (name, PhraseGroup::Basic(rows)))
                .collect(),
            PhraseRows::Advanced(rows) => {
                let mut groups = group_by_name(rows);
                drop_sparse_groups(&mut groups, names, policy)?;
                groups
                    .into_iter()
                    .map(|(name, rows)| (name, PhraseGroup::Advanced(rows)))
                    .collect()
            }
        };

        let groups = phrase_groups
            .into_iter()
            .map(|(name, phrases)| {
                let rows = IntentRows {
                    phrases,
                    parameters: parameter_groups.remove(&name).unwrap_or_default(),
                    metadata: metadata.remove(&name),
                };
                (name, rows)
            })
            .collect();

        Ok(Self { mode, groups })
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn display_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn get(&self, display_name: &str) -> Option<&IntentRows> {
        self.groups.get(display_name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Build one intent: a new one, or `existing` with its training data replaced
    pub fn build(&self, display_name: &str, existing: Option<&Intent>) -> Result<Intent> {
        self.build_with(display_name, existing, None)
    }

    /// As [`build`](Self::build), with `metadata` taking precedence over the
    /// `meta` column
    pub fn build_with(
        &self,
        display_name: &str,
        existing: Option<&Intent>,
        metadata: Option<&IntentMetadata>,
    ) -> Result<Intent> {
        let empty;
        let rows = match self.groups.get(display_name) {
            Some(rows) => rows,
            None => {
                empty = IntentRows {
                    phrases: match self.mode {
                        BuildMode::Basic => PhraseGroup::Basic(Vec::new()),
                        BuildMode::Advanced => PhraseGroup::Advanced(Vec::new()),
                    },
                    parameters: Vec::new(),
                    metadata: None,
                };
                &empty
            }
        };

        let phrases = rows.training_phrases();
        let parameters = rows.parameters();
        let metadata = metadata.or(rows.metadata.as_ref());
        match existing {
            Some(existing) => assemble_intent_update(existing, phrases, parameters, metadata),
            None => assemble_intent(display_name, phrases, parameters, metadata),
        }
    }
}

/// Everything the table says about one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTypeRows {
    pub values: Vec<EntityValueRow>,
    pub metadata: Option<EntityTypeMetadata>,
}

impl EntityTypeRows {
    /// Fails on the first malformed synonyms cell
    pub fn entity_values(&self) -> Result<Vec<EntityValue>> {
        self.values.iter().map(units::entity_value).collect()
    }
}

/// Entity value rows grouped by display name
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTypeSource {
    groups: BTreeMap<String, EntityTypeRows>,
}

impl EntityTypeSource {
    pub fn from_table(table: &Table, names: NameSource<'_>, policy: SchemaPolicy) -> Result<Self> {
        let rows = read_entity_rows(table, names, policy)?;
        let mut metadata: BTreeMap<String, EntityTypeMetadata> =
            parse_meta_cells(read_meta_cells(table, names))?;

        let groups = group_by_name(rows)
            .into_iter()
            .map(|(name, values)| {
                let rows = EntityTypeRows {
                    values,
                    metadata: metadata.remove(&name),
                };
                (name, rows)
            })
            .collect();

        Ok(Self { groups })
    }

    pub fn display_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn get(&self, display_name: &str) -> Option<&EntityTypeRows> {
        self.groups.get(display_name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn build(&self, display_name: &str, existing: Option<&EntityType>) -> Result<EntityType> {
        self.build_with(display_name, existing, None)
    }

    pub fn build_with(
        &self,
        display_name: &str,
        existing: Option<&EntityType>,
        metadata: Option<&EntityTypeMetadata>,
    ) -> Result<EntityType> {
        let (values, from_table) = match self.groups.get(display_name) {
            Some(rows) => (rows.entity_values()?, rows.metadata.as_ref()),
            None => (Vec::new(), None),
        };
        let metadata = metadata.or(from_table);

        match existing {
            Some(existing) => assemble_entity_type_update(existing, values, metadata),
            None => assemble_entity_type(display_name, values, metadata),
        }
    }
}
