//! Flatten agent resources back into the tables this tool imports

use super::metadata::{EntityTypeMetadata, IntentMetadata};
use super::schema::cols;
use super::table::Table;
use crate::api::{EntityType, Intent};
use crate::error::{CxSheetError, Result};

/// Advanced-mode phrase table and parameter table for a set of intents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentTables {
    pub training_phrases: Table,
    pub parameters: Table,
}

/// Flatten intents into advanced-mode rows. Metadata goes in the `meta`
/// column of each intent's first row.
pub fn flatten_intents(intents: &[Intent]) -> Result<IntentTables> {
    let mut phrases = Table::new([
        cols::DISPLAY_NAME,
        cols::TRAINING_PHRASE,
        cols::PART,
        cols::TEXT,
        cols::PARAMETER_ID,
        cols::META,
    ]);
    let mut parameters = Table::new([cols::DISPLAY_NAME, cols::ID, cols::ENTITY_TYPE]);

    for intent in intents {
        let mut meta = Some(to_json(&IntentMetadata::of(intent), &intent.display_name)?);

        for (tp_idx, phrase) in intent.training_phrases.iter().enumerate() {
            for (part_idx, part) in phrase.parts.iter().enumerate() {
                phrases.push_row([
                    intent.display_name.clone(),
                    tp_idx.to_string(),
                    part_idx.to_string(),
                    part.text.clone(),
                    part.parameter_id.clone().unwrap_or_default(),
                    meta.take().unwrap_or_default(),
                ]);
            }
        }

        for param in &intent.parameters {
            parameters.push_row([
                intent.display_name.clone(),
                param.id.clone(),
                param.entity_type.clone(),
            ]);
        }
    }

    Ok(IntentTables {
        training_phrases: phrases,
        parameters,
    })
}

/// Flatten entity types into value rows with JSON synonyms
pub fn flatten_entity_types(entity_types: &[EntityType]) -> Result<Table> {
    let mut table = Table::new([cols::DISPLAY_NAME, cols::VALUE, cols::SYNONYMS, cols::META]);

    for entity_type in entity_types {
        let mut meta = Some(to_json(&EntityTypeMetadata::of(entity_type), &entity_type.display_name)?);

        for value in &entity_type.entities {
            table.push_row([
                entity_type.display_name.clone(),
                value.value.clone(),
                to_json(&value.synonyms, &entity_type.display_name)?,
                meta.take().unwrap_or_default(),
            ]);
        }
    }

    Ok(table)
}

fn to_json<T: serde::Serialize>(value: &T, display_name: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| CxSheetError::parse(format!("export of '{}'", display_name), e))
}
