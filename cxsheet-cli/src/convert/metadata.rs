//! Collection-level metadata overrides read from the `meta` column

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::{AutoExpansionMode, EntityKind, EntityType, ExcludedPhrase, Intent};
use crate::error::{CxSheetError, Result};

/// Intent fields a sheet may override. Unset fields keep their default on
/// create and their current value on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, alias = "isFallback", skip_serializing_if = "Option::is_none")]
    pub is_fallback: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IntentMetadata {
    pub const DEFAULT_PRIORITY: i32 = 500_000;

    /// Metadata that reproduces an existing intent
    pub fn of(intent: &Intent) -> Self {
        Self {
            priority: Some(intent.priority),
            is_fallback: Some(intent.is_fallback),
            labels: Some(intent.labels.clone()),
            description: Some(intent.description.clone()),
        }
    }
}

/// Entity type fields a sheet may override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityTypeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    #[serde(default, alias = "autoExpansionMode", skip_serializing_if = "Option::is_none")]
    pub auto_expansion_mode: Option<AutoExpansionMode>,
    #[serde(default, alias = "excludedPhrases", skip_serializing_if = "Option::is_none")]
    pub excluded_phrases: Option<Vec<ExcludedPhrase>>,
    #[serde(default, alias = "enableFuzzyExtraction", skip_serializing_if = "Option::is_none")]
    pub enable_fuzzy_extraction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact: Option<bool>,
}

impl EntityTypeMetadata {
    pub fn of(entity_type: &EntityType) -> Self {
        Self {
            kind: Some(entity_type.kind),
            auto_expansion_mode: Some(entity_type.auto_expansion_mode),
            excluded_phrases: Some(entity_type.excluded_phrases.clone()),
            enable_fuzzy_extraction: Some(entity_type.enable_fuzzy_extraction),
            redact: Some(entity_type.redact),
        }
    }
}

/// Parse one `meta` cell
pub fn parse_meta<M: DeserializeOwned>(raw: &str, display_name: &str) -> Result<M> {
    serde_json::from_str(raw)
        .map_err(|e| CxSheetError::parse(format!("meta of '{}'", display_name), e))
}

/// Parse every `meta` cell; any malformed cell fails the whole table
pub fn parse_meta_cells<M: DeserializeOwned>(
    cells: BTreeMap<String, String>,
) -> Result<BTreeMap<String, M>> {
    cells
        .into_iter()
        .map(|(name, raw)| {
            let meta = parse_meta(&raw, &name)?;
            Ok((name, meta))
        })
        .collect()
}
