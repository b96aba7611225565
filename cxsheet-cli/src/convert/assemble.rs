//! Assembly of whole intents and entity types.
//!
//! Each collection is written as a wire document first and then parsed into
//! the typed model, so the payload sent to the agent is exactly what the
//! service schema accepts.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::metadata::{EntityTypeMetadata, IntentMetadata};
use crate::api::{
    AutoExpansionMode, EntityKind, EntityType, EntityValue, Intent, IntentParameter, ResourceKind,
    TrainingPhrase,
};
use crate::error::{CxSheetError, Result};

/// A new intent; unset metadata takes the service defaults
pub fn assemble_intent(
    display_name: &str,
    training_phrases: Vec<TrainingPhrase>,
    parameters: Vec<IntentParameter>,
    metadata: Option<&IntentMetadata>,
) -> Result<Intent> {
    let meta = metadata.cloned().unwrap_or_default();

    let mut doc = json!({
        "displayName": display_name,
        "priority": meta.priority.unwrap_or(IntentMetadata::DEFAULT_PRIORITY),
        "isFallback": meta.is_fallback.unwrap_or(false),
        "labels": meta.labels.unwrap_or_default(),
        "description": meta.description.unwrap_or_default(),
        "trainingPhrases": to_wire(&training_phrases, display_name)?,
    });
    if !parameters.is_empty() {
        doc["parameters"] = to_wire(&parameters, display_name)?;
    }

    parse_document(doc, ResourceKind::Intent, Intent::FIELDS, display_name)
}

/// Replace an existing intent's training data.
///
/// Identity and every metadata field the sheet does not override are kept.
/// Parameters are replaced only when the sheet supplies some.
pub fn assemble_intent_update(
    existing: &Intent,
    training_phrases: Vec<TrainingPhrase>,
    parameters: Vec<IntentParameter>,
    metadata: Option<&IntentMetadata>,
) -> Result<Intent> {
    let meta = metadata.cloned().unwrap_or_default();
    let display_name = existing.display_name.as_str();
    let parameters = if parameters.is_empty() {
        existing.parameters.clone()
    } else {
        parameters
    };

    let mut doc = json!({
        "displayName": display_name,
        "priority": meta.priority.unwrap_or(existing.priority),
        "isFallback": meta.is_fallback.unwrap_or(existing.is_fallback),
        "labels": meta.labels.unwrap_or_else(|| existing.labels.clone()),
        "description": meta.description.unwrap_or_else(|| existing.description.clone()),
        "trainingPhrases": to_wire(&training_phrases, display_name)?,
    });
    if let Some(name) = &existing.name {
        doc["name"] = Value::String(name.clone());
    }
    if !parameters.is_empty() {
        doc["parameters"] = to_wire(&parameters, display_name)?;
    }

    parse_document(doc, ResourceKind::Intent, Intent::FIELDS, display_name)
}

/// A new entity type; unset metadata takes the map-kind defaults
pub fn assemble_entity_type(
    display_name: &str,
    entities: Vec<EntityValue>,
    metadata: Option<&EntityTypeMetadata>,
) -> Result<EntityType> {
    let meta = metadata.cloned().unwrap_or_default();

    let doc = json!({
        "displayName": display_name,
        "kind": meta.kind.unwrap_or(EntityKind::Map),
        "autoExpansionMode": meta.auto_expansion_mode.unwrap_or(AutoExpansionMode::Unspecified),
        "excludedPhrases": to_wire(&meta.excluded_phrases.unwrap_or_default(), display_name)?,
        "enableFuzzyExtraction": meta.enable_fuzzy_extraction.unwrap_or(false),
        "redact": meta.redact.unwrap_or(false),
        "entities": to_wire(&entities, display_name)?,
    });

    parse_document(doc, ResourceKind::EntityType, EntityType::FIELDS, display_name)
}

/// Replace an existing entity type's values, keeping identity and unset metadata
pub fn assemble_entity_type_update(
    existing: &EntityType,
    entities: Vec<EntityValue>,
    metadata: Option<&EntityTypeMetadata>,
) -> Result<EntityType> {
    let meta = metadata.cloned().unwrap_or_default();
    let display_name = existing.display_name.as_str();
    let excluded = meta
        .excluded_phrases
        .unwrap_or_else(|| existing.excluded_phrases.clone());

    let mut doc = json!({
        "displayName": display_name,
        "kind": meta.kind.unwrap_or(existing.kind),
        "autoExpansionMode": meta.auto_expansion_mode.unwrap_or(existing.auto_expansion_mode),
        "excludedPhrases": to_wire(&excluded, display_name)?,
        "enableFuzzyExtraction": meta.enable_fuzzy_extraction.unwrap_or(existing.enable_fuzzy_extraction),
        "redact": meta.redact.unwrap_or(existing.redact),
        "entities": to_wire(&entities, display_name)?,
    });
    if let Some(name) = &existing.name {
        doc["name"] = Value::String(name.clone());
    }

    parse_document(doc, ResourceKind::EntityType, EntityType::FIELDS, display_name)
}

fn to_wire<T: Serialize + ?Sized>(value: &T, display_name: &str) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| CxSheetError::parse(format!("document for '{}'", display_name), e))
}

/// Parse a wire document into its typed resource. Fields the resource does
/// not define are rejected rather than dropped.
pub fn parse_document<T: DeserializeOwned>(
    doc: Value,
    kind: ResourceKind,
    fields: &[&str],
    display_name: &str,
) -> Result<T> {
    let context = format!("{} document for '{}'", kind, display_name);

    let Value::Object(map) = &doc else {
        return Err(CxSheetError::parse(context, "document is not a JSON object"));
    };
    if let Some(unknown) = unknown_field(map, fields) {
        return Err(CxSheetError::parse(context, format!("unknown field '{}'", unknown)));
    }

    serde_json::from_value(doc).map_err(|e| CxSheetError::parse(context, e))
}

fn unknown_field<'a>(map: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a str> {
    map.keys()
        .map(|k| k.as_str())
        .find(|k| !fields.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ExcludedPhrase, Part};
    use std::collections::BTreeMap;

    fn phrase(text: &str) -> TrainingPhrase {
        TrainingPhrase {
            id: String::new(),
            parts: vec![Part {
                text: text.to_string(),
                parameter_id: None,
            }],
            repeat_count: 1,
        }
    }

    fn existing_intent() -> Intent {
        Intent {
            name: Some("projects/p/locations/global/agents/a/intents/42".to_string()),
            display_name: "order".to_string(),
            training_phrases: vec![phrase("old")],
            parameters: vec![IntentParameter {
                id: "order_id".to_string(),
                entity_type: "projects/-/locations/-/agents/-/entityTypes/sys.any".to_string(),
                is_list: false,
                redact: false,
            }],
            priority: 7,
            is_fallback: true,
            labels: BTreeMap::from([("team".to_string(), "ops".to_string())]),
            description: "orders".to_string(),
        }
    }

    #[test]
    fn test_create_uses_defaults() {
        let intent = assemble_intent("greet", vec![phrase("hi")], Vec::new(), None).unwrap();

        assert_eq!(intent.name, None);
        assert_eq!(intent.display_name, "greet");
        assert_eq!(intent.priority, 500_000);
        assert!(!intent.is_fallback);
        assert!(intent.labels.is_empty());
        assert_eq!(intent.description, "");
        assert!(intent.parameters.is_empty());
    }

    #[test]
    fn test_create_applies_metadata() {
        let meta = IntentMetadata {
            priority: Some(10),
            description: Some("greetings".to_string()),
            ..Default::default()
        };
        let intent = assemble_intent("greet", vec![phrase("hi")], Vec::new(), Some(&meta)).unwrap();
        assert_eq!(intent.priority, 10);
        assert_eq!(intent.description, "greetings");
        assert!(!intent.is_fallback);
    }

    #[test]
    fn test_update_preserves_identity_and_metadata() {
        let existing = existing_intent();
        let meta = IntentMetadata {
            priority: Some(1),
            ..Default::default()
        };

        let updated =
            assemble_intent_update(&existing, vec![phrase("new")], Vec::new(), Some(&meta)).unwrap();

        assert_eq!(updated.name, existing.name);
        assert_eq!(updated.priority, 1);
        assert!(updated.is_fallback);
        assert_eq!(updated.labels, existing.labels);
        assert_eq!(updated.description, "orders");
        assert_eq!(updated.training_phrases, vec![phrase("new")]);
        assert_eq!(updated.parameters, existing.parameters);
    }

    #[test]
    fn test_update_replaces_supplied_parameters() {
        let existing = existing_intent();
        let params = vec![IntentParameter {
            id: "date".to_string(),
            entity_type: "projects/-/locations/-/agents/-/entityTypes/sys.date".to_string(),
            is_list: false,
            redact: false,
        }];

        let updated = assemble_intent_update(&existing, Vec::new(), params.clone(), None).unwrap();
        assert_eq!(updated.parameters, params);
    }

    #[test]
    fn test_entity_type_defaults() {
        let values = vec![EntityValue {
            value: "red".to_string(),
            synonyms: vec!["red".to_string(), "crimson".to_string()],
        }];
        let entity_type = assemble_entity_type("color", values.clone(), None).unwrap();

        assert_eq!(entity_type.kind, EntityKind::Map);
        assert_eq!(entity_type.auto_expansion_mode, AutoExpansionMode::Unspecified);
        assert!(entity_type.excluded_phrases.is_empty());
        assert!(!entity_type.enable_fuzzy_extraction);
        assert_eq!(entity_type.entities, values);
    }

    #[test]
    fn test_entity_type_update_keeps_unset_metadata() {
        let existing = EntityType {
            name: Some("projects/p/locations/global/agents/a/entityTypes/9".to_string()),
            display_name: "color".to_string(),
            kind: EntityKind::List,
            excluded_phrases: vec![ExcludedPhrase {
                value: "blue-ish".to_string(),
            }],
            enable_fuzzy_extraction: true,
            ..Default::default()
        };
        let meta = EntityTypeMetadata {
            kind: Some(EntityKind::Map),
            ..Default::default()
        };

        let updated = assemble_entity_type_update(&existing, Vec::new(), Some(&meta)).unwrap();

        assert_eq!(updated.name, existing.name);
        assert_eq!(updated.kind, EntityKind::Map);
        assert!(updated.enable_fuzzy_extraction);
        assert_eq!(updated.excluded_phrases, existing.excluded_phrases);
    }

    #[test]
    fn test_parse_document_rejects_unknown_field() {
        let doc = json!({"displayName": "greet", "trainingPhrase": []});
        let err = parse_document::<Intent>(doc, ResourceKind::Intent, Intent::FIELDS, "greet").unwrap_err();
        assert!(matches!(err, CxSheetError::Parse { .. }));
        assert!(err.to_string().contains("unknown field 'trainingPhrase'"));
    }

    #[test]
    fn test_parse_document_rejects_wrong_type() {
        let doc = json!({"displayName": "greet", "priority": "high"});
        assert!(parse_document::<Intent>(doc, ResourceKind::Intent, Intent::FIELDS, "greet").is_err());
    }

    #[test]
    fn test_serialized_intent_parses_back() {
        let meta = IntentMetadata {
            priority: Some(3),
            is_fallback: Some(true),
            labels: Some(BTreeMap::from([("a".to_string(), "b".to_string())])),
            description: Some("d".to_string()),
        };
        let intent = assemble_intent("greet", vec![phrase("hi"), phrase("yo")], Vec::new(), Some(&meta)).unwrap();

        let text = serde_json::to_string(&intent).unwrap();
        let parsed = parse_document::<Intent>(
            serde_json::from_str(&text).unwrap(),
            ResourceKind::Intent,
            Intent::FIELDS,
            "greet",
        )
        .unwrap();

        assert_eq!(parsed, intent);
    }
}
