//! Builders for single training phrases, entity values and parameters

use super::rows::{AdvancedPhraseRow, BasicPhraseRow, EntityValueRow, ParameterRow};
use crate::api::{EntityValue, IntentParameter, Part, TrainingPhrase};
use crate::error::{CxSheetError, Result};

/// Every built phrase counts once
pub const REPEAT_COUNT: i32 = 1;

/// A phrase from its parts, already in part order
pub fn advanced_phrase(parts: &[&AdvancedPhraseRow]) -> TrainingPhrase {
    TrainingPhrase {
        id: String::new(),
        parts: parts
            .iter()
            .map(|row| Part {
                text: row.text.clone(),
                parameter_id: row.parameter_id.clone(),
            })
            .collect(),
        repeat_count: REPEAT_COUNT,
    }
}

/// A single-part, untagged phrase
pub fn basic_phrase(row: &BasicPhraseRow) -> TrainingPhrase {
    TrainingPhrase {
        id: String::new(),
        parts: vec![Part {
            text: row.text.clone(),
            parameter_id: None,
        }],
        repeat_count: REPEAT_COUNT,
    }
}

pub fn parameter(row: &ParameterRow) -> IntentParameter {
    IntentParameter {
        id: row.id.clone(),
        entity_type: row.entity_type.clone(),
        is_list: false,
        redact: false,
    }
}

/// An entity value; the synonyms cell must be a JSON array of strings
pub fn entity_value(row: &EntityValueRow) -> Result<EntityValue> {
    let synonyms: Vec<String> = serde_json::from_str(&row.synonyms).map_err(|e| {
        CxSheetError::parse(
            format!(
                "synonyms of value '{}' in entity type '{}' (row {})",
                row.value, row.display_name, row.row
            ),
            e,
        )
    })?;

    Ok(EntityValue {
        value: row.value.clone(),
        synonyms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_row(synonyms: &str) -> EntityValueRow {
        EntityValueRow {
            row: 2,
            display_name: "color".to_string(),
            value: "red".to_string(),
            synonyms: synonyms.to_string(),
        }
    }

    #[test]
    fn test_advanced_phrase_keeps_tags() {
        let a = AdvancedPhraseRow {
            row: 2,
            display_name: "order".to_string(),
            training_phrase: 0,
            part: 0,
            text: "track ".to_string(),
            parameter_id: None,
        };
        let b = AdvancedPhraseRow {
            part: 1,
            text: "A123".to_string(),
            parameter_id: Some("order_id".to_string()),
            ..a.clone()
        };

        let phrase = advanced_phrase(&[&a, &b]);

        assert_eq!(phrase.repeat_count, 1);
        assert_eq!(phrase.text(), "track A123");
        assert_eq!(phrase.parts[1].parameter_id.as_deref(), Some("order_id"));
    }

    #[test]
    fn test_basic_phrase_has_one_untagged_part() {
        let row = BasicPhraseRow {
            row: 2,
            display_name: "greet".to_string(),
            text: "hello".to_string(),
        };
        let phrase = basic_phrase(&row);
        assert_eq!(phrase.parts.len(), 1);
        assert_eq!(phrase.parts[0].parameter_id, None);
    }

    #[test]
    fn test_entity_value_parses_synonyms() {
        let value = entity_value(&entity_row(r#"["red", "crimson"]"#)).unwrap();
        assert_eq!(value.synonyms, vec!["red", "crimson"]);
    }

    #[test]
    fn test_entity_value_rejects_malformed_synonyms() {
        let err = entity_value(&entity_row("not-json")).unwrap_err();
        assert!(matches!(err, CxSheetError::Parse { .. }));
        assert!(err.to_string().contains("value 'red' in entity type 'color' (row 2)"));
    }

    #[test]
    fn test_entity_value_rejects_non_array() {
        assert!(entity_value(&entity_row(r#"{"red": 1}"#)).is_err());
    }

    #[test]
    fn test_parameter_defaults() {
        let row = ParameterRow {
            row: 2,
            display_name: "order".to_string(),
            id: "order_id".to_string(),
            entity_type: "projects/p/locations/global/agents/a/entityTypes/e".to_string(),
        };
        let param = parameter(&row);
        assert!(!param.is_list);
        assert!(!param.redact);
    }
}
