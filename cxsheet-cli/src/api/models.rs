//! Dialogflow CX resource models (v3beta1 REST representation)

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CxSheetError, Result};

/// The two kinds of collection this tool builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Intent,
    EntityType,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Intent => write!(f, "intent"),
            ResourceKind::EntityType => write!(f, "entity type"),
        }
    }
}

/// An intent resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Server-assigned identifier (`projects/.../intents/<uuid>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub training_phrases: Vec<TrainingPhrase>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<IntentParameter>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub description: String,
}

impl Intent {
    /// Top-level fields accepted in a built intent document
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "displayName",
        "trainingPhrases",
        "parameters",
        "priority",
        "isFallback",
        "labels",
        "description",
    ];
}

/// One training phrase: an ordered list of parts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPhrase {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub parts: Vec<Part>,
    #[serde(default)]
    pub repeat_count: i32,
}

impl TrainingPhrase {
    /// Full text of the phrase with parts concatenated
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// A fragment of a training phrase, optionally annotated with a parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_id: Option<String>,
}

/// A parameter referenced by training phrase parts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentParameter {
    pub id: String,
    pub entity_type: String,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub redact: bool,
}

/// An entity type resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub auto_expansion_mode: AutoExpansionMode,
    #[serde(default)]
    pub entities: Vec<EntityValue>,
    #[serde(default)]
    pub excluded_phrases: Vec<ExcludedPhrase>,
    #[serde(default)]
    pub enable_fuzzy_extraction: bool,
    #[serde(default)]
    pub redact: bool,
}

impl EntityType {
    /// Top-level fields accepted in a built entity type document
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "displayName",
        "kind",
        "autoExpansionMode",
        "entities",
        "excludedPhrases",
        "enableFuzzyExtraction",
        "redact",
    ];
}

/// One entity value with its synonyms
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityValue {
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPhrase {
    pub value: String,
}

/// Declares a proto enum that serializes as its name and accepts the name or
/// the numeric code when deserializing.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = ($code:literal, $wire:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn from_wire(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            pub fn as_wire(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_wire())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                match WireCode::deserialize(deserializer)? {
                    WireCode::Code(code) => $name::from_code(code).ok_or_else(|| {
                        serde::de::Error::custom(format!(
                            "unknown {} code {}", stringify!($name), code
                        ))
                    }),
                    WireCode::Name(name) => $name::from_wire(&name).ok_or_else(|| {
                        serde::de::Error::custom(format!(
                            "unknown {} '{}'", stringify!($name), name
                        ))
                    }),
                }
            }
        }
    };
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireCode {
    Code(i64),
    Name(String),
}

wire_enum! {
    /// How entity values are matched
    pub enum EntityKind {
        Unspecified = (0, "KIND_UNSPECIFIED"),
        Map = (1, "KIND_MAP"),
        List = (2, "KIND_LIST"),
        Regexp = (3, "KIND_REGEXP"),
    }
}

wire_enum! {
    /// Whether the agent expands entity values automatically
    pub enum AutoExpansionMode {
        Unspecified = (0, "AUTO_EXPANSION_MODE_UNSPECIFIED"),
        Default = (1, "AUTO_EXPANSION_MODE_DEFAULT"),
    }
}

static AGENT_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^projects/([^/]+)/locations/([^/]+)/agents/([^/]+)$").expect("valid regex")
});

static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^projects/[^/]+/locations/([^/]+)/").expect("valid regex"));

/// A validated agent resource path (`projects/p/locations/l/agents/a`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPath {
    path: String,
    location: String,
}

impl AgentPath {
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.trim().trim_end_matches('/');
        let caps = AGENT_PATH_RE.captures(path).ok_or_else(|| {
            CxSheetError::configuration(format!(
                "agent must look like projects/<project>/locations/<location>/agents/<id>, got '{}'",
                path
            ))
        })?;
        Ok(Self {
            path: path.to_string(),
            location: caps[2].to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for AgentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Location segment of any resource name under `projects/*/locations/*`
pub fn location_of(resource: &str) -> Option<&str> {
    LOCATION_RE
        .captures(resource)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
