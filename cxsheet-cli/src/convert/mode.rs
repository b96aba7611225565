//! Training phrase build modes

use std::fmt;
use std::str::FromStr;

use crate::error::CxSheetError;

/// How training phrase rows map onto phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// One row is one phrase with a single untagged part
    #[default]
    Basic,
    /// Rows carry `training_phrase` and `part` ordinals and optional parameter tags
    Advanced,
}

impl FromStr for BuildMode {
    type Err = CxSheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(BuildMode::Basic),
            "advanced" => Ok(BuildMode::Advanced),
            other => Err(CxSheetError::configuration(format!(
                "mode must be basic or advanced, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Basic => write!(f, "basic"),
            BuildMode::Advanced => write!(f, "advanced"),
        }
    }
}
