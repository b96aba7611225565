//! Where a table lives: a CSV file, a workbook tab or a Google Sheets tab

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::CxSheetError;

pub const GSHEET_SCHEME: &str = "gsheet://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLocation {
    Csv(PathBuf),
    /// `tab` defaults to the first sheet on read and `Sheet1` on write
    Xlsx { path: PathBuf, tab: Option<String> },
    /// `sheet` is a spreadsheet title or id
    GoogleSheet { sheet: String, tab: String },
}

impl FromStr for TableLocation {
    type Err = CxSheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(rest) = s.strip_prefix(GSHEET_SCHEME) {
            return match rest.rsplit_once('#') {
                Some((sheet, tab)) if !sheet.is_empty() && !tab.is_empty() => {
                    Ok(TableLocation::GoogleSheet {
                        sheet: sheet.to_string(),
                        tab: tab.to_string(),
                    })
                }
                _ => Err(CxSheetError::configuration(format!(
                    "Google Sheets location must look like {}<sheet>#<tab>, got '{}'",
                    GSHEET_SCHEME, s
                ))),
            };
        }

        let (path, tab) = match s.rsplit_once('#') {
            Some((path, tab)) if !tab.is_empty() => (path, Some(tab.to_string())),
            _ => (s, None),
        };
        let path = PathBuf::from(path);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match (extension.as_deref(), tab) {
            (Some("csv"), None) => Ok(TableLocation::Csv(path)),
            (Some("csv"), Some(_)) => Err(CxSheetError::configuration(format!(
                "CSV files have no tabs: '{}'",
                s
            ))),
            (Some("xlsx") | Some("xlsm"), tab) => Ok(TableLocation::Xlsx { path, tab }),
            _ => Err(CxSheetError::configuration(format!(
                "unsupported table location '{}' (expected .csv, .xlsx[#tab] or {}<sheet>#<tab>)",
                s, GSHEET_SCHEME
            ))),
        }
    }
}

impl fmt::Display for TableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableLocation::Csv(path) => write!(f, "{}", path.display()),
            TableLocation::Xlsx { path, tab: None } => write!(f, "{}", path.display()),
            TableLocation::Xlsx {
                path,
                tab: Some(tab),
            } => write!(f, "{}#{}", path.display(), tab),
            TableLocation::GoogleSheet { sheet, tab } => write!(f, "{}{}#{}", GSHEET_SCHEME, sheet, tab),
        }
    }
}
