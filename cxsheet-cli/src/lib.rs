//! cxsheet: build Dialogflow CX intents and entity types from spreadsheets
//!
//! Rows of training phrases, parameters and entity values are grouped by
//! display name, assembled into agent resources and optionally pushed to the
//! agent in a paced batch.

pub mod api;
pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod cxsheets;
pub mod error;
pub mod sheets;

pub use cxsheets::{BulkOptions, CxSheets};
pub use error::{CxSheetError, Result};
