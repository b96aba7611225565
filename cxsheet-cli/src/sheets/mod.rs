//! Reading and writing tables wherever they live

pub mod file;
pub mod google;
pub mod location;

pub use file::{read_csv, read_xlsx, write_csv, write_xlsx};
pub use google::GoogleSheetsClient;
pub use location::TableLocation;
