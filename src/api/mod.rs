//! Response bodies that are not JSON: the public verification page and the
//! verification CSV export.

pub mod csv_export;
pub mod verify_page;

pub use csv_export::{export_filename, verifications_csv, CSV_HEADER};
pub use verify_page::{render_invalid_page, render_valid_page, INVALID_CODE_MESSAGE};
