pub mod exporter;
pub mod rows;

pub use exporter::{CallerContext, ResultExporter};
// The backend client error doubles as this crate's export error: every
// failure an export can hit is a backend failure.
pub use leadsheet_sheets::SheetsError;
