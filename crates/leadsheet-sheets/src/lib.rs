pub mod client;
pub mod error;
pub mod types;

pub use client::SheetsClient;
pub use error::SheetsError;
