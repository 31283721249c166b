use thiserror::Error;

/// Errors returned by the spreadsheet backend client.
///
/// Every variant is terminal for the export that triggered it: no retry is
/// applied and the error propagates unchanged to the caller.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status. `message` is taken from
    /// the `{"error": {"message": ...}}` envelope when present.
    #[error("backend API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A configured base URL cannot serve as a base for endpoint paths.
    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
