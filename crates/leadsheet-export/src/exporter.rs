//! The Result Exporter: per-user document resolution plus per-query
//! worksheet export.
//!
//! One exporter instance owns the backend client and the user→document
//! cache for its process lifetime. The cache is never evicted and never
//! persisted; after a restart the document is rediscovered by title.
//!
//! Concurrent exports for the same not-yet-cached user can each run the
//! search-or-create sequence and end up with duplicate documents. That race
//! is an accepted limitation of the name-based resolution policy.

use std::collections::HashMap;

use chrono::Utc;
use leadsheet_core::records::{ListingRecord, QueryDetails, RowLayout, ScrapedRecord};
use leadsheet_core::AppConfig;
use leadsheet_sheets::{SheetsClient, SheetsError};

use crate::rows;

/// Identity of the end user an export belongs to, as supplied by the
/// calling chat-bot framework.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub user_id: i64,
    pub username: Option<String>,
}

impl CallerContext {
    /// The name used in document titles: the display name when the caller
    /// has one, otherwise the stringified numeric id.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.user_id.to_string())
    }
}

/// Formats scraped listings into spreadsheet rows: one document per user,
/// one worksheet per query, one bulk write per export.
pub struct ResultExporter {
    client: SheetsClient,
    collaborator_email: String,
    layout: RowLayout,
    documents: HashMap<i64, String>,
}

impl ResultExporter {
    pub fn new(
        client: SheetsClient,
        collaborator_email: impl Into<String>,
        layout: RowLayout,
    ) -> Self {
        Self {
            client,
            collaborator_email: collaborator_email.into(),
            layout,
            documents: HashMap::new(),
        }
    }

    /// Builds an exporter (and its backend client) from application config.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError`] if the backend client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, SheetsError> {
        let client = SheetsClient::with_base_urls(
            &config.access_token,
            config.request_timeout_secs,
            &config.sheets_base_url,
            &config.drive_base_url,
        )?;
        Ok(Self::new(
            client,
            config.collaborator_email.clone(),
            config.row_layout,
        ))
    }

    /// Resolves the output document for a user: cache, then title search,
    /// then creation.
    ///
    /// A cache hit returns with zero remote calls. On a miss, one Drive
    /// search for `"Results for {username}"`; if nothing matches, one
    /// create plus one writer grant for the configured collaborator. The
    /// cache is only written once the full sequence has succeeded, so a
    /// failed resolution leaves no partial entry behind.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError`] if the search, create, or permission call
    /// fails.
    pub async fn resolve_user_document(
        &mut self,
        user_id: i64,
        username: &str,
    ) -> Result<String, SheetsError> {
        if let Some(id) = self.documents.get(&user_id) {
            return Ok(id.clone());
        }

        let title = format!("Results for {username}");

        if let Some(id) = self.client.find_file_by_title(&title).await? {
            tracing::debug!(user_id, spreadsheet_id = %id, "reusing existing spreadsheet");
            self.documents.insert(user_id, id.clone());
            return Ok(id);
        }

        let id = self.client.create_spreadsheet(&title).await?;
        self.client
            .grant_writer(&id, &self.collaborator_email)
            .await?;
        tracing::info!(user_id, username, spreadsheet_id = %id, "created new spreadsheet");

        self.documents.insert(user_id, id.clone());
        Ok(id)
    }

    /// Creates a worksheet for one search query and writes the formatted
    /// rows into it as a single bulk update. Returns the worksheet name.
    ///
    /// Records that don't decode are logged and skipped; the remaining
    /// rows are written in input order, after the header row.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError`] if the worksheet creation or the bulk write
    /// fails. The backend may have partially applied the creation in that
    /// case; no rollback is attempted.
    pub async fn export_query_results(
        &self,
        document_id: &str,
        details: &QueryDetails,
        records: &[ScrapedRecord],
    ) -> Result<String, SheetsError> {
        let name = rows::worksheet_name(details, Utc::now());

        self.client
            .add_worksheet(
                document_id,
                &name,
                rows::WORKSHEET_ROW_COUNT,
                self.layout.column_count(),
            )
            .await?;

        let mut values = vec![rows::header_row(self.layout)];
        for record in records {
            match ListingRecord::decode(&record.source, &record.data) {
                Ok(listing) => values.push(rows::format_row(&listing, self.layout)),
                Err(err) => tracing::warn!(%err, "skipping malformed record"),
            }
        }

        let range = rows::bulk_range(&name, self.layout, values.len());
        self.client
            .update_values(document_id, &range, values)
            .await?;

        tracing::debug!(document_id, worksheet = %name, records = records.len(), "export written");
        Ok(name)
    }

    /// Top-level entry point: resolves the caller's document, then exports
    /// the records into a fresh worksheet. Returns the document id.
    ///
    /// # Errors
    ///
    /// Propagates any [`SheetsError`] from resolution or export unchanged.
    pub async fn export(
        &mut self,
        caller: &CallerContext,
        records: &[ScrapedRecord],
        details: &QueryDetails,
    ) -> Result<String, SheetsError> {
        let document_id = self
            .resolve_user_document(caller.user_id, &caller.display_name())
            .await?;
        self.export_query_results(&document_id, details, records)
            .await?;
        Ok(document_id)
    }
}
