#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Bearer token for the spreadsheet backend. Acquiring/refreshing it is
    /// the host application's job; this component only forwards it.
    pub access_token: String,
    /// Email granted writer access on every newly created spreadsheet.
    pub collaborator_email: String,
    pub row_layout: crate::records::RowLayout,
    pub sheets_base_url: String,
    pub drive_base_url: String,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("access_token", &"[redacted]")
            .field("collaborator_email", &self.collaborator_email)
            .field("row_layout", &self.row_layout)
            .field("sheets_base_url", &self.sheets_base_url)
            .field("drive_base_url", &self.drive_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
