/// Name of the remote configured on every imported repository.
pub const IMPORT_REMOTE: &str = "gitea-import";

/// Process-level settings. Nothing is read from the environment; the
/// importer is configured by its command line alone.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub git_path: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            git_path: "git".to_string(),
        }
    }
}
