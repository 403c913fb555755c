use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid format for change list at line {line_number}: {line:?}")]
    InvalidLineFormat { line_number: usize, line: String },

    #[error("Invalid boolean value for repo {full_name:?}: {value:?}")]
    InvalidPrivateFlag { full_name: String, value: String },

    #[error("Invalid repository format {full_name:?}, expected <org>/<repo>")]
    InvalidFullName { full_name: String },

    #[error("Not a git repository: {path}")]
    NotAGitRepo { path: String },

    #[error("Cannot resolve HEAD: {message}")]
    HeadUnresolved { message: String },

    #[error("Git command failed: {message}")]
    GitCommandFailed { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Gitea API error ({status}): {message}")]
    Api { status: u16, message: String },
}
