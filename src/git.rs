use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::command_utils::{execute_command, execute_command_with_env};
use crate::error::ImportError;

// Answers git's credential queries from the child environment so the token
// stays out of argv and out of the repository config.
const CREDENTIAL_HELPER: &str =
    "credential.helper=!f() { echo \"username=${GITEA_IMPORT_USERNAME}\"; echo \"password=${GITEA_IMPORT_PASSWORD}\"; }; f";

/// Basic credentials for an HTTP push.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// A repository on local disk, driven through the git binary.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    git: String,
    path: PathBuf,
}

impl LocalRepository {
    /// Open the repository at `path`, bare or with a work tree.
    pub fn open(git: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(ImportError::NotAGitRepo {
                path: path.display().to_string(),
            }
            .into());
        }

        let not_a_repo = || ImportError::NotAGitRepo {
            path: path.display().to_string(),
        };

        let output = execute_command(git, path, &["rev-parse", "--absolute-git-dir"])?;
        if !output.status.success() {
            return Err(not_a_repo().into());
        }

        // rev-parse walks up to enclosing repositories; only accept one
        // that lives at `path` itself.
        let root = path.canonicalize()?;
        let git_dir = PathBuf::from(String::from_utf8(output.stdout)?.trim());
        let git_dir = git_dir.canonicalize().unwrap_or(git_dir);
        if git_dir != root && git_dir.parent() != Some(root.as_path()) {
            return Err(not_a_repo().into());
        }

        Ok(Self {
            git: git.to_string(),
            path: root,
        })
    }

    /// Short name of the branch HEAD points at.
    pub fn head_branch(&self) -> Result<String> {
        let output = self.run(&["symbolic-ref", "--short", "HEAD"])?;
        if !output.status.success() {
            return Err(ImportError::HeadUnresolved {
                message: stderr_of(&output),
            }
            .into());
        }

        // An unborn branch still has a symbolic HEAD, but nothing to push.
        let branch = String::from_utf8(output.stdout)?.trim().to_string();
        let verify = self.run(&["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])?;
        if !verify.status.success() {
            return Err(ImportError::HeadUnresolved {
                message: format!("branch '{}' has no commits", branch),
            }
            .into());
        }

        Ok(branch)
    }

    /// URLs configured for `name`, empty when the remote does not exist.
    #[cfg(test)]
    pub(crate) fn remote_urls(&self, name: &str) -> Result<Vec<String>> {
        let output = self.run(&["remote", "get-url", "--all", name])?;
        if !output.status.success() {
            return Ok(Vec::new());
        }

        Ok(String::from_utf8(output.stdout)?
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    pub fn delete_remote(&self, name: &str) -> Result<()> {
        let output = self.run(&["remote", "remove", name])?;
        if !output.status.success() {
            return Err(ImportError::GitCommandFailed {
                message: format!("Failed to remove remote '{}': {}", name, stderr_of(&output)),
            }
            .into());
        }
        Ok(())
    }

    pub fn create_remote(&self, name: &str, url: &str) -> Result<()> {
        let output = self.run(&["remote", "add", name, url])?;
        if !output.status.success() {
            return Err(ImportError::GitCommandFailed {
                message: format!("Failed to add remote '{}': {}", name, stderr_of(&output)),
            }
            .into());
        }
        Ok(())
    }

    /// Push `branch` to the same branch name on `remote`.
    pub fn push(&self, remote: &str, branch: &str, auth: &BasicAuth) -> Result<()> {
        let refspec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
        debug!(remote, %refspec, "pushing");

        let mut args: Vec<&str> = credential_config().to_vec();
        args.extend(["push", remote, refspec.as_str()]);
        let output = execute_command_with_env(&self.git, &self.path, &args, &credential_env(auth))?;

        if !output.status.success() {
            return Err(ImportError::GitCommandFailed {
                message: format!("Push to '{}' failed: {}", remote, stderr_of(&output)),
            }
            .into());
        }
        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        execute_command(&self.git, &self.path, args)
    }
}

/// `-c` options replacing any configured helper with [`CREDENTIAL_HELPER`].
fn credential_config() -> [&'static str; 4] {
    ["-c", "credential.helper=", "-c", CREDENTIAL_HELPER]
}

/// Environment read by [`CREDENTIAL_HELPER`].
fn credential_env(auth: &BasicAuth) -> [(&'static str, &str); 3] {
    [
        ("GITEA_IMPORT_USERNAME", auth.username.as_str()),
        ("GITEA_IMPORT_PASSWORD", auth.password.as_str()),
        ("GIT_TERMINAL_PROMPT", "0"),
    ]
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}
