use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::changelist::{ChangeList, ChangeListEntry};
use crate::config::{SystemConfig, IMPORT_REMOTE};
use crate::git::{BasicAuth, LocalRepository};
use crate::gitea::{CreateRepoOption, RemoteHost};

/// Who the run acts as. Established once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub token: String,
}

impl Session {
    /// Resolve the identity behind `token`.
    pub fn establish(host: &dyn RemoteHost, token: &str) -> Result<Self> {
        let user = host.current_user().context("Failed to authenticate")?;
        Ok(Self {
            username: user.login,
            token: token.to_string(),
        })
    }

    fn push_auth(&self) -> BasicAuth {
        BasicAuth {
            username: self.username.clone(),
            password: self.token.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Imported,
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

pub struct Importer<'a, H: RemoteHost> {
    host: &'a H,
    session: Session,
    config: SystemConfig,
    root: PathBuf,
}

impl<'a, H: RemoteHost> Importer<'a, H> {
    /// `root` is the directory local repository paths are resolved against.
    pub fn new(host: &'a H, session: Session, config: SystemConfig, root: impl AsRef<Path>) -> Self {
        Self {
            host,
            session,
            config,
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Import every entry of the change list in order, stopping at the
    /// first error.
    pub fn run<R: BufRead>(&self, reader: R) -> Result<ImportSummary> {
        info!("Reading change list");

        let mut summary = ImportSummary::default();
        for entry in ChangeList::new(reader) {
            match self.import_entry(&entry?)? {
                EntryOutcome::Imported => summary.imported += 1,
                EntryOutcome::Skipped => summary.skipped += 1,
            }
        }

        info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Change list complete"
        );
        Ok(summary)
    }

    pub fn import_entry(&self, entry: &ChangeListEntry) -> Result<EntryOutcome> {
        let full_name = entry.full_name();
        info!(
            "PROCESSING: [org: {:?}] [repo: {:?}] [private: {}]",
            entry.org, entry.repo, entry.private
        );

        let repo = LocalRepository::open(&self.config.git_path, self.root.join(entry.local_path()))
            .with_context(|| format!("While opening repository {:?}", full_name))?;

        let branch = repo
            .head_branch()
            .with_context(|| format!("While resolving HEAD of {:?}", full_name))?;
        info!("Found default branch: {}", branch);

        // Usually fails because the org already exists.
        if let Err(e) = self.host.create_org(&entry.org) {
            debug!("Organization {:?} not created: {:#}", entry.org, e);
        }

        if self
            .host
            .get_repo(&entry.org, &entry.repo)
            .with_context(|| format!("While looking up {:?}", full_name))?
            .is_some()
        {
            info!("Repository '{}' already exists; skipping", full_name);
            return Ok(EntryOutcome::Skipped);
        }

        let options = CreateRepoOption {
            name: entry.repo.clone(),
            private: entry.private,
            default_branch: branch.clone(),
        };
        let created = if entry.org == self.session.username {
            self.host.create_repo(&options)
        } else {
            self.host.create_org_repo(&entry.org, &options)
        }
        .with_context(|| format!("While creating repository {:?}", full_name))?;
        debug!("Created {} at {}", full_name, created.clone_url);

        if let Err(e) = repo.delete_remote(IMPORT_REMOTE) {
            debug!("Remote {} not removed: {:#}", IMPORT_REMOTE, e);
        }
        repo.create_remote(IMPORT_REMOTE, &created.clone_url)
            .with_context(|| format!("While creating remote for {:?}", full_name))?;

        repo.push(IMPORT_REMOTE, &branch, &self.session.push_auth())
            .with_context(|| format!("While pushing {:?}", full_name))?;

        info!("Imported {}", full_name);
        Ok(EntryOutcome::Imported)
    }
}
