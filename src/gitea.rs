//! Gitea hosting-service client.
//!
//! [`RemoteHost`] is the surface the importer needs from a hosting service.
//! [`GiteaClient`] implements it against the Gitea REST API v1 with a
//! blocking HTTP client; requests are issued one at a time.

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ImportError;

/// The authenticated account.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

/// Parameters for repository creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRepoOption {
    pub name: String,
    pub private: bool,
    pub default_branch: String,
}

/// The subset of a Gitea repository the importer reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub full_name: String,
    pub clone_url: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: String,
}

#[derive(Debug, Serialize)]
struct CreateOrgOption<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
struct ServerVersion {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Operations the importer performs against the hosting service.
pub trait RemoteHost {
    /// The identity the API token belongs to.
    fn current_user(&self) -> Result<User>;

    /// Create an organization. Callers treat failure as "already exists".
    fn create_org(&self, name: &str) -> Result<()>;

    /// Look up `owner/repo`, returning `None` when it does not exist.
    fn get_repo(&self, owner: &str, repo: &str) -> Result<Option<Repository>>;

    /// Create a repository owned by the authenticated user.
    fn create_repo(&self, options: &CreateRepoOption) -> Result<Repository>;

    /// Create a repository owned by `org`.
    fn create_org_repo(&self, org: &str, options: &CreateRepoOption) -> Result<Repository>;
}

pub struct GiteaClient {
    http: Client,
    api_url: Url,
}

impl GiteaClient {
    /// Build a client for the instance at `base_url` and check that it
    /// answers the version endpoint.
    pub fn connect(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .context("API token contains characters not allowed in a header")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(concat!("gitea-import/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        let base = Url::parse(base_url).with_context(|| format!("Invalid Gitea URL {}", base_url))?;
        let client = Self {
            http,
            api_url: join_segments(base, &["api", "v1"])?,
        };

        let resp = client
            .http
            .get(client.url(&["version"])?)
            .send()
            .with_context(|| format!("Failed to reach Gitea at {}", base_url))?;
        let version: ServerVersion = check(resp)?
            .json()
            .context("Failed to parse Gitea version response")?;
        debug!(version = %version.version, "connected to Gitea");

        Ok(client)
    }

    /// Endpoint below the API root; each segment is percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(self.api_url.clone(), segments)
    }

    fn post_repo(&self, segments: &[&str], options: &CreateRepoOption) -> Result<Repository> {
        let resp = self
            .http
            .post(self.url(segments)?)
            .json(options)
            .send()
            .context("Gitea API request failed")?;

        check(resp)?
            .json()
            .context("Failed to parse Gitea repository response")
    }
}

impl RemoteHost for GiteaClient {
    fn current_user(&self) -> Result<User> {
        let resp = self
            .http
            .get(self.url(&["user"])?)
            .send()
            .context("Gitea API request failed")?;

        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(ImportError::Authentication {
                message: error_message(resp),
            }
            .into());
        }

        check(resp)?
            .json()
            .context("Failed to parse Gitea user response")
    }

    fn create_org(&self, name: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url(&["orgs"])?)
            .json(&CreateOrgOption { username: name })
            .send()
            .context("Gitea API request failed")?;

        check(resp)?;
        Ok(())
    }

    fn get_repo(&self, owner: &str, repo: &str) -> Result<Option<Repository>> {
        let resp = self
            .http
            .get(self.url(&["repos", owner, repo])?)
            .send()
            .context("Gitea API request failed")?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let repository = check(resp)?
            .json()
            .context("Failed to parse Gitea repository response")?;
        Ok(Some(repository))
    }

    fn create_repo(&self, options: &CreateRepoOption) -> Result<Repository> {
        self.post_repo(&["user", "repos"], options)
    }

    fn create_org_repo(&self, org: &str, options: &CreateRepoOption) -> Result<Repository> {
        self.post_repo(&["orgs", org, "repos"], options)
    }
}

fn join_segments(mut url: Url, segments: &[&str]) -> Result<Url> {
    if url.cannot_be_a_base() {
        bail!("Gitea URL {} cannot have a path", url);
    }
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

/// Pass successful responses through, turn the rest into [`ImportError::Api`].
fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    Err(ImportError::Api {
        status: status.as_u16(),
        message: error_message(resp),
    }
    .into())
}

fn error_message(resp: Response) -> String {
    let status = resp.status();
    let body = resp.text().unwrap_or_default();

    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) if !parsed.message.is_empty() => parsed.message,
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        _ => body.trim().to_string(),
    }
}
