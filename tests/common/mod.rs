#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(output.status.success(), "git {:?} failed", args);
}

/// Create `<root>/<full_name>.git` with one commit on `branch`.
pub fn setup_local_repo(root: &Path, full_name: &str, branch: &str) -> PathBuf {
    let dir = root.join(format!("{}.git", full_name));
    std::fs::create_dir_all(&dir).unwrap();

    git(&dir, &["init", "--initial-branch", branch]);
    git(&dir, &["config", "user.name", "Test User"]);
    git(&dir, &["config", "user.email", "test@example.com"]);
    std::fs::write(dir.join("README.md"), "# Test Repo").unwrap();
    git(&dir, &["add", "README.md"]);
    git(&dir, &["commit", "-m", "Initial commit"]);

    dir
}

pub fn setup_bare_repo(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    git(dir, &["init", "--bare"]);
}

pub fn has_branch(repo: &Path, branch: &str) -> bool {
    StdCommand::new("git")
        .args(["rev-parse", "--verify", &format!("refs/heads/{}", branch)])
        .current_dir(repo)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A mock Gitea API on its own runtime, usable from synchronous tests.
pub struct FakeGitea {
    pub server: MockServer,
    rt: Runtime,
}

impl FakeGitea {
    /// Start a server that answers the version and user endpoints for `login`.
    pub fn start(login: &str) -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        let fake = Self { server, rt };

        fake.mount(
            Mock::given(method("GET"))
                .and(path("/api/v1/version"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "1.21.0"}))),
        );
        fake.mount(
            Mock::given(method("GET"))
                .and(path("/api/v1/user"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"id": 1, "login": login})),
                ),
        );
        fake
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    pub fn respond(&self, verb: &str, route: &str, status: u16, body: serde_json::Value) {
        self.mount(
            Mock::given(method(verb))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status).set_body_json(body)),
        );
    }

    pub fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    /// `(method, path)` of every request that is not part of the startup handshake.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method.to_string(), r.url.path().to_string()))
            .filter(|(_, p)| p != "/api/v1/version" && p != "/api/v1/user")
            .collect()
    }
}

pub fn repository_json(full_name: &str, clone_url: &str) -> serde_json::Value {
    json!({
        "id": 7,
        "full_name": full_name,
        "clone_url": clone_url,
        "private": true,
        "default_branch": "main",
    })
}
