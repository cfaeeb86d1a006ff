//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest(manifests::EMPTY);
//!     fixture.install().assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git_available;
    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// No repositories.
    pub const EMPTY: &str = "repos: []\n";

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "repos: [unclosed\n";

    /// An entry without a url.
    pub const MISSING_URL: &str = r#"
repos:
  - dest: tools
"#;

    /// An unknown top-level field.
    pub const UNKNOWN_FIELD: &str = r#"
repos: []
clone_directory: repos
"#;
}

/// Check whether the `git` binary can be run.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A temporary directory holding a manifest, an install directory and any
/// local origin repositories a test creates.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `site.yml` with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.temp_dir
            .child("site.yml")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Create a git repository named `name` with one commit on `master`
    /// holding `files`. Returns its path, usable as a clone URL.
    #[allow(dead_code)]
    pub fn origin(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.path().join("origins").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create origin");
        git(&dir, &["init", "--quiet"]);
        git(&dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        self.commit(&dir, files, "initial");
        dir
    }

    /// Commit `files` to an origin created with [`TestFixture::origin`].
    #[allow(dead_code)]
    pub fn commit(&self, origin: &Path, files: &[(&str, &str)], message: &str) {
        for (path, content) in files {
            let file = origin.join(path);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create directory");
            }
            std::fs::write(&file, content).expect("Failed to write file");
        }
        git(origin, &["add", "--all"]);
        git(origin, &["commit", "--quiet", "-m", message]);
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path().join("site.yml")
    }

    pub fn install_dir(&self) -> PathBuf {
        self.path().join("install")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory, isolated from
    /// the caller's environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("manifest-install");
        cmd.current_dir(self.path())
            .env_remove("MANIFEST_INSTALL_DIR")
            .env_remove("ANSIBLE_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// `install site.yml --manifest-install-dir install`
    #[allow(dead_code)]
    pub fn install(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("install")
            .arg(self.manifest_path())
            .arg("--manifest-install-dir")
            .arg(self.install_dir());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_manifest() {
        let fixture = TestFixture::new().with_manifest(manifests::EMPTY);
        assert!(fixture.manifest_path().exists());
    }

    #[test]
    fn test_manifests_yaml_validity() {
        for manifest in [manifests::EMPTY, manifests::MISSING_URL, manifests::UNKNOWN_FIELD] {
            serde_yaml::from_str::<serde_yaml::Value>(manifest).expect("Manifest should be valid YAML");
        }
        assert!(serde_yaml::from_str::<serde_yaml::Value>(manifests::INVALID_YAML).is_err());
    }
}
