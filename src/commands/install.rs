//! Install command implementation
//!
//! Installs the repositories of a manifest into an install directory:
//! the manifest is merged into the directory's default manifest, then each
//! repository is cloned or updated, projected and registered with the
//! ansible config.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use manifest_install::installer::{InstallOptions, InstallReport, Installer};
use manifest_install::output::OutputConfig;
use manifest_install::repository::SyncOutcome;

use super::install_dir_or_cwd;

/// Arguments for the install command
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Manifest to install
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Installation directory (defaults to current directory)
    #[arg(long, value_name = "DIR", env = "MANIFEST_INSTALL_DIR")]
    pub manifest_install_dir: Option<PathBuf>,

    /// Default manifest to merge into (defaults to <DIR>/manifest.yml)
    #[arg(long, value_name = "FILE")]
    pub default_manifest: Option<PathBuf>,

    /// Ansible config receiving role paths (defaults to <DIR>/ansible.cfg)
    #[arg(long, value_name = "FILE", env = "ANSIBLE_CONFIG")]
    pub ansible_config: Option<PathBuf>,

    /// Discard local modifications in existing clones
    #[arg(short, long)]
    pub force: bool,

    /// Keep a `~` backup of files before rewriting them
    #[arg(long)]
    pub backup: bool,
}

impl InstallArgs {
    fn into_options(self) -> Result<InstallOptions> {
        let install_dir = install_dir_or_cwd(self.manifest_install_dir)?;
        let mut options = InstallOptions::new(self.manifest, install_dir);
        options.default_manifest_path = self.default_manifest;
        options.ansible_config = self.ansible_config;
        options.force = self.force;
        options.backup = self.backup;
        Ok(options)
    }
}

/// Execute the install command
pub fn execute(args: InstallArgs, out: &OutputConfig) -> Result<()> {
    let options = args.into_options()?;
    out.status(
        "🔍",
        "[SCAN]",
        &format!(
            "Installing {} into {}",
            options.manifest_path.display(),
            options.install_dir.display()
        ),
    );

    match Installer::new(options).run() {
        Ok(report) => {
            print_report(&report, out);
            Ok(())
        }
        Err(e) => {
            out.status("❌", "[ERR]", "Install failed");
            Err(e.into())
        }
    }
}

fn print_report(report: &InstallReport, out: &OutputConfig) {
    if report.manifest_written {
        out.status(
            "📝",
            "[SAVE]",
            &format!(
                "Updated {} ({} added, {} updated)",
                report.default_manifest_path.display(),
                report.added.len(),
                report.updated.len()
            ),
        );
    }

    for repo in &report.repos {
        let (marker, plain, verb) = match repo.outcome {
            SyncOutcome::Cloned => ("📦", "[CLONE]", "Cloned"),
            SyncOutcome::Updated => ("🔄", "[UPDATE]", "Updated"),
        };
        out.status(
            marker,
            plain,
            &format!("{} {} in {}", verb, repo.url, repo.dir.display()),
        );

        let p = &repo.projections;
        if p.links_created + p.links_unchanged + p.copies > 0 {
            out.status(
                "   🔗",
                "   [LINK]",
                &format!(
                    "{} links created, {} unchanged, {} copies",
                    p.links_created, p.links_unchanged, p.copies
                ),
            );
        }
        if !repo.roles_added.is_empty() {
            out.status(
                "   🎭",
                "   [ROLES]",
                &format!("roles_path += {}", repo.roles_added.join(":")),
            );
        }
    }

    out.status(
        "✅",
        "[OK]",
        &format!("Installed {} repositories", report.repos.len()),
    );
}
