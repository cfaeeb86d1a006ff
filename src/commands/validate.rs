//! # Validate Command Implementation
//!
//! Parses a manifest and reports what it declares without cloning,
//! linking or writing anything:
//!
//! - **Schema validation**: the document must be a mapping with a `repos`
//!   list whose entries carry a string `url` and the known fields only.
//! - **Duplicate URLs**: reported as warnings, since the later entry wins
//!   when the manifest is merged.
//! - **Projection fields**: symlink and copy entries missing `repo_src` or
//!   `proj_dest` are reported as errors.

use anyhow::Result;
use clap::Args;
use std::collections::HashSet;
use std::path::PathBuf;

use manifest_install::manifest::{LinkSpec, Manifest};
use manifest_install::output::OutputConfig;

/// Validate a manifest file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifest to validate
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Fail on warnings as well as errors
    #[arg(long)]
    pub strict: bool,
}

/// Findings for one manifest.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a parsed manifest for problems the schema cannot express.
pub fn check(manifest: &Manifest) -> Findings {
    let mut findings = Findings::default();
    let mut seen = HashSet::new();

    for (index, entry) in manifest.repos.iter().enumerate() {
        if !seen.insert(entry.url.as_str()) {
            findings.warnings.push(format!(
                "repos[{}]: duplicate url {}, the last entry wins",
                index,
                entry.display_url()
            ));
        }
        if entry.dest.trim().is_empty() {
            findings
                .errors
                .push(format!("repos[{}].dest: must not be empty", index));
        }
        check_specs(&mut findings, index, "symlink", &entry.symlink);
        check_specs(&mut findings, index, "copy", &entry.copy);
    }

    findings
}

fn check_specs(findings: &mut Findings, index: usize, kind: &str, specs: &[LinkSpec]) {
    for (position, spec) in specs.iter().enumerate() {
        for (field, value) in [("repo_src", &spec.repo_src), ("proj_dest", &spec.proj_dest)] {
            if value.is_none() {
                findings.errors.push(format!(
                    "repos[{}].{}[{}]: missing {}",
                    index, kind, position, field
                ));
            }
        }
    }
}

fn detail(out: &OutputConfig, line: &str) {
    if !out.quiet {
        println!("   {}", line);
    }
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, out: &OutputConfig) -> Result<()> {
    out.status(
        "🔍",
        "[SCAN]",
        &format!("Validating manifest: {}", args.manifest.display()),
    );

    let manifest = match Manifest::from_file(&args.manifest) {
        Ok(manifest) => manifest,
        Err(e) => {
            out.status("❌", "[ERR]", &e.to_string());
            return Err(e.into());
        }
    };

    out.status("📊", "[INFO]", "Manifest summary:");
    if let Some(clone_dir) = &manifest.clone_dir {
        detail(out, &format!("clone_dir: {}", clone_dir));
    }
    for entry in &manifest.repos {
        detail(
            out,
            &format!(
                "{} -> {} ({}): {} symlinks, {} copies, {} role paths",
                entry.display_url(),
                entry.dest,
                entry.branch,
                entry.symlink.len(),
                entry.copy.len(),
                entry.roles_paths().len()
            ),
        );
    }

    let findings = check(&manifest);
    for warning in &findings.warnings {
        out.status("⚠️", "[WARN]", warning);
    }
    for error in &findings.errors {
        out.status("❌", "[ERR]", error);
    }

    if !findings.errors.is_empty() {
        anyhow::bail!(
            "Manifest {} has {} errors",
            args.manifest.display(),
            findings.errors.len()
        );
    }
    if args.strict && !findings.warnings.is_empty() {
        anyhow::bail!(
            "Manifest {} has {} warnings (strict mode)",
            args.manifest.display(),
            findings.warnings.len()
        );
    }

    out.status(
        "✅",
        "[OK]",
        &format!("{} repositories declared", manifest.repos.len()),
    );
    Ok(())
}
