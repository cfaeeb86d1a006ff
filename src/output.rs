//! # Output Configuration
//!
//! Controls how the CLI reports progress: whether emoji markers are used
//! and whether status lines are printed at all.
//!
//! Color support is decided from the `--color` flag first, then from the
//! environment:
//! - `NO_COLOR` disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` disables colors
//! - `CLICOLOR_FORCE=1` forces colors even when stdout is not a TTY
//! - `TERM=dumb` disables colors
//!
//! ```rust,ignore
//! use manifest_install::output::{OutputConfig, emoji};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! out.status("📦", "[CLONE]", "Cloning tools");
//! ```

use std::env;

/// Output configuration for status lines.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
    /// Suppress status lines. Errors are still reported.
    pub quiet: bool,
}

impl OutputConfig {
    /// Create an output configuration from the environment and the value
    /// of the `--color` flag (`always`, `never` or `auto`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self {
            use_color,
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Format a status line with its marker.
    pub fn format_status(&self, emoji_str: &str, plain: &str, message: &str) -> String {
        format!("{} {}", emoji(self, emoji_str, plain), message)
    }

    /// Print a status line to stdout unless quiet.
    pub fn status(&self, emoji_str: &str, plain: &str, message: &str) {
        if !self.quiet {
            println!("{}", self.format_status(emoji_str, plain, message));
        }
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self {
            use_color: true,
            quiet: false,
        }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self {
            use_color: false,
            quiet: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain marker otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
