//! `stubgen.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stubgen_targets::Platform;

pub const MANIFEST_FILE: &str = "stubgen.toml";

/// The top-level manifest structure for a stubgen project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubgenManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required).
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// Managed package used when a declaration does not name one.
    #[serde(default)]
    pub package: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Target section: which native flavour to generate for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub platform: Platform,
    /// Pointer width of the target in bits (32 or 64).
    #[serde(default = "default_word_bits")]
    pub word_bits: u8,
    /// Class holding generated functions on the JVM.
    #[serde(default)]
    pub jvm_file_class: Option<String>,
}

fn default_word_bits() -> u8 {
    64
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            word_bits: default_word_bits(),
            jvm_file_class: None,
        }
    }
}

/// Output section, relative to the project directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_managed_dir")]
    pub managed_dir: String,
    #[serde(default = "default_native_dir")]
    pub native_dir: String,
}

fn default_managed_dir() -> String {
    "generated/managed".to_string()
}

fn default_native_dir() -> String {
    "generated/native".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            managed_dir: default_managed_dir(),
            native_dir: default_native_dir(),
        }
    }
}

impl StubgenManifest {
    /// Search upward from `start_dir` for a `stubgen.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest = Self::parse(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                tracing::debug!(path = %candidate.display(), "loaded manifest");
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(s).context("parsing stubgen.toml")?;
        stubgen_targets::platform::check_word_bits(manifest.target.word_bits)?;
        Ok(manifest)
    }

    /// Generate the default template for `stubgen init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1.0"

[target]
platform = "native"
word_bits = 64

[output]
managed_dir = "generated/managed"
native_dir = "generated/native"
"#
        )
    }
}
