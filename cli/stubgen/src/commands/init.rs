//! `stubgen init` — project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::{StubgenManifest, MANIFEST_FILE};

/// Create a new stubgen project in directory `name`, relative to cwd.
pub fn run(name: &str) -> Result<()> {
    create_project(Path::new(name), name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir.join("bridges")).context("creating bridges/ directory")?;

    fs::write(project_dir.join(MANIFEST_FILE), StubgenManifest::template(name))
        .context("writing stubgen.toml")?;

    let sample = project_dir.join("bridges").join("libm.bridge.toml");
    fs::write(&sample, SAMPLE_DECLARATION).context("writing bridges/libm.bridge.toml")?;

    fs::write(project_dir.join(".gitignore"), "generated/\n").context("writing .gitignore")?;

    println!("Created project '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/bridges/libm.bridge.toml");
    println!("  {name}/.gitignore");

    Ok(())
}

const SAMPLE_DECLARATION: &str = r#"[library]
name = "libm"
headers = ["math.h"]
link = "-lm"

[[functions]]
name = "sin"
c_signature = "double sin(double x)"
independent = true

[[functions]]
name = "cos"
c_signature = "double cos(double x)"
independent = true
"#;
