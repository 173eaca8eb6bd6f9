//! `stubgen generate` — turn a `.bridge.toml` declaration into stub sources.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use stubgen_bridge::stubs::GenerationReport;
use stubgen_bridge::{generate_stubs, BridgeDeclaration, StubOptions};
use stubgen_targets::Platform;

use crate::manifest::{OutputConfig, StubgenManifest};

/// Where the two generated files were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenStubs {
    pub managed: PathBuf,
    pub native: PathBuf,
}

/// Run `stubgen generate <decl>`.
///
/// Flags take precedence over the manifest; the manifest over built-in defaults.
pub fn run(
    project_dir: &Path,
    manifest: Option<&StubgenManifest>,
    decl_path: &str,
    platform: Option<&str>,
    out_dir: Option<&str>,
    report: Option<&str>,
) -> Result<WrittenStubs> {
    let report_format = report.unwrap_or("human");
    if !matches!(report_format, "human" | "json") {
        bail!("unknown report format '{report_format}' (expected human or json)");
    }

    let path = project_dir.join(decl_path);
    if !path.is_file() {
        bail!("bridge declaration not found: {}", path.display());
    }
    let decl = BridgeDeclaration::load(&path).with_context(|| format!("loading {}", path.display()))?;

    let options = resolve_options(&decl, manifest, platform)?;
    tracing::debug!(?options, declaration = %path.display(), "resolved options");

    let stubs = generate_stubs(&decl, &options)
        .with_context(|| format!("generating stubs for '{}'", decl.library.name))?;

    let (managed_dir, native_dir) = output_dirs(project_dir, manifest, out_dir);
    let written = WrittenStubs {
        managed: managed_dir.join(format!("{}.kt", decl.library.name)),
        native: native_dir.join(format!("{}.c", decl.library.name)),
    };
    write_file(&written.managed, &stubs.managed_source)?;
    write_file(&written.native, &stubs.native_source)?;

    match report_format {
        "json" => {
            let json = serde_json::to_string_pretty(&stubs.report).context("serializing report")?;
            println!("{json}");
        }
        _ => print_human(&stubs.report, &written),
    }

    Ok(written)
}

fn resolve_options(
    decl: &BridgeDeclaration,
    manifest: Option<&StubgenManifest>,
    platform: Option<&str>,
) -> Result<StubOptions> {
    let target = manifest.map(|m| &m.target);
    let platform = match platform {
        Some(name) => Platform::parse(name)?,
        None => target.map(|t| t.platform).unwrap_or_default(),
    };
    let package = decl
        .library
        .package
        .clone()
        .or_else(|| manifest.and_then(|m| m.project.package.clone()));

    Ok(StubOptions {
        platform,
        word_bits: target.map(|t| t.word_bits).unwrap_or(64),
        package,
        jvm_file_class: target.and_then(|t| t.jvm_file_class.clone()),
    })
}

fn output_dirs(
    project_dir: &Path,
    manifest: Option<&StubgenManifest>,
    out_dir: Option<&str>,
) -> (PathBuf, PathBuf) {
    if let Some(dir) = out_dir {
        let dir = project_dir.join(dir);
        return (dir.clone(), dir);
    }
    let default_output = OutputConfig::default();
    let output = manifest.map(|m| &m.output).unwrap_or(&default_output);
    (
        project_dir.join(&output.managed_dir),
        project_dir.join(&output.native_dir),
    )
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}

fn print_human(report: &GenerationReport, written: &WrittenStubs) {
    println!(
        "Generated {} bridge(s) for '{}' ({} platform, package '{}')",
        report.bridges, report.library, report.platform, report.package
    );
    for name in &report.generated {
        println!("  ok    {name}");
    }
    for skipped in &report.skipped {
        println!("  skip  {}: {}", skipped.name, skipped.reason);
    }
    println!("  → {}", written.managed.display());
    println!("  → {}", written.native.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECL: &str = r#"
[library]
name = "libm"
headers = ["math.h"]

[[functions]]
name = "sin"
c_signature = "double sin(double x)"

[[functions]]
name = "printf"
c_signature = "int printf(const char* fmt, ...)"
"#;

    fn project_with_decl() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("libm.bridge.toml"), DECL).unwrap();
        dir
    }

    #[test]
    fn generate_with_defaults() {
        let dir = project_with_decl();
        let written = run(dir.path(), None, "libm.bridge.toml", None, None, None).unwrap();

        assert_eq!(written.managed, dir.path().join("generated/managed/libm.kt"));
        assert_eq!(written.native, dir.path().join("generated/native/libm.c"));
        let managed = std::fs::read_to_string(&written.managed).unwrap();
        assert!(managed.contains("package libm"));
        assert!(managed.contains("fun sin(x: Double): Double = kniBridge0(x)"));
        assert!(!managed.contains("printf"));
        let native = std::fs::read_to_string(&written.native).unwrap();
        assert!(native.contains("double libm_kniBridge0 (double p0) {"));
    }

    #[test]
    fn manifest_settings_apply() {
        let dir = project_with_decl();
        let manifest = StubgenManifest::parse(
            r#"
[project]
name = "bindings"
package = "org.example"

[target]
platform = "jvm"
jvm_file_class = "MathKt"

[output]
managed_dir = "kt"
native_dir = "c"
"#,
        )
        .unwrap();
        let written = run(dir.path(), Some(&manifest), "libm.bridge.toml", None, None, Some("json")).unwrap();

        assert_eq!(written.managed, dir.path().join("kt/libm.kt"));
        let native = std::fs::read_to_string(&written.native).unwrap();
        assert!(native.contains("Java_org_example_MathKt_kniBridge0"));
    }

    #[test]
    fn flags_override_manifest() {
        let dir = project_with_decl();
        let manifest = StubgenManifest::parse("[project]\nname = \"p\"\n\n[target]\nplatform = \"jvm\"\n").unwrap();
        let written = run(
            dir.path(),
            Some(&manifest),
            "libm.bridge.toml",
            Some("native"),
            Some("out"),
            None,
        )
        .unwrap();

        assert_eq!(written.managed, dir.path().join("out/libm.kt"));
        assert_eq!(written.native, dir.path().join("out/libm.c"));
        let native = std::fs::read_to_string(&written.native).unwrap();
        assert!(!native.contains("JNIEXPORT"));
    }

    #[test]
    fn missing_declaration_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), None, "nope.bridge.toml", None, None, None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn unknown_platform_flag_is_an_error() {
        let dir = project_with_decl();
        assert!(run(dir.path(), None, "libm.bridge.toml", Some("wasm"), None, None).is_err());
    }

    #[test]
    fn unknown_report_format_is_an_error() {
        let dir = project_with_decl();
        let err = run(dir.path(), None, "libm.bridge.toml", None, None, Some("xml")).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }
}
