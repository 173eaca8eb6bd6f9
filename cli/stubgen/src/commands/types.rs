//! `stubgen types` — print the bridged type catalog.

use anyhow::Result;
use stubgen_bridge::bridged::representation_for;
use stubgen_bridge::BridgedType;
use stubgen_targets::Platform;

/// Print every bridged type with its spelling on both sides.
pub fn run(platform: Platform) -> Result<()> {
    println!("Bridged types for '{platform}' ({}):", platform.describe());
    println!();
    for line in table(platform) {
        println!("  {line}");
    }
    Ok(())
}

fn table(platform: Platform) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<14} {:<28} {:<10} {}",
        "TYPE", "MANAGED", "NATIVE", "CONVERSION"
    )];
    for ty in BridgedType::ALL {
        let rep = representation_for(ty, platform);
        lines.push(format!(
            "{:<14} {:<28} {:<10} {}",
            ty.name(),
            rep.managed,
            rep.native,
            rep.conversion.unwrap_or("-")
        ));
    }
    lines
}
