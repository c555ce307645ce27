use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// target/<profile> directory the binary is placed in.
/// OUT_DIR is typically target/<profile>/build/garage-backend-xxx/out
fn profile_dir() -> Option<PathBuf> {
    let out_dir = env::var("OUT_DIR").ok()?;
    let profile = env::var("PROFILE").ok()?;
    Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}

fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let source_config = workspace_root.join("config.toml");

    let Some(target_dir) = profile_dir() else {
        println!("cargo:warning=target profile directory not found, config.toml not copied");
        return;
    };

    if !source_config.exists() {
        println!(
            "cargo:warning=config.toml not found at {:?}, the embedded default is used",
            source_config
        );
        return;
    }

    // config.toml next to the executable
    let dest_config = target_dir.join("config.toml");
    match fs::copy(&source_config, &dest_config) {
        Ok(_) => println!("cargo:warning=Copied config.toml to {:?}", dest_config),
        Err(e) => println!("cargo:warning=Failed to copy config.toml: {}", e),
    }
}
