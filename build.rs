use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// Fonts (and anything else under /assets/) travel next to the build output so
// the demos can resolve `./assets/fonts/...` at runtime.
fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets/*");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    if !manifest_dir.join("assets").exists() {
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&["assets/"], out_dir, &copy_options)?;

    Ok(())
}
