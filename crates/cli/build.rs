//! Build script for hookline-cli.
//!
//! Embeds build metadata with vergen so `hookline --version` can report
//! the commit it was built from:
//! - Build timestamp
//! - Rustc version
//! - Git commit

use vergen_git2::{Emitter, Git2Builder};

fn main() -> anyhow::Result<()> {
    let build = vergen::BuildBuilder::all_build()?;
    let rustc = vergen::RustcBuilder::all_rustc()?;

    vergen::Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&rustc)?
        .emit()?;

    let git2 = Git2Builder::all_git()?;
    Emitter::default().add_instructions(&git2)?.emit()?;

    Ok(())
}
