use anyhow::{Context, Result};
use calmeet_core::paths::AppPaths;
use calmeet_core::token::FileTokenStore;
use owo_colors::OwoColorize;

pub fn run(paths: &AppPaths) -> Result<()> {
    let store = FileTokenStore::new(paths.token_path());

    let removed = store
        .clear()
        .with_context(|| format!("Failed to remove {}", store.path().display()))?;

    if removed {
        println!("Removed token at {}", store.path().display());
    } else {
        println!("{}", "No saved token, nothing to do.".dimmed());
    }

    Ok(())
}
