use anyhow::Result;
use calmeet_core::paths::AppPaths;
use calmeet_core::token::FileTokenStore;

use crate::oauth::GoogleOAuth;
use crate::session;

pub async fn run(paths: &AppPaths) -> Result<()> {
    let store = FileTokenStore::new(paths.token_path());
    let flow = GoogleOAuth::new(paths.credentials_path());

    println!("Authorizing calmeet with Google...");

    session::reauthorize(&store, &flow).await?;

    println!("\nAuthorized. Token saved to {}", store.path().display());
    println!("Run `calmeet` to join your next meeting.");

    Ok(())
}
