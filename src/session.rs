//! Produces a usable access token for this run.
//!
//! A cached token is used as long as it is valid. An expired one is refreshed
//! when possible, otherwise the user goes through the browser flow again.
//! Any newly obtained token is written back to the store.

use anyhow::Result;
use calmeet_core::paths::AppPaths;
use calmeet_core::token::{FileTokenStore, StoredToken, TokenStore};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::oauth::GoogleOAuth;

/// The two ways of getting a new token from the authorization server.
#[allow(async_fn_in_trait)]
pub trait OAuthFlow {
    async fn refresh(&self, token: &StoredToken) -> Result<StoredToken>;
    async fn authorize(&self) -> Result<StoredToken>;
}

pub async fn authorized_token(
    store: &impl TokenStore,
    flow: &impl OAuthFlow,
    now: DateTime<Utc>,
) -> Result<StoredToken> {
    let token = match store.load()? {
        Some(token) if !token.is_expired(now) => {
            debug!("using cached access token");
            return Ok(token);
        }
        Some(token) if token.can_refresh() => {
            info!("access token expired, refreshing");
            flow.refresh(&token).await?
        }
        _ => {
            info!("no usable token, starting authorization");
            flow.authorize().await?
        }
    };

    store.save(&token)?;

    Ok(token)
}

/// Run the browser flow unconditionally and replace whatever was stored.
pub async fn reauthorize(store: &impl TokenStore, flow: &impl OAuthFlow) -> Result<StoredToken> {
    let token = flow.authorize().await?;
    store.save(&token)?;
    Ok(token)
}

pub async fn login(paths: &AppPaths) -> Result<StoredToken> {
    let store = FileTokenStore::new(paths.token_path());
    let flow = GoogleOAuth::new(paths.credentials_path());

    authorized_token(&store, &flow, Utc::now()).await
}
