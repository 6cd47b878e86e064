//! Google OAuth for installed apps: browser consent with a loopback redirect.

use std::path::PathBuf;

use anyhow::{Context, Result};
use calmeet_core::credentials::ClientCredentials;
use calmeet_core::token::StoredToken;
use chrono::Utc;
use google_calendar::Client;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use crate::session::OAuthFlow;

pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.readonly"];

/// Any free port; Google accepts arbitrary loopback ports for desktop clients.
const CALLBACK_ADDRESS: &str = "127.0.0.1:0";
const CALLBACK_PATH: &str = "/callback";

const SUCCESS_PAGE: &str = "HTTP/1.1 200 OK\r\n\
    Content-Type: text/html\r\n\
    Connection: close\r\n\
    \r\n\
    <html><body>\
    <h1>calmeet is authorized</h1>\
    <p>You can close this window and return to the terminal.</p>\
    </body></html>";

const FAILURE_PAGE: &str = "HTTP/1.1 400 Bad Request\r\n\
    Content-Type: text/html\r\n\
    Connection: close\r\n\
    \r\n\
    <html><body>\
    <h1>calmeet was not authorized</h1>\
    <p>Check the terminal for details.</p>\
    </body></html>";

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n";

pub struct GoogleOAuth {
    credentials_path: PathBuf,
}

impl GoogleOAuth {
    pub fn new(credentials_path: PathBuf) -> Self {
        GoogleOAuth { credentials_path }
    }

    // Loaded lazily: a still-valid cached token needs no client credentials.
    fn credentials(&self) -> Result<ClientCredentials> {
        Ok(ClientCredentials::load(&self.credentials_path)?)
    }
}

impl OAuthFlow for GoogleOAuth {
    async fn refresh(&self, token: &StoredToken) -> Result<StoredToken> {
        let creds = self.credentials()?;

        let client = Client::new(
            creds.client_id,
            creds.client_secret,
            String::new(),
            token.access_token.clone(),
            token.refresh_token.clone().unwrap_or_default(),
        );

        let access_token = client
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        let fresh = StoredToken::from_grant(
            access_token.access_token,
            access_token.refresh_token,
            access_token.expires_in,
            Utc::now(),
        );

        Ok(token.refreshed(fresh))
    }

    async fn authorize(&self) -> Result<StoredToken> {
        let creds = self.credentials()?;

        let listener = TcpListener::bind(CALLBACK_ADDRESS)
            .await
            .context("Failed to bind OAuth callback listener")?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://127.0.0.1:{}{}", port, CALLBACK_PATH);

        let mut client = Client::new(
            creds.client_id,
            creds.client_secret,
            redirect_uri,
            String::new(),
            String::new(),
        );

        let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();
        let auth_url = client.user_consent_url(&scopes);

        println!("\nOpen this URL in your browser to authorize calmeet:\n");
        println!("{}\n", auth_url);

        if open::that(&auth_url).is_err() {
            println!(
                "{}",
                "(Could not open browser automatically, please copy the URL above)".dimmed()
            );
        }

        let (code, state) = wait_for_callback(&listener).await?;

        println!("Received authorization code, exchanging for tokens...");

        let access_token = client
            .get_access_token(&code, &state)
            .await
            .context("Failed to exchange code for tokens")?;

        Ok(StoredToken::from_grant(
            access_token.access_token,
            access_token.refresh_token,
            access_token.expires_in,
            Utc::now(),
        ))
    }
}

/// Accept connections until the browser hits the callback path.
/// Returns (code, state).
async fn wait_for_callback(listener: &TcpListener) -> Result<(String, String)> {
    loop {
        let (stream, _) = listener
            .accept()
            .await
            .context("Failed to accept OAuth callback")?;

        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .await
            .context("Failed to read OAuth callback request line")?;

        let mut stream = reader.into_inner();

        let Some(target) = request_target(&request_line) else {
            respond(&mut stream, NOT_FOUND).await?;
            continue;
        };

        if !target.starts_with(CALLBACK_PATH) {
            debug!(request = target, "ignoring request outside the callback path");
            respond(&mut stream, NOT_FOUND).await?;
            continue;
        }

        let params = parse_callback(target);
        let page = if params.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };
        respond(&mut stream, page).await?;
        return params;
    }
}

async fn respond(stream: &mut TcpStream, response: &str) -> Result<()> {
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;
    Ok(())
}

/// Request line looks like: GET /callback?code=xxx&state=yyy HTTP/1.1
fn request_target(request_line: &str) -> Option<&str> {
    request_line.split_whitespace().nth(1)
}

fn parse_callback(target: &str) -> Result<(String, String)> {
    let url = url::Url::parse(&format!("http://localhost{}", target))
        .with_context(|| format!("Invalid callback target: {}", target))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        anyhow::bail!("Authorization was denied: {}", error);
    }

    let code = param("code").context("No code in callback")?;
    let state = param("state").context("No state in callback")?;

    Ok((code, state))
}
