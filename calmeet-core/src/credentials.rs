//! Google OAuth client credentials (user-provided).
//!
//! Accepts the JSON file offered for download in the Google Cloud console,
//! which nests the fields under "installed" (desktop apps) or "web", as well
//! as a flat object with just `client_id` and `client_secret`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CalmeetError, CalmeetResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Installed { installed: ClientCredentials },
    Web { web: ClientCredentials },
    Flat(ClientCredentials),
}

impl ClientCredentials {
    pub fn load(path: &Path) -> CalmeetResult<Self> {
        if !path.exists() {
            return Err(CalmeetError::CredentialsNotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|reason| CalmeetError::InvalidCredentials {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(contents: &str) -> Result<Self, String> {
        let file: CredentialsFile = serde_json::from_str(contents)
            .map_err(|_| "expected client_id and client_secret".to_string())?;

        let creds = match file {
            CredentialsFile::Installed { installed } => installed,
            CredentialsFile::Web { web } => web,
            CredentialsFile::Flat(creds) => creds,
        };

        if creds.client_id.is_empty() {
            return Err("client_id is empty".to_string());
        }

        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_installed_app_download() {
        let json = r#"{
            "installed": {
                "client_id": "123.apps.googleusercontent.com",
                "project_id": "calmeet",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "client_secret": "shh",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let creds = ClientCredentials::parse(json).unwrap();

        assert_eq!(creds.client_id, "123.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "shh");
    }

    #[test]
    fn parses_web_app_download() {
        let json = r#"{"web": {"client_id": "web-id", "client_secret": "web-secret"}}"#;

        let creds = ClientCredentials::parse(json).unwrap();

        assert_eq!(creds.client_id, "web-id");
    }

    #[test]
    fn parses_flat_object() {
        let json = r#"{"client_id": "flat-id", "client_secret": "flat-secret"}"#;

        let creds = ClientCredentials::parse(json).unwrap();

        assert_eq!(creds.client_secret, "flat-secret");
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(ClientCredentials::parse(r#"{"installed": {"client_id": "x"}}"#).is_err());
        assert!(ClientCredentials::parse("not json").is_err());
    }

    #[test]
    fn rejects_empty_client_id() {
        let json = r#"{"client_id": "", "client_secret": "s"}"#;

        assert_eq!(
            ClientCredentials::parse(json).unwrap_err(),
            "client_id is empty"
        );
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        match ClientCredentials::load(&path) {
            Err(CalmeetError::CredentialsNotFound(p)) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
