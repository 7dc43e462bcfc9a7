//! Thin client for the parts of the Zoom REST API the archiver needs.

use crate::config::Config;
use crate::error::{ArchiveError, ArchiveResult};
use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

pub mod catalog;
pub mod directory;
pub mod models;
pub mod selector;

pub use catalog::{date_windows, DateRange, RecordingCatalog};
pub use directory::{AccountListing, UserDirectory};
pub use models::{Account, FileType, RecordingEntry, RecordingFile};
pub use selector::{select_files, Selection};

pub struct ZoomClient {
    client: Client,
    api_base: String,
    token: String,
}

impl ZoomClient {
    pub fn new(config: &Config) -> Result<Self> {
        let token = config.require_zoom_token()?.to_string();
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_base: config.zoom.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Authenticated GET without status handling.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ArchiveResult<Response> {
        let url = self.endpoint(path);
        debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        Ok(response)
    }

    /// Authenticated GET that requires a success status and a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ArchiveResult<T> {
        let response = self.get(path, query).await?;
        parse_json(response).await
    }

    /// Pre-signed download URLs still need the API token as a query parameter.
    pub fn authorized_download_url(&self, raw: &str) -> ArchiveResult<Url> {
        let mut url = Url::parse(raw).map_err(|err| ArchiveError::InvalidUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        url.query_pairs_mut().append_pair("access_token", &self.token);
        Ok(url)
    }

    /// Move a meeting's cloud recordings to the trash. Returns the response
    /// status without judging it.
    pub async fn delete_meeting_recordings(&self, meeting_uuid: &str) -> ArchiveResult<StatusCode> {
        let url = self.endpoint(&delete_recordings_path(meeting_uuid));
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(response.status())
    }
}

/// UUIDs that start with `/` or contain `//` must be encoded twice.
pub fn delete_recordings_path(meeting_uuid: &str) -> String {
    let once = urlencoding::encode(meeting_uuid);
    let twice = urlencoding::encode(&once);
    format!("/meetings/{}/recordings", twice)
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> ArchiveResult<T> {
    let status = response.status();
    let url = response.url().to_string();
    if !status.is_success() {
        return Err(ArchiveError::Status { status, url });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ZoomClient {
        let mut config = Config::default();
        config.zoom.token = "secret".to_string();
        config.zoom.api_base = "https://api.example.com/v2/".to_string();
        ZoomClient::new(&config).unwrap()
    }

    #[test]
    fn test_delete_path_double_encodes_uuid() {
        assert_eq!(
            delete_recordings_path("/ab+c=="),
            "/meetings/%252Fab%252Bc%253D%253D/recordings"
        );
        assert_eq!(delete_recordings_path("plain"), "/meetings/plain/recordings");
    }

    #[test]
    fn test_download_url_carries_token() {
        let zoom = client();
        let url = zoom
            .authorized_download_url("https://zoom.us/rec/download/abc?type=mp4")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://zoom.us/rec/download/abc?type=mp4&access_token=secret"
        );
    }

    #[test]
    fn test_invalid_download_url() {
        let zoom = client();
        assert!(matches!(
            zoom.authorized_download_url("not a url"),
            Err(ArchiveError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_client_requires_token() {
        assert!(ZoomClient::new(&Config::default()).is_err());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        assert_eq!(client().endpoint("/users"), "https://api.example.com/v2/users");
    }
}
