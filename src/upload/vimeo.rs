use super::MediaUploader;
use crate::config::Config;
use crate::error::{ArchiveError, ArchiveResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Body, Client};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

const VIMEO_ACCEPT: &str = "application/vnd.vimeo.*+json;version=3.4";
const TUS_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
struct CreateVideoRequest<'a> {
    upload: UploadApproach,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct UploadApproach {
    approach: &'static str,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct CreateVideoResponse {
    uri: String,
    upload: UploadTicket,
}

#[derive(Debug, Deserialize)]
struct UploadTicket {
    upload_link: String,
}

/// Uploads videos through Vimeo's tus resumable upload endpoint.
pub struct VimeoUploader {
    client: Client,
    api_base: String,
    token: String,
}

impl VimeoUploader {
    pub fn new(config: &Config) -> Result<Self> {
        let token = config.require_vimeo_token()?.to_string();
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        let api_base = config.vimeo.api_base.trim_end_matches('/').to_string();
        info!("Initialized Vimeo uploader with endpoint: {}", api_base);
        Ok(Self {
            client,
            api_base,
            token,
        })
    }

    async fn create_video(&self, size: u64, name: Option<&str>) -> ArchiveResult<CreateVideoResponse> {
        let url = format!("{}/me/videos", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, VIMEO_ACCEPT)
            .json(&CreateVideoRequest {
                upload: UploadApproach {
                    approach: "tus",
                    size,
                },
                name,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status { status, url });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_file(&self, upload_link: &str, path: &Path) -> ArchiveResult<()> {
        let file = fs::File::open(path).await?;
        let body = Body::wrap_stream(ReaderStream::new(file));
        let response = self
            .client
            .patch(upload_link)
            .header("Tus-Resumable", TUS_VERSION)
            .header("Upload-Offset", "0")
            .header(reqwest::header::CONTENT_TYPE, "application/offset+octet-stream")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status {
                status,
                url: upload_link.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MediaUploader for VimeoUploader {
    fn name(&self) -> &'static str {
        "Vimeo"
    }

    async fn upload(&self, path: &Path, display_name: Option<&str>) -> ArchiveResult<String> {
        let size = fs::metadata(path).await?.len();
        let video = self.create_video(size, display_name).await?;
        debug!("Created Vimeo video {} for {}", video.uri, path.display());
        self.send_file(&video.upload.upload_link, path).await?;
        Ok(video.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn uploader(server: &MockServer) -> VimeoUploader {
        let mut config = Config::default();
        config.vimeo.token = "vimeo-token".to_string();
        config.vimeo.api_base = server.uri();
        VimeoUploader::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_creates_video_then_sends_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/videos"))
            .and(header("authorization", "Bearer vimeo-token"))
            .and(body_partial_json(json!({
                "upload": {"approach": "tus", "size": 5},
                "name": "Class"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "uri": "/videos/42",
                "upload": {"upload_link": format!("{}/tus/42", server.uri())}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/tus/42"))
            .and(header("tus-resumable", TUS_VERSION))
            .and(header("upload-offset", "0"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("class.mp4");
        std::fs::write(&file, b"video").unwrap();

        let uri = uploader(&server).upload(&file, Some("Class")).await.unwrap();
        assert_eq!(uri, "/videos/42");
    }

    #[tokio::test]
    async fn test_rejected_creation_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/videos"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("class.mp4");
        std::fs::write(&file, b"video").unwrap();

        let err = uploader(&server).upload(&file, None).await.unwrap_err();
        assert!(matches!(err, ArchiveError::Status { status, .. } if status.as_u16() == 401));
    }
}
