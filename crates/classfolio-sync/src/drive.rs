//! Access to Drive files.
//!
//! The pipeline talks to Drive through [`DriveSource`] so tests can run it
//! against an in-memory store. [`HttpDriveClient`] is the REST implementation.

use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;

use crate::config::PipelineConfig;
use crate::error::{SyncError, SyncResult};
use crate::model::DriveFileMetadata;

/// Read access to Drive files.
pub trait DriveSource: Send + Sync {
    /// Name, MIME type and modification time of a file.
    fn metadata<'a>(&'a self, file_id: &'a str) -> BoxFuture<'a, SyncResult<DriveFileMetadata>>;

    /// Raw bytes of a stored file.
    fn download<'a>(&'a self, file_id: &'a str) -> BoxFuture<'a, SyncResult<Vec<u8>>>;

    /// A Google editor document converted to `mime_type`.
    fn export<'a>(
        &'a self,
        file_id: &'a str,
        mime_type: &'a str,
    ) -> BoxFuture<'a, SyncResult<Vec<u8>>>;
}

/// Drive v3 REST client authenticated with an OAuth access token.
#[derive(Debug, Clone)]
pub struct HttpDriveClient {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl HttpDriveClient {
    /// # Errors
    ///
    /// Returns `SyncError::Http` if the HTTP client cannot be built.
    pub fn new(config: &PipelineConfig, access_token: impl Into<String>) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.api_base, file_id)
    }

    async fn get_bytes(&self, url: String, query: &[(&str, &str)]) -> SyncResult<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound(url));
        }
        if !status.is_success() {
            return Err(SyncError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl DriveSource for HttpDriveClient {
    fn metadata<'a>(&'a self, file_id: &'a str) -> BoxFuture<'a, SyncResult<DriveFileMetadata>> {
        async move {
            let body = self
                .get_bytes(
                    self.file_url(file_id),
                    &[("fields", "id,name,mimeType,modifiedTime")],
                )
                .await?;
            Ok(serde_json::from_slice(&body)?)
        }
        .boxed()
    }

    fn download<'a>(&'a self, file_id: &'a str) -> BoxFuture<'a, SyncResult<Vec<u8>>> {
        self.get_bytes(self.file_url(file_id), &[("alt", "media")])
            .boxed()
    }

    fn export<'a>(
        &'a self,
        file_id: &'a str,
        mime_type: &'a str,
    ) -> BoxFuture<'a, SyncResult<Vec<u8>>> {
        async move {
            let url = format!("{}/export", self.file_url(file_id));
            self.get_bytes(url, &[("mimeType", mime_type)]).await
        }
        .boxed()
    }
}
