//! HTTP implementation of the MediaStore port

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::{
    config::StoreClientConfig,
    error::{StoreError, StoreResult},
    models::{MediaId, MediaItem, ParentRef, ReorderPayload, ReorderRequest},
    store::MediaStore,
    upload::UploadBatch,
};

/// Multipart field carrying the files of an upload
pub const FILES_FIELD: &str = "files";
/// Multipart field carrying the captions of an upload, one per file
pub const CAPTIONS_FIELD: &str = "captions";

/// Error payload returned by the store on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// reqwest-backed client for the photo store
#[derive(Debug, Clone)]
pub struct HttpMediaStore {
    client: Client,
    base_url: String,
}

impl HttpMediaStore {
    /// Create a new store client
    pub fn new(config: &StoreClientConfig) -> StoreResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        info!("Photo store client created for {}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a gallery's photo collection
    pub fn photos_url(&self, parent: &ParentRef) -> String {
        format!("{}/{}/photos", self.base_url, parent)
    }

    /// URL of one photo in a gallery
    pub fn photo_url(&self, parent: &ParentRef, id: MediaId) -> String {
        format!("{}/{}", self.photos_url(parent), id)
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    text
                }
            });

        warn!("Photo store responded with {}: {}", status, message);
        Err(StoreError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn send_ack(&self, request: RequestBuilder) -> StoreResult<()> {
        self.send(request).await.map(|_| ())
    }
}

/// Build the multipart body for an upload batch
///
/// Captions are always sent, one per file, so the store can pair them by
/// position; a missing caption is sent as an empty string.
pub fn upload_form(batch: UploadBatch) -> StoreResult<Form> {
    let mut form = Form::new();

    for (file, caption) in batch.files.into_iter().zip(batch.captions) {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| StoreError::Encode(e.to_string()))?;

        form = form
            .part(FILES_FIELD, part)
            .text(CAPTIONS_FIELD, caption.unwrap_or_default());
    }

    Ok(form)
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn list(&self, parent: &ParentRef) -> StoreResult<Vec<MediaItem>> {
        debug!("Listing photos of {}", parent);
        self.send_json(self.client.get(self.photos_url(parent)))
            .await
    }

    async fn upload(&self, parent: &ParentRef, batch: UploadBatch) -> StoreResult<Vec<MediaItem>> {
        debug!("Uploading {} photos to {}", batch.len(), parent);
        let form = upload_form(batch)?;
        self.send_json(self.client.post(self.photos_url(parent)).multipart(form))
            .await
    }

    async fn mark_main(&self, parent: &ParentRef, id: MediaId) -> StoreResult<()> {
        debug!("Marking photo {} of {} as main", id, parent);
        let url = format!("{}/main", self.photo_url(parent, id));
        self.send_ack(self.client.patch(url)).await
    }

    async fn reorder(&self, parent: &ParentRef, request: ReorderRequest) -> StoreResult<()> {
        debug!("Reordering {} photos of {}", request.ids.len(), parent);
        let url = format!("{}/reorder", self.photos_url(parent));
        let payload = ReorderPayload::from(request);
        self.send_ack(self.client.patch(url).json(&payload)).await
    }

    async fn delete(&self, parent: &ParentRef, id: MediaId) -> StoreResult<()> {
        debug!("Deleting photo {} of {}", id, parent);
        self.send_ack(self.client.delete(self.photo_url(parent, id)))
            .await
    }
}
