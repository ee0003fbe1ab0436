//! HTTP client for the remote matching service.
//!
//! Endpoints, relative to the configured API base:
//! - `POST /match?mode=&threshold=` multipart (`pdfFile`, `excelFile`)
//! - `GET /records`
//! - `POST /clear-records`

mod upload;

pub use upload::{mime_for, UploadFile};

use futures::StreamExt;
use gazette_matcher_common::{
    Error, MatchResponse, Record, RemoteErrorBody, Result, SubmissionParameters, TransferEvent,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Size of the chunks the multipart body is streamed in.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Operations the controller needs from the service.
#[allow(async_fn_in_trait)]
pub trait MatchService {
    /// Upload both files. Transfer events are sent as bytes move.
    async fn submit_match(
        &self,
        pdf: &UploadFile,
        excel: &UploadFile,
        params: &SubmissionParameters,
        events: UnboundedSender<TransferEvent>,
    ) -> Result<MatchResponse>;

    async fn fetch_records(&self) -> Result<Vec<Record>>;

    async fn clear_records(&self) -> Result<()>;
}

/// reqwest implementation of [`MatchService`].
pub struct HttpMatchClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpMatchClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    /// `timeout` bounds every request made by this client.
    pub fn new(base_url: &str, timeout: Duration) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Classify a reqwest failure; the client-wide deadline maps to `Timeout`.
    fn transport(&self, err: reqwest::Error) -> Error {
        debug!(error = %err, timeout = err.is_timeout(), "transport failure");
        if err.is_timeout() {
            Error::Timeout(self.timeout.as_secs())
        } else {
            Error::Network(err.to_string())
        }
    }

    async fn ensure_success(&self, resp: Response) -> Result<Vec<u8>> {
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| self.transport(e))?.to_vec();
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: RemoteErrorBody::message_from(&body),
            });
        }
        Ok(body)
    }

    /// Read the whole body, reporting download progress against Content-Length.
    async fn read_counted(&self, resp: Response, events: &UnboundedSender<TransferEvent>) -> Result<Vec<u8>> {
        let total = resp.content_length();
        let mut body = Vec::with_capacity(total.unwrap_or(0) as usize);
        let mut stream = resp.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.transport(e))?;
            body.extend_from_slice(&chunk);
            let _ = events.send(TransferEvent::download(body.len() as u64, total));
        }
        debug!(bytes = body.len(), total = ?total, "response received");
        Ok(body)
    }
}

impl MatchService for HttpMatchClient {
    async fn submit_match(
        &self,
        pdf: &UploadFile,
        excel: &UploadFile,
        params: &SubmissionParameters,
        events: UnboundedSender<TransferEvent>,
    ) -> Result<MatchResponse> {
        let url = self.url("match");
        let total = pdf.len() + excel.len();
        let sent = Arc::new(AtomicU64::new(0));

        let form = Form::new()
            .part("pdfFile", counted_part(pdf, sent.clone(), total, events.clone())?)
            .part("excelFile", counted_part(excel, sent, total, events.clone())?);

        info!(url = %url, mode = %params.mode, threshold = %params.threshold, bytes = total, "submitting files");
        let resp = self
            .client
            .post(&url)
            .query(&params.query_pairs())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = resp.status();
        let body = self.read_counted(resp, &events).await?;
        if !status.is_success() {
            let message = RemoteErrorBody::message_from(&body);
            warn!(status = status.as_u16(), message = ?message, "match request rejected");
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let response: MatchResponse = serde_json::from_slice(&body)?;
        info!(rows = response.matched_rows.len(), "match complete");
        Ok(response)
    }

    async fn fetch_records(&self) -> Result<Vec<Record>> {
        let url = self.url("records");
        info!(url = %url, "fetching records");

        let resp = self.client.get(&url).send().await.map_err(|e| self.transport(e))?;
        let body = self.ensure_success(resp).await?;
        let records: Option<Vec<Record>> = serde_json::from_slice(&body)?;
        let records = records.unwrap_or_default();
        info!(count = records.len(), "fetched records");
        Ok(records)
    }

    async fn clear_records(&self) -> Result<()> {
        let url = self.url("clear-records");
        info!(url = %url, "clearing records");

        let resp = self.client.post(&url).send().await.map_err(|e| self.transport(e))?;
        self.ensure_success(resp).await?;
        Ok(())
    }
}

/// Multipart part whose body reports cumulative upload progress.
fn counted_part(
    file: &UploadFile,
    sent: Arc<AtomicU64>,
    total: u64,
    events: UnboundedSender<TransferEvent>,
) -> Result<Part> {
    let chunks: Vec<Vec<u8>> = file.bytes.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        let len = chunk.len() as u64;
        let loaded = sent.fetch_add(len, Ordering::Relaxed) + len;
        // receiver gone means nobody is watching
        let _ = events.send(TransferEvent::upload(loaded, Some(total)));
        Ok::<_, std::io::Error>(chunk)
    });

    Part::stream_with_length(Body::wrap_stream(stream), file.len())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime)
        .map_err(|e| Error::Validation(format!("invalid content type {}: {}", file.mime, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_trailing_slash() {
        let client = HttpMatchClient::new("http://localhost:5000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.url("match"), "http://localhost:5000/api/match");
    }
}
