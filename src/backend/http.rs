use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::backend::{Backend, CycleReport};
use crate::config::Endpoints;
use crate::error::FetchError;
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::snapshot::Snapshot;

/// Backend reached over HTTP. One request per call, no retries: the next
/// poll is the retry.
pub struct HttpBackend {
    client: Client,
    endpoints: Endpoints,
}

impl HttpBackend {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_body(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let endpoint = url.path();
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::transport(endpoint, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::transport(endpoint, e))?;
        log(
            Level::Trace,
            Domain::Fetch,
            "response",
            obj(&[
                ("endpoint", v_str(endpoint)),
                ("bytes", serde_json::json!(body.len())),
            ]),
        );
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_stats(&self) -> Result<Snapshot, FetchError> {
        let url = &self.endpoints.stats;
        let body = self.get_body(url).await?;
        Snapshot::from_body(&body).map_err(|source| FetchError::Parse {
            endpoint: url.path().to_string(),
            source,
        })
    }

    async fn trigger_cycle(&self) -> Result<CycleReport, FetchError> {
        let url = &self.endpoints.trade;
        let body = self.get_body(url).await?;
        CycleReport::from_body(url.path(), &body)
    }
}
