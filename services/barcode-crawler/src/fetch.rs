//!
//! src/fetch.rs  Andrew Belles  Oct 16th, 2026
//!
//! Defines methods for hitting the discogs endpoints and
//! decoding their bodies. Retries live in the lookup layer.
//!

use async_trait::async_trait;
use reqwest::{Client, header, redirect, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::{DiscogsConfig, HttpConfig};
use crate::types::{AccessToken, ReleaseDetail, ReleaseId, SearchResponse};
use crate::CrawlerError;

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder  {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

fn client_with_headers(http: &HttpConfig, headers: header::HeaderMap) ->
    Result<Client, CrawlerError> {
    client_helper(http)
        .default_headers(headers)
        .build()
        .map_err(|e| CrawlerError::Http(format!("build client: {e}")))
}

///
/// The two catalog calls the lookup depends on. One attempt each;
/// Err means the attempt failed (transport, status or body).
///
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn search_barcode(&self, barcode: &str, token: &AccessToken) ->
        Result<SearchResponse, CrawlerError>;

    async fn release(&self, release_id: &ReleaseId, token: &AccessToken) ->
        Result<ReleaseDetail, CrawlerError>;
}

#[derive(Clone, Debug)]
pub struct DiscogsClient {
    pub http: Client,
    pub cfg: DiscogsConfig
}

impl DiscogsClient {
    pub fn new(http_cfg: &HttpConfig, dg_cfg: &DiscogsConfig)
        -> Result<Self, CrawlerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json")
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&dg_cfg.user_agent)
                .map_err(|e| CrawlerError::Config(format!("invalid user_agent: {e}")))?,
        );
        let http = client_with_headers(http_cfg, headers)?;

        Ok(Self { http, cfg: dg_cfg.clone() })
    }

    /// GET /database/search?barcode=...&token=...
    pub fn search_request(&self, barcode: &str, token: &AccessToken) ->
        Result<RequestBuilder, CrawlerError> {
        let url = self.cfg.base_url.join("database/search")
            .map_err(|e| CrawlerError::Config(format!("search url: {e}")))?;
        Ok(self.http.get(url).query(&[
            ("barcode", barcode),
            ("token", token.as_str()),
        ]))
    }

    /// GET /releases/{id}?token=...
    pub fn release_request(&self, release_id: &ReleaseId, token: &AccessToken) ->
        Result<RequestBuilder, CrawlerError> {
        let url = self.cfg.base_url.join(&format!("releases/{release_id}"))
            .map_err(|e| CrawlerError::Config(format!("release url: {e}")))?;
        Ok(self.http.get(url).query(&[("token", token.as_str())]))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) ->
        Result<T, CrawlerError> {
        let response = request.send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<T>(&body)?)
    }
}

#[async_trait]
impl CatalogTransport for DiscogsClient {
    async fn search_barcode(&self, barcode: &str, token: &AccessToken) ->
        Result<SearchResponse, CrawlerError> {
        Self::send_json(self.search_request(barcode, token)?).await
    }

    async fn release(&self, release_id: &ReleaseId, token: &AccessToken) ->
        Result<ReleaseDetail, CrawlerError> {
        Self::send_json(self.release_request(release_id, token)?).await
    }
}
