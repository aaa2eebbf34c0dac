//! HTTP client for the commodity-price feed.
//!
//! One GET per call; retries, if any, are the caller's business.

use std::{fmt, future::Future, time::Duration};

use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result, TransportError};

fn default_limit() -> u32 { 20 }

fn default_timeout_secs() -> u64 { 30 }

/// Where and how to fetch the feed. Deserialised from the `[feed]` table of
/// the application config.
#[derive(Clone, Deserialize)]
pub struct FeedConfig {
  /// Resource URL, without query string.
  pub endpoint:     String,
  pub api_key:      String,
  /// Maximum number of rows requested per fetch.
  #[serde(default = "default_limit")]
  pub limit:        u32,
  /// Whole-request deadline.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl fmt::Debug for FeedConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FeedConfig")
      .field("endpoint", &self.endpoint)
      .field("api_key", &"<redacted>")
      .field("limit", &self.limit)
      .field("timeout_secs", &self.timeout_secs)
      .finish()
  }
}

/// Anything that can produce the raw feed text.
pub trait FeedSource: Send + Sync {
  fn fetch(&self) -> impl Future<Output = Result<String, TransportError>> + Send + '_;
}

/// Fetches the feed over HTTP.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone, Debug)]
pub struct FeedClient {
  client: Client,
  config: FeedConfig,
}

impl FeedClient {
  pub fn new(config: FeedConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &FeedConfig { &self.config }
}

impl FeedSource for FeedClient {
  /// `GET <endpoint>?api-key=<key>&format=csv&limit=<N>`
  async fn fetch(&self) -> Result<String, TransportError> {
    tracing::info!(
      endpoint = %self.config.endpoint,
      limit = self.config.limit,
      "fetching market-price feed"
    );

    let limit = self.config.limit.to_string();
    let resp = self
      .client
      .get(&self.config.endpoint)
      .query(&[
        ("api-key", self.config.api_key.as_str()),
        ("format", "csv"),
        ("limit", limit.as_str()),
      ])
      .send()
      .await
      .map_err(TransportError::Request)?;

    let status = resp.status();
    if !status.is_success() {
      return Err(TransportError::Status(status));
    }

    let body = resp.text().await.map_err(TransportError::Body)?;
    tracing::debug!(bytes = body.len(), "feed fetched");
    Ok(body)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use axum::{Router, extract::Query, http::StatusCode, routing::get};
  use tokio::net::TcpListener;

  use super::*;

  /// Serve `router` on an ephemeral port; returns the feed URL.
  async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}/resource")
  }

  fn client(endpoint: String) -> FeedClient {
    FeedClient::new(FeedConfig {
      endpoint,
      api_key: "secret-key".into(),
      limit: 5,
      timeout_secs: 5,
    })
    .unwrap()
  }

  #[tokio::test]
  async fn sends_key_format_and_limit() {
    let url = serve(Router::new().route(
      "/resource",
      get(|Query(q): Query<HashMap<String, String>>| async move {
        format!("key,format,limit\n{},{},{}\n", q["api-key"], q["format"], q["limit"])
      }),
    ))
    .await;

    let body = client(url).fetch().await.unwrap();
    assert_eq!(body, "key,format,limit\nsecret-key,csv,5\n");
  }

  #[tokio::test]
  async fn server_error_is_a_transport_error() {
    let url = serve(Router::new().route(
      "/resource",
      get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;

    let err = client(url).fetch().await.unwrap_err();
    assert!(matches!(
      err,
      TransportError::Status(s) if s == reqwest::StatusCode::INTERNAL_SERVER_ERROR
    ));
  }

  #[tokio::test]
  async fn connection_failure_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}/resource")).fetch().await.unwrap_err();
    assert!(matches!(err, TransportError::Request(_)));
  }

  #[test]
  fn debug_output_hides_api_key() {
    let cfg = client("http://localhost/".into()).config().clone();
    let shown = format!("{cfg:?}");
    assert!(!shown.contains("secret-key"));
  }
}
