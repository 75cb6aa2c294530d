use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// The natural-language prompt sent to the generative service. Order is preserved.
pub fn combination_query(elem1: &str, elem2: &str) -> String {
    format!("What do you get when you combine {elem1} and {elem2}?")
}

/// Raw answer from the generative service. Absent fields decode as empty strings; the
/// handler decides whether the answer is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Resolution {
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub emoji: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type ResolveFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Resolution, ResolveError>> + Send + 'a>>;

pub trait Resolver: Send + Sync {
    fn resolve<'a>(&'a self, query: &'a str) -> ResolveFuture<'a>;
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

/// HTTP client for the Forge craft endpoint (`POST {base}/craft/query`).
#[derive(Debug, Clone)]
pub struct ForgeResolver {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ForgeResolver {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/craft/query", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query(&self, query: &str) -> Result<Resolution, ResolveError> {
        let mut req = self.client.post(&self.endpoint).json(&QueryBody { query });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ResolveError::Malformed(e.to_string()))
    }
}

impl Resolver for ForgeResolver {
    fn resolve<'a>(&'a self, query: &'a str) -> ResolveFuture<'a> {
        Box::pin(self.query(query))
    }
}
