// Transport trait for upstream HTTP access
use crate::domain::fetch::{EngineError, SourceId};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// How a request authenticates. Shared secrets travel in the `Authorization`
/// header; only third-party APIs that demand it get a query-string key.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    None,
    SharedSecret(String),
    ApiKeyParam { param: String, value: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::None => write!(f, "None"),
            Credential::SharedSecret(_) => write!(f, "SharedSecret(***)"),
            Credential::ApiKeyParam { param, .. } => write!(f, "ApiKeyParam({}=***)", param),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub source: SourceId,
    pub url: String,
    pub method: Method,
    /// Default bound: 5s for live reads, 10-30s for bulk history
    pub timeout: Duration,
    pub credential: Credential,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub endpoint: Endpoint,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

/// Per-source endpoint descriptors, built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    endpoints: HashMap<SourceId, Endpoint>,
}

impl EndpointTable {
    pub fn new(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        Self {
            endpoints: endpoints.into_iter().map(|e| (e.source, e)).collect(),
        }
    }

    pub fn get(&self, source: SourceId) -> Option<&Endpoint> {
        self.endpoints.get(&source)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one request and return the JSON body of a 2xx response.
    async fn execute(&self, request: &FetchRequest) -> Result<Value, EngineError>;
}
