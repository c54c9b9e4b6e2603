// reqwest-backed transport for the backend and public weather APIs
use crate::application::transport::{Credential, FetchRequest, HttpTransport, Method};
use crate::domain::fetch::EngineError;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    fn build(&self, request: &FetchRequest) -> reqwest::RequestBuilder {
        let endpoint = &request.endpoint;
        let builder = match endpoint.method {
            Method::Get => self.client.get(&endpoint.url),
            Method::Post => self.client.post(&endpoint.url),
        };

        let mut builder = builder
            .timeout(request.timeout)
            .header("Accept", "application/json")
            .query(&request.query);

        builder = match &endpoint.credential {
            Credential::None => builder,
            Credential::SharedSecret(secret) => {
                builder.header("Authorization", format!("Token {}", secret))
            }
            Credential::ApiKeyParam { param, value } => builder.query(&[(param, value)]),
        };

        match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &FetchRequest) -> Result<Value, EngineError> {
        let source = request.endpoint.source.as_str();

        // without_url() keeps query-string credentials out of error messages
        let response = self.build(request).send().await.map_err(|e| {
            let e = e.without_url();
            if e.is_timeout() {
                EngineError::TransportFailure(format!(
                    "{} timed out after {}ms",
                    source,
                    request.timeout.as_millis()
                ))
            } else {
                EngineError::TransportFailure(format!("{}: {}", source, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::TransportFailure(format!(
                "{} returned status {}",
                source, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EngineError::TransportFailure(format!("{}: {}", source, e.without_url())))?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| EngineError::SchemaMismatch(format!("{} sent invalid JSON: {}", source, e)))
    }
}
