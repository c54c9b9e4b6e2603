// Source fetcher - one bounded request against one backend, failures kept as data
use crate::application::transport::{Endpoint, FetchRequest, HttpTransport, Method};
use crate::domain::fetch::{EngineError, FetchResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct SourceFetcher {
    transport: Arc<dyn HttpTransport>,
}

impl SourceFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// GET `endpoint` with `params`, bounded by `timeout`.
    pub async fn fetch(
        &self,
        endpoint: &Endpoint,
        params: Vec<(String, String)>,
        timeout: Duration,
    ) -> FetchResult<Value> {
        let request = FetchRequest {
            endpoint: Endpoint {
                method: Method::Get,
                ..endpoint.clone()
            },
            query: params,
            body: None,
            timeout,
        };
        self.run(request).await
    }

    /// POST a JSON body; used by batch computation endpoints.
    pub async fn submit(
        &self,
        endpoint: &Endpoint,
        params: Vec<(String, String)>,
        body: Value,
    ) -> FetchResult<Value> {
        let request = FetchRequest {
            endpoint: Endpoint {
                method: Method::Post,
                ..endpoint.clone()
            },
            query: params,
            body: Some(body),
            timeout: endpoint.timeout,
        };
        self.run(request).await
    }

    async fn run(&self, request: FetchRequest) -> FetchResult<Value> {
        let source = request.endpoint.source.as_str();
        tracing::debug!("Fetching {} (timeout {:?})", source, request.timeout);

        let outcome = tokio::time::timeout(request.timeout, self.transport.execute(&request)).await;
        match outcome {
            Err(_) => {
                tracing::warn!("{} timed out after {:?}", source, request.timeout);
                FetchResult::Failed(EngineError::TransportFailure(format!(
                    "timed out after {}ms",
                    request.timeout.as_millis()
                )))
            }
            Ok(Err(err)) => {
                tracing::warn!("{} failed: {}", source, err);
                FetchResult::Failed(err)
            }
            Ok(Ok(payload)) if is_empty_payload(&payload) => {
                tracing::debug!("{} returned an empty payload", source);
                FetchResult::Empty
            }
            Ok(Ok(payload)) => FetchResult::Ok(payload),
        }
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.is_empty(),
        _ => false,
    }
}
