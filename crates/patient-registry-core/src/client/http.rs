//! REST implementation of [`PatientCollection`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn, Instrument};

use super::{ClientError, ClientResult, PatientCollection};
use crate::config::ClientConfig;
use crate::models::{Patient, PatientInput, PatientUpdate, QueryState, ResultPage};

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const COLLECTION_SEGMENT: &str = "patients";

/// HTTP client for the `/patients` collection.
#[derive(Debug, Clone)]
pub struct HttpPatientClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpPatientClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.parsed_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, base_url })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self) -> ClientResult<Url> {
        self.url_with(&[COLLECTION_SEGMENT])
    }

    fn record_url(&self, patient_id: &str) -> ClientResult<Url> {
        self.url_with(&[COLLECTION_SEGMENT, patient_id])
    }

    /// Append percent-encoded path segments to the base URL.
    fn url_with(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Decode(format!("cannot extend base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request, tagging it with a request id and mapping non-2xx responses.
    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let request = builder
            .header(REQUEST_ID_HEADER, &request_id)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let span = tracing::debug_span!(
            "patient_api_request",
            method = %request.method(),
            path = %request.url().path(),
            request_id = %request_id,
        );

        async move {
            let response = self.http.execute(request).await.map_err(|e| {
                warn!(error = %e, "request failed before a response arrived");
                ClientError::Network(e.to_string())
            })?;

            let status = response.status().as_u16();
            if response.status().is_success() {
                debug!(status, "request succeeded");
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(status, %message, "request rejected");
            Err(ClientError::Server { status, message })
        }
        .instrument(span)
        .await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PatientCollection for HttpPatientClient {
    async fn list(&self, query: &QueryState) -> ClientResult<ResultPage> {
        let url = self.collection_url()?;
        let response = self.send(self.http.get(url).query(&query.to_params())).await?;
        Self::decode(response).await
    }

    async fn get(&self, patient_id: &str) -> ClientResult<Patient> {
        let url = self.record_url(patient_id)?;
        let response = self.send(self.http.get(url)).await?;
        Self::decode(response).await
    }

    async fn create(&self, input: &PatientInput) -> ClientResult<Patient> {
        let url = self.collection_url()?;
        let response = self.send(self.http.post(url).json(input)).await?;
        Self::decode(response).await
    }

    async fn update(&self, patient_id: &str, changes: &PatientUpdate) -> ClientResult<Patient> {
        let url = self.record_url(patient_id)?;
        let response = self.send(self.http.put(url).json(changes)).await?;
        Self::decode(response).await
    }

    async fn delete(&self, patient_id: &str) -> ClientResult<()> {
        let url = self.record_url(patient_id)?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}

/// Human-readable message for a non-2xx response.
///
/// Prefers a string `detail` field, then the `msg` entries of a list-valued
/// `detail` (framework validation errors), then the raw body, then a generic
/// status message.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => {
                return detail.clone();
            }
            Some(Value::Array(entries)) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpPatientClient {
        HttpPatientClient::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn test_error_message_prefers_detail() {
        let msg = error_message(409, r#"{"detail":"Patient with ID 'P001' already exists"}"#);
        assert_eq!(msg, "Patient with ID 'P001' already exists");
    }

    #[test]
    fn test_error_message_joins_validation_list() {
        let body = r#"{"detail":[{"loc":["body","age"],"msg":"Input should be greater than 0"},
            {"loc":["body","name"],"msg":"Field required"}]}"#;
        assert_eq!(
            error_message(422, body),
            "Input should be greater than 0; Field required"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body_then_status() {
        assert_eq!(error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(500, r#"{"error":"boom"}"#), r#"{"error":"boom"}"#);
        assert_eq!(error_message(503, "  "), "Request failed with status 503");
    }

    #[test]
    fn test_record_url_encodes_segment() {
        let client = client("http://localhost:8000");
        let url = client.record_url("P 001/x").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/patients/P%20001%2Fx");
    }

    #[test]
    fn test_collection_url_keeps_prefix() {
        let client = client("https://example.org/api/");
        assert_eq!(
            client.collection_url().unwrap().as_str(),
            "https://example.org/api/patients"
        );
    }
}
