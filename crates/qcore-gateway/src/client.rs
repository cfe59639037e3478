//! HTTP client for the simulation backend's JSON API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{ConfigError, GatewayConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::SimulationGateway;
use crate::wire::{
    ExerciseEnvelope, ExerciseList, ExerciseSpec, GateListing, HealthStatus, ScoreRequest,
    ScoreResult, SimulateRequest, SimulationResult, SimulatorInfo, sort_exercises,
};

/// Simulation backend reached over HTTP.
///
/// One attempt per call; the request timeout comes from
/// [`GatewayConfig::timeout_seconds`].
#[derive(Debug, Clone)]
pub struct HttpGateway {
    /// HTTP client with timeouts configured.
    client: Client,
    /// API root without trailing slash.
    base_url: String,
    /// Parsed `base_url`; request paths are appended segment by segment.
    root: Url,
}

impl HttpGateway {
    /// Create a gateway from a validated configuration.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(GatewayError::Http)?;

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        let root = Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                ConfigError::ValidationError(format!("base_url is not a valid URL: {base_url}"))
            })?;

        Ok(Self {
            client,
            base_url,
            root,
        })
    }

    /// Create a gateway for `base_url` with default timeouts.
    pub fn with_base_url(base_url: impl Into<String>) -> GatewayResult<Self> {
        Self::new(&GatewayConfig::new(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `segments` onto the API root, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.root.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidRequest(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Perform a GET request, returning the deserialized JSON body.
    async fn get<T: for<'de> Deserialize<'de>>(&self, segments: &[&str]) -> GatewayResult<T> {
        let url = self.url(segments)?;
        debug!("GET {}", url);

        let resp = self.client.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// Perform a POST request with a JSON body, returning the deserialized JSON body.
    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        segments: &[&str],
        body: &impl Serialize,
    ) -> GatewayResult<T> {
        let url = self.url(segments)?;
        debug!("POST {}", url);

        let resp = self.client.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// Handle HTTP response: deserialize JSON or return an error.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> GatewayResult<T> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await?;
            Ok(serde_json::from_str(&text)?)
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = error_detail(&body);
            match status {
                StatusCode::NOT_FOUND => Err(GatewayError::NotFound(message)),
                _ => Err(GatewayError::Api {
                    status: status.as_u16(),
                    message,
                }),
            }
        }
    }

    /// Describe the simulator (`GET /api/algorithms/simulator/info`).
    #[instrument(skip(self))]
    pub async fn simulator_info(&self) -> GatewayResult<SimulatorInfo> {
        self.get(&["api", "algorithms", "simulator", "info"]).await
    }
}

/// Extract a readable message from an error body.
///
/// Uses the `detail` field when the body is JSON, joining validation
/// error lists; otherwise the raw body text.
fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| match item.get("msg").and_then(|m| m.as_str()) {
                Some(msg) => msg.to_string(),
                None => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

#[async_trait]
impl SimulationGateway for HttpGateway {
    #[instrument(skip(self, request), fields(qubits = request.qubits, gates = request.gates.len()))]
    async fn simulate(&self, request: &SimulateRequest) -> GatewayResult<SimulationResult> {
        request.validate()?;
        self.post(&["api", "algorithms", "simulator", "run"], request).await
    }

    #[instrument(skip(self, request), fields(gates = request.circuit.len()))]
    async fn score(&self, exercise_id: &str, request: &ScoreRequest) -> GatewayResult<ScoreResult> {
        request.validate()?;
        let mut result: ScoreResult = self
            .post(&["api", "exercises", exercise_id, "submit"], request)
            .await?;
        if result.exercise_id.is_none() {
            result.exercise_id = Some(exercise_id.to_string());
        }
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn exercise(&self, id: &str) -> GatewayResult<ExerciseSpec> {
        let envelope: ExerciseEnvelope = self.get(&["api", "exercises", id]).await?;
        Ok(envelope.exercise)
    }

    #[instrument(skip(self))]
    async fn exercises(&self) -> GatewayResult<Vec<ExerciseSpec>> {
        let list: ExerciseList = self.get(&["api", "exercises"]).await?;
        let mut exercises = list.exercises;
        sort_exercises(&mut exercises);
        Ok(exercises)
    }

    #[instrument(skip(self))]
    async fn gates(&self) -> GatewayResult<GateListing> {
        self.get(&["api", "algorithms", "simulator", "gates"]).await
    }

    #[instrument(skip(self))]
    async fn health(&self) -> GatewayResult<HealthStatus> {
        self.get(&["api", "health"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_string() {
        assert_eq!(
            error_detail(r#"{"detail": "Exercise missing not found"}"#),
            "Exercise missing not found"
        );
    }

    #[test]
    fn test_error_detail_validation_list() {
        let body = r#"{"detail": [{"loc": ["body", "qubits"], "msg": "field required"},
                                  {"loc": ["body", "gates"], "msg": "value is not a valid list"}]}"#;
        assert_eq!(
            error_detail(body),
            "field required; value is not a valid list"
        );
    }

    #[test]
    fn test_error_detail_plain_text() {
        assert_eq!(error_detail("Internal Server Error\n"), "Internal Server Error");
        assert_eq!(error_detail(r#"{"error": "x"}"#), r#"{"error": "x"}"#);
    }

    #[test]
    fn test_base_url_normalized() {
        let gateway = HttpGateway::with_base_url("http://localhost:8000/").unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8000");
        assert_eq!(
            gateway.url(&["api", "health"]).unwrap().as_str(),
            "http://localhost:8000/api/health"
        );

        let nested = HttpGateway::with_base_url("http://localhost:8000/lab/").unwrap();
        assert_eq!(
            nested.url(&["api", "health"]).unwrap().as_str(),
            "http://localhost:8000/lab/api/health"
        );
    }

    #[test]
    fn test_url_encodes_each_segment() {
        let gateway = HttpGateway::with_base_url("http://localhost:8000").unwrap();
        let url = gateway.url(&["api", "exercises", "a/b?c#d", "submit"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/exercises/a%2Fb%3Fc%23d/submit"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = HttpGateway::with_base_url("localhost:8000").unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }
}
