//! Concept generation routes.
//!
//! JSON Endpoints:
//! - `GET /`                      - service description
//! - `GET /random`                - inspirational concept of a random type
//! - `GET /random/{type}/{field}` - concept for an explicit type and field
//! - `GET /quote/{field}`         - concept for a field, random type
//! - `GET /quote/type/{type}`     - concept for a type, random field
//! - `GET /fields`                - supported fields
//! - `GET /types`                 - supported types
//! - `GET /search/{keyword}`      - concept themed on a free-text keyword
//! - `GET /short-quote?char=N`    - inspirational concept with a length hint
//!
//! Random defaults are drawn per request.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use maxim_agent::ConceptGenerator;
use maxim_core::{
    list_fields, list_types, ConceptRecord, ConceptType, Field, GenerationRequest,
    InterfaceError, LengthHint, Subject, VocabularyError,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct RoutesState {
    generator: ConceptGenerator,
    short_quote_chars: u32,
}

impl RoutesState {
    pub fn new(generator: ConceptGenerator, short_quote_chars: u32) -> Self {
        Self { generator, short_quote_chars }
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct ShortQuoteQuery {
    #[serde(rename = "char", alias = "length")]
    pub chars: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FieldsResponse {
    pub fields: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct TypesResponse {
    pub types: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ServiceDescription {
    pub title: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub routes: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub detail: String,
    pub correlation_id: String,
}

/// Boundary error: the interface tier of `InterfaceError` plus its HTTP status.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self.0 {
            InterfaceError::BadRequest { message, .. }
            | InterfaceError::BadGateway { message, .. }
            | InterfaceError::ServiceUnavailable { message, .. }
            | InterfaceError::GatewayTimeout { message, .. } => message.clone(),
        };
        let body = ErrorBody {
            error: self.0.reason(),
            message: self.0.user_message().to_string(),
            detail,
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: RoutesState) -> Router {
    Router::new()
        .route("/", get(describe_service))
        .route("/random", get(random_concept))
        .route("/random/{type}/{field}", get(concept_by_type_and_field))
        .route("/quote/{field}", get(concept_by_field))
        .route("/quote/type/{type}", get(concept_by_type))
        .route("/fields", get(supported_fields))
        .route("/types", get(supported_types))
        .route("/search/{keyword}", get(search_concept))
        .route("/short-quote", get(short_quote))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn describe_service() -> Json<ServiceDescription> {
    Json(ServiceDescription {
        title: "Maxim Concepts API",
        version: env!("CARGO_PKG_VERSION"),
        description: "Generates quotes, effects, principles and theories from various fields \
                      of study as structured JSON.",
        routes: vec![
            "GET /random",
            "GET /random/{type}/{field}",
            "GET /quote/{field}",
            "GET /quote/type/{type}",
            "GET /fields",
            "GET /types",
            "GET /search/{keyword}",
            "GET /short-quote?char=N",
            "GET /health",
        ],
    })
}

async fn random_concept(
    State(state): State<RoutesState>,
) -> Result<Json<ConceptRecord>, ApiError> {
    let concept_type = random_type();
    let request = GenerationRequest::for_field(Field::Inspirational, concept_type);
    run_generation(&state, request).await
}

async fn concept_by_type_and_field(
    path: Result<Path<(String, String)>, PathRejection>,
    State(state): State<RoutesState>,
) -> Result<Json<ConceptRecord>, ApiError> {
    let Path((concept_type, field)) =
        path.map_err(|rejection| invalid_parameter(rejection.body_text()))?;
    let field = parse_field(&field)?;
    let concept_type = parse_type(&concept_type)?;
    run_generation(&state, GenerationRequest::for_field(field, concept_type)).await
}

async fn concept_by_field(
    path: Result<Path<String>, PathRejection>,
    State(state): State<RoutesState>,
) -> Result<Json<ConceptRecord>, ApiError> {
    let Path(field) = path.map_err(|rejection| invalid_parameter(rejection.body_text()))?;
    let field = parse_field(&field)?;
    let concept_type = random_type();
    run_generation(&state, GenerationRequest::for_field(field, concept_type)).await
}

async fn concept_by_type(
    path: Result<Path<String>, PathRejection>,
    State(state): State<RoutesState>,
) -> Result<Json<ConceptRecord>, ApiError> {
    let Path(concept_type) = path.map_err(|rejection| invalid_parameter(rejection.body_text()))?;
    let concept_type = parse_type(&concept_type)?;
    let field = random_field();
    run_generation(&state, GenerationRequest::for_field(field, concept_type)).await
}

async fn supported_fields() -> Json<FieldsResponse> {
    Json(FieldsResponse { fields: list_fields() })
}

async fn supported_types() -> Json<TypesResponse> {
    Json(TypesResponse { types: list_types() })
}

async fn search_concept(
    path: Result<Path<String>, PathRejection>,
    State(state): State<RoutesState>,
) -> Result<Json<ConceptRecord>, ApiError> {
    let Path(keyword) = path.map_err(|rejection| invalid_parameter(rejection.body_text()))?;
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ApiError(InterfaceError::BadRequest {
            reason: "Keyword Required",
            message: "search keyword must not be blank".to_string(),
            correlation_id: new_correlation_id(),
        }));
    }

    let request = GenerationRequest::new(
        Subject::Keyword(keyword.to_string()),
        random_type(),
        LengthHint::none(),
    );
    run_generation(&state, request).await
}

async fn short_quote(
    query: Result<Query<ShortQuoteQuery>, QueryRejection>,
    State(state): State<RoutesState>,
) -> Result<Json<ConceptRecord>, ApiError> {
    let Query(query) = query.map_err(|rejection| invalid_parameter(rejection.body_text()))?;
    let chars = query.chars.unwrap_or(i64::from(state.short_quote_chars));
    let request = GenerationRequest::new(
        Subject::Field(Field::Inspirational),
        random_type(),
        LengthHint::from_raw(Some(chars)),
    );
    run_generation(&state, request).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn run_generation(
    state: &RoutesState,
    request: GenerationRequest,
) -> Result<Json<ConceptRecord>, ApiError> {
    let correlation_id = new_correlation_id();
    let span = tracing::info_span!("generation", correlation_id = %correlation_id);

    match state.generator.generate(&request).instrument(span).await {
        Ok(record) => Ok(Json(record)),
        Err(error) => {
            warn!(
                event_name = "routes.generation.failed",
                correlation_id = %correlation_id,
                error_class = error.error_class(),
                error = %error,
                "concept generation failed"
            );
            Err(ApiError(error.into_interface(correlation_id)))
        }
    }
}

fn parse_field(raw: &str) -> Result<Field, ApiError> {
    raw.parse::<Field>().map_err(reject)
}

fn parse_type(raw: &str) -> Result<ConceptType, ApiError> {
    raw.parse::<ConceptType>().map_err(reject)
}

fn reject(error: VocabularyError) -> ApiError {
    let correlation_id = new_correlation_id();
    info!(
        event_name = "routes.request.rejected",
        correlation_id = %correlation_id,
        error = %error,
        "request rejected by vocabulary"
    );
    ApiError(InterfaceError::rejected(&error, correlation_id))
}

/// Extractor failures get the same JSON envelope as every other rejection.
fn invalid_parameter(detail: String) -> ApiError {
    let correlation_id = new_correlation_id();
    info!(
        event_name = "routes.request.invalid_parameter",
        correlation_id = %correlation_id,
        detail = %detail,
        "request parameters could not be parsed"
    );
    ApiError(InterfaceError::BadRequest {
        reason: "Invalid Parameter",
        message: detail,
        correlation_id,
    })
}

fn random_field() -> Field {
    Field::random(&mut rand::thread_rng())
}

fn random_type() -> ConceptType {
    ConceptType::random(&mut rand::thread_rng())
}

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use maxim_agent::{
        CompletionRequest, ConceptGenerator, GeneratorSettings, LlmClient, LlmError,
        OpenAiCompatClient,
    };
    use maxim_core::config::{LlmConfig, LlmProvider};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, RoutesState};

    struct CountingClient {
        reply: Result<String, LlmError>,
        calls: AtomicUsize,
        instructions: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmClient for CountingClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.instructions.lock().expect("instructions mutex").push(request.user.clone());
            self.reply.clone()
        }
    }

    fn client(reply: Result<Value, LlmError>) -> Arc<CountingClient> {
        Arc::new(CountingClient {
            reply: reply.map(|value| value.to_string()),
            calls: AtomicUsize::new(0),
            instructions: Mutex::new(Vec::new()),
        })
    }

    /// The first double-quoted token following `marker`.
    fn quoted_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
        let rest = &text[text.find(marker)? + marker.len()..];
        rest.strip_prefix('"')?.split('"').next()
    }

    fn concept(field: &str, concept_type: &str) -> Value {
        json!({
            "name": "Dunning-Kruger Effect",
            "field": field,
            "type": concept_type,
            "quote": "The first rule of the Dunning-Kruger club is you don't know you're a member.",
            "summary": "People with limited competence tend to overestimate their ability.",
            "author": "David Dunning and Justin Kruger",
            "time": "1999"
        })
    }

    fn app(client: Arc<CountingClient>) -> axum::Router {
        let generator = ConceptGenerator::new(
            client,
            GeneratorSettings { temperature: 0.9, timeout: Duration::from_secs(5) },
        );
        router(RoutesState::new(generator, 53))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn unsupported_field_is_rejected_before_any_backend_call() {
        let backend = client(Ok(concept("physics", "effect")));

        let (status, body) = get(app(backend.clone()), "/quote/astrology").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Field Not Supported");
        assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_before_any_backend_call() {
        let backend = client(Ok(concept("physics", "effect")));

        let (status, body) = get(app(backend.clone()), "/quote/type/law").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Type Not Supported");

        let (status, body) = get(app(backend.clone()), "/random/law/physics").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Type Not Supported");

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn field_is_checked_before_type() {
        let backend = client(Ok(concept("physics", "effect")));

        let (status, body) = get(app(backend.clone()), "/random/law/astrology").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Field Not Supported");
    }

    #[tokio::test]
    async fn typed_and_fielded_route_returns_requested_values() {
        let backend = client(Ok(concept("psychology", "effect")));

        let (status, body) = get(app(backend.clone()), "/random/effect/psychology").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["field"], "psychology");
        assert_eq!(body["type"], "effect");
        assert_eq!(body["time"], "1999");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        let instructions = backend.instructions.lock().expect("instructions mutex");
        assert!(instructions[0].contains("\"psychology\" field"));
        assert!(instructions[0].contains("type \"effect\""));
    }

    #[tokio::test]
    async fn random_route_requests_inspirational_concepts() {
        let backend = client(Ok(concept("inspirational", "quote")));

        let (status, _) = get(app(backend.clone()), "/random").await;

        assert_eq!(status, StatusCode::OK);
        let instructions = backend.instructions.lock().expect("instructions mutex");
        assert!(instructions[0].contains("\"inspirational\" field"));
        assert!(instructions[0].contains("unconstrained"));
    }

    #[tokio::test]
    async fn out_of_vocabulary_backend_reply_maps_to_bad_gateway() {
        let backend = client(Ok(concept("astrology", "effect")));

        let (status, body) = get(app(backend), "/quote/physics").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Upstream Response Invalid");
        assert_eq!(body["detail"], "upstream_invalid_domain_value");
    }

    #[tokio::test]
    async fn malformed_backend_reply_maps_to_bad_gateway() {
        let backend = client(Ok(json!({"name": "half a record"})));

        let (status, _) = get(app(backend), "/quote/physics").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn transport_failures_map_to_distinct_statuses() {
        let (status, body) = get(app(client(Err(LlmError::Timeout))), "/random").await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "Upstream Timeout");

        let unavailable = client(Err(LlmError::Unavailable("connection refused".to_string())));
        let (status, body) = get(app(unavailable), "/random").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["message"],
            "The generator is temporarily unavailable. Please retry shortly."
        );
    }

    #[tokio::test]
    async fn unreachable_backend_details_stay_out_of_the_body() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let address = listener.local_addr().expect("local addr");
        drop(listener);
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            api_key: None,
            base_url: Some(format!("http://{address}/internal-llm/v1")),
            model: "llama3.1".to_string(),
            timeout_secs: 2,
        };
        let backend = OpenAiCompatClient::from_config(&config).expect("client should build");
        let generator = ConceptGenerator::new(
            Arc::new(backend),
            GeneratorSettings { temperature: 0.9, timeout: Duration::from_secs(2) },
        );

        let (status, body) = get(router(RoutesState::new(generator, 53)), "/random").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "upstream_unavailable");
        let rendered = body.to_string();
        assert!(!rendered.contains("http://"));
        assert!(!rendered.contains("internal-llm"));
    }

    #[tokio::test]
    async fn unparsable_query_values_get_the_json_envelope() {
        let backend = client(Ok(concept("inspirational", "quote")));

        for uri in
            ["/short-quote?char=abc", "/short-quote?char=", "/short-quote?char=99999999999999999999"]
        {
            let (status, body) = get(app(backend.clone()), uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"], "Invalid Parameter", "{uri}");
            assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()), "{uri}");
            assert!(body["detail"].as_str().is_some_and(|detail| !detail.is_empty()), "{uri}");
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn random_type_is_drawn_per_request() {
        let backend = client(Ok(concept("inspirational", "quote")));
        let shared = app(backend.clone());

        for _ in 0..50 {
            let (status, _) = get(shared.clone(), "/random").await;
            assert_eq!(status, StatusCode::OK);
        }

        let instructions = backend.instructions.lock().expect("instructions mutex");
        let types: HashSet<&str> =
            instructions.iter().filter_map(|text| quoted_after(text, "type ")).collect();
        assert_eq!(instructions.len(), 50);
        assert!(types.len() > 1, "every request drew the same type: {types:?}");
    }

    #[tokio::test]
    async fn type_route_draws_its_field_per_request() {
        let backend = client(Ok(concept("physics", "effect")));
        let shared = app(backend.clone());

        for _ in 0..50 {
            let (status, body) = get(shared.clone(), "/quote/type/effect").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["type"], "effect");
        }

        let instructions = backend.instructions.lock().expect("instructions mutex");
        assert!(instructions.iter().all(|text| text.contains("type \"effect\"")));
        let fields: HashSet<&str> =
            instructions.iter().filter_map(|text| quoted_after(text, "from the ")).collect();
        assert!(fields.len() > 1, "every request drew the same field: {fields:?}");
    }

    #[tokio::test]
    async fn keyword_search_bypasses_vocabulary_validation() {
        let backend = client(Ok(concept("physics", "theory")));

        let (status, body) = get(app(backend.clone()), "/search/entropy").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["field"], "physics");
        let instructions = backend.instructions.lock().expect("instructions mutex");
        assert!(instructions[0].contains("keyword \"entropy\""));
    }

    #[tokio::test]
    async fn blank_keyword_is_rejected() {
        let backend = client(Ok(concept("physics", "theory")));

        let (status, body) = get(app(backend.clone()), "/search/%20%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Keyword Required");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn short_quote_uses_default_and_explicit_lengths() {
        let backend = client(Ok(concept("inspirational", "quote")));

        let (status, _) = get(app(backend.clone()), "/short-quote").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(app(backend.clone()), "/short-quote?char=120").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(app(backend.clone()), "/short-quote?length=80").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(app(backend.clone()), "/short-quote?char=0").await;
        assert_eq!(status, StatusCode::OK);

        let instructions = backend.instructions.lock().expect("instructions mutex");
        assert!(instructions[0].contains("approximately 53 characters"));
        assert!(instructions[1].contains("approximately 120 characters"));
        assert!(instructions[2].contains("approximately 80 characters"));
        assert!(instructions[3].contains("unconstrained"));
    }

    #[tokio::test]
    async fn vocabulary_listings_need_no_backend() {
        let backend = client(Ok(concept("physics", "effect")));

        let (status, body) = get(app(backend.clone()), "/fields").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "fields": [
                    "psychology", "physics", "chemistry", "mathematics", "philosophy", "inspirational"
                ]
            })
        );

        let (status, body) = get(app(backend.clone()), "/types").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"types": ["effect", "principle", "theory", "phenomenon", "quote", "syndrome"]})
        );

        let (status, body) = get(app(backend.clone()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Maxim Concepts API");

        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}
