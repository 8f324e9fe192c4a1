//! HTTP transport implementation.
//!
//! One listener hosts two mounts:
//! - `/fabric/mcp`: JSON-RPC over POST for the merged MCP server
//! - `/api/health`, `/api/health/ready`, `/api/health/live`: operational
//!   endpoints that never call out to Jira or Xray
//!
//! CORS follows the configured origin list with credentials allowed, and a
//! catch-all layer turns panics into masked 500 responses.

use std::any::Any;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::{McpServer, masking::ErrorMasking};

const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg)
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The merged MCP server.
    server: McpServer,
    /// Endpoint paths, echoed by the root handler.
    rpc_endpoint: String,
    api_prefix: String,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(server: McpServer, config: &HttpConfig) -> Self {
        Self {
            server,
            rpc_endpoint: config.rpc_endpoint(),
            api_prefix: config.api_prefix.clone(),
            started_at: Utc::now(),
        }
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind the listener and announce the address actually bound.
    pub async fn bind(&self) -> TransportResult<tokio::net::TcpListener> {
        let addr = self.address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;
        let bound = listener
            .local_addr()
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!(
            "Ready - listening on {} (CORS origins: {})",
            bound,
            self.config.cors_origins.join(", ")
        );
        info!("  → MCP JSON-RPC: POST {}", self.config.rpc_endpoint());
        info!("  → Health:       GET {}/health", self.config.api_prefix);

        Ok(listener)
    }

    /// Run the HTTP transport until a shutdown signal arrives.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let app = build_router(AppState::new(server, &self.config), &self.config);
        let listener = self.bind().await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(TransportError::Serve)?;

        info!("HTTP transport stopped");
        Ok(())
    }
}

/// Build the full application router: routes, mounts and layers.
pub fn build_router(state: AppState, config: &HttpConfig) -> Router {
    let masking = state.server.masking();

    let mcp = Router::new().route(&config.rpc_path, post(handle_rpc));

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check));

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/healthy", get(legacy_health_check))
        .nest(&config.mount_path, mcp)
        .nest(&config.api_prefix, api)
        .fallback(not_found)
        .with_state(state);

    apply_layers(app, config, masking)
}

/// Wrap a router with the catch-all error handler, CORS and request tracing.
pub fn apply_layers(router: Router, config: &HttpConfig, masking: ErrorMasking) -> Router {
    router
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(masking, panic),
        ))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS policy: listed origins, any method, any header, credentials allowed.
///
/// Methods and headers are mirrored rather than wildcarded because browsers
/// reject `*` on credentialed requests.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Catch-all handler for anything that escaped the request handlers.
fn panic_response(masking: ErrorMasking, panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!("Unhandled error: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(masking.internal_error_body(&message)),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_endpoint,
            "health": format!("{}/health", state.api_prefix),
            "ready": format!("{}/health/ready", state.api_prefix),
            "live": format!("{}/health/live", state.api_prefix)
        },
        "protocol": "JSON-RPC 2.0"
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": state.server.name(),
        "version": state.server.version(),
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": (Utc::now() - state.started_at).num_seconds()
    }))
}

/// Readiness: tools are registered before the listener exists.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ready",
        "tools": state.server.tool_count()
    }))
}

async fn liveness_check() -> impl IntoResponse {
    Json(json!({ "status": "alive" }))
}

async fn legacy_health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    // Notifications carry no id and get no body.
    if request.id.is_none() && request.method.starts_with("notifications/") {
        handle_notification(&request);
        return StatusCode::ACCEPTED.into_response();
    }

    let response = process_request(&state, request).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => handle_tools_list(state, request),
        "tools/call" => handle_tools_call(state, request).await,
        method if method.starts_with("notifications/") => {
            handle_notification(&request);
            JsonRpcResponse::success(request.id, Value::Null)
        }
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");

    let protocol_version = request
        .params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION)
        .to_string();

    let result = json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": state.server.instructions()
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/list request.
fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/list request");

    match serde_json::to_value(state.server.list_tools()) {
        Ok(tools) => JsonRpcResponse::success(request.id, json!({ "tools": tools })),
        Err(e) => {
            error!("Failed to serialize tool list: {}", e);
            JsonRpcResponse::internal_error(request.id, "Failed to list tools")
        }
    }
}

/// Handle tools/call request.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = match request.params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
    };

    let name = match params.get("name").and_then(Value::as_str) {
        Some(n) => n.to_string(),
        None => return JsonRpcResponse::invalid_params(request.id, "Missing tool name"),
    };

    info!("Processing tools/call request for {}", name);

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(_) => {
            return JsonRpcResponse::invalid_params(request.id, "Tool arguments must be an object");
        }
    };

    match state.server.invoke(&name, arguments).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => {
                error!("Failed to serialize result of {}: {}", name, e);
                JsonRpcResponse::internal_error(request.id, "Failed to serialize tool result")
            }
        },
        Err(e) => {
            let mut response = JsonRpcResponse::error(request.id, e.code.0, e.message.to_string());
            if let Some(error) = response.error.as_mut() {
                error.data = e.data;
            }
            response
        }
    }
}

/// Handle notifications (no response needed).
fn handle_notification(request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => info!("Client sent initialized notification"),
        _ => info!("Received notification: {}", request.method),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, Environment, JiraConfig};
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn test_config() -> HttpConfig {
        HttpConfig::default()
    }

    fn app_with(config: Config) -> Router {
        let http = test_config();
        let server = McpServer::build(config).unwrap();
        build_router(AppState::new(server, &http), &http)
    }

    fn app() -> Router {
        app_with(Config::default())
    }

    fn broken_jira(environment: Environment) -> Config {
        Config {
            environment,
            jira: JiraConfig {
                base_url: "::not-a-url::".to_string(),
                email: Some("bot@acme.io".to_string()),
                api_token: Some("token".to_string()),
                timeout_secs: 1,
            },
            ..Config::default()
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn rpc_request(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/fabric/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn call_tool(name: &str, arguments: Value) -> Request<Body> {
        rpc_request(json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }))
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (status, body) = send(app(), get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (_, body) = send(app(), get_request("/api/health/ready")).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["tools"], 2);

        let (_, body) = send(app(), get_request("/api/health/live")).await;
        assert_eq!(body["status"], "alive");

        let (_, body) = send(app(), get_request("/healthy")).await;
        assert_eq!(body, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = send(app(), get_request("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Not Found");
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let request = rpc_request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": { "protocolVersion": "2025-03-26" }
        }));
        let (_, body) = send(app(), request).await;
        assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(body["result"]["serverInfo"]["name"], "Fabric MCP Server");
    }

    #[tokio::test]
    async fn test_tools_list_has_both_prefixed_tools() {
        let request = rpc_request(json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }));
        let (_, body) = send(app(), request).await;
        let names: Vec<_> = body["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["pss_fabric_get_jira_issue", "pss_fabric_get_xray_test_case"]
        );
    }

    #[tokio::test]
    async fn test_tool_call_classified_fault() {
        let request = call_tool("pss_fabric_get_jira_issue", json!({ "issue_key": "bad key" }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 7);
        assert_eq!(body["result"]["isError"], true);
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Invalid issue key"));
    }

    #[tokio::test]
    async fn test_tool_call_unclassified_fault_masked_in_production() {
        let request = call_tool("pss_fabric_get_jira_issue", json!({ "issue_key": "PROJ-1" }));
        let (_, body) = send(app_with(broken_jira(Environment::Production)), request).await;
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert_eq!(text, "Error calling tool 'pss_fabric_get_jira_issue'");
    }

    #[tokio::test]
    async fn test_tool_call_unclassified_fault_detailed_in_development() {
        let request = call_tool("pss_fabric_get_jira_issue", json!({ "issue_key": "PROJ-1" }));
        let (_, body) = send(app_with(broken_jira(Environment::Development)), request).await;
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("invalid base URL"));
    }

    #[tokio::test]
    async fn test_tool_call_unknown_tool() {
        let request = call_tool("get_jira_issue", json!({ "issue_key": "PROJ-1" }));
        let (_, body) = send(app(), request).await;
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_tool_call_non_object_arguments() {
        let request = call_tool("pss_fabric_get_jira_issue", json!(["PROJ-1"]));
        let (_, body) = send(app(), request).await;
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_version() {
        let request = rpc_request(json!({ "jsonrpc": "2.0", "id": 3, "method": "resources/list" }));
        let (_, body) = send(app(), request).await;
        assert_eq!(body["error"]["code"], -32601);

        let request = rpc_request(json!({ "jsonrpc": "1.0", "id": 4, "method": "ping" }));
        let (_, body) = send(app(), request).await;
        assert_eq!(body["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_notification_is_accepted_without_body() {
        let request = rpc_request(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, Value::Null);
    }

    async fn boom() -> &'static str {
        panic!("database exploded")
    }

    fn panicking_app(mask: bool) -> Router {
        apply_layers(
            Router::new().route("/boom", get(boom)),
            &test_config(),
            ErrorMasking::new(mask),
        )
    }

    #[tokio::test]
    async fn test_catch_all_masks_in_production() {
        let (status, body) = send(panicking_app(true), get_request("/boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn test_catch_all_exposes_message_in_development() {
        let (status, body) = send(panicking_app(false), get_request("/boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Internal Server Error");
        assert_eq!(body["error"], "database exploded");
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/fabric/mcp")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_with_credentials() {
        let response = app().oneshot(preflight("http://localhost:3000")).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(), "POST");
    }

    #[tokio::test]
    async fn test_cors_rejects_unlisted_origin() {
        let response = app().oneshot(preflight("https://evil.test")).await.unwrap();
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard_mirrors_origin() {
        let router = apply_layers(
            Router::new().route("/x", get(|| async { "ok" })),
            &HttpConfig {
                cors_origins: vec!["*".to_string()],
                ..HttpConfig::default()
            },
            ErrorMasking::new(false),
        );
        let request = Request::builder()
            .uri("/x")
            .header(header::ORIGIN, "https://any.test")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://any.test"
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_bind_logs_actual_port() {
        let transport = HttpTransport::new(HttpConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..HttpConfig::default()
        });
        let listener = transport.bind().await.unwrap();
        let bound = listener.local_addr().unwrap();
        assert_ne!(bound.port(), 0);
        assert!(logs_contain(&format!("listening on {}", bound)));
        assert!(!logs_contain("listening on 127.0.0.1:0 "));
    }
}
