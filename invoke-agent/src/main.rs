//! Invoke Agent Lambda - HTTP front door for the Bedrock support agent.
//!
//! Endpoints:
//! - POST /invoke-agent - Forward a chat message to the agent
//! - GET / and /health - Health check
//! - OPTIONS * - CORS preflight

use std::collections::HashMap;
use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use shared::agent::AgentClient;
use shared::config::AgentConfig;
use shared::http::{error_response, json_response, preflight_response};
use shared::models::AgentRequest;
use shared::parse_body;

/// Incoming chat request from the web widget.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvokeRequest {
    input_text: Option<String>,
    session_id: Option<String>,
    session_attributes: Option<HashMap<String, String>>,
    enable_trace: Option<bool>,
}

/// Application state
struct AppState {
    bedrock_client: aws_sdk_bedrockagentruntime::Client,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        Ok(Self {
            bedrock_client: aws_sdk_bedrockagentruntime::Client::new(&config),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Agent request: {} {}", method, path);

    match (method, path) {
        ("OPTIONS", _) => preflight_response(),

        ("GET", "/") | ("GET", "/health") => json_response(
            200,
            &serde_json::json!({ "status": "ok", "service": "invoke-agent" }),
        ),

        ("POST", "/invoke-agent") => invoke_agent(state, event).await,

        ("GET", _) | ("POST", _) => error_response(404, "Not found"),

        _ => error_response(405, "Method not allowed"),
    }
}

async fn invoke_agent(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let request: InvokeRequest = parse_body!(event.body());

    let input_text = match request.input_text {
        Some(text) if !text.trim().is_empty() => text,
        _ => return error_response(400, "inputText is required"),
    };

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return error_response(e.status_code(), e.to_string());
        }
    };

    // Generate a session ID when the caller didn't send one so the
    // conversation can be continued.
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let enable_trace = request.enable_trace.unwrap_or(false);

    info!(session_id = %session_id, enable_trace, "Invoking support agent");

    let agent = AgentClient::new(
        state.bedrock_client.clone(),
        config.agent_id,
        config.agent_alias_id,
    );

    match agent
        .invoke(AgentRequest {
            input_text,
            session_id,
            session_attributes: request.session_attributes,
            enable_trace,
        })
        .await
    {
        Ok(reply) => {
            info!(
                session_id = %reply.session_id,
                completion_len = reply.completion.len(),
                citations = reply.citations.len(),
                "Agent invocation complete"
            );
            json_response(200, &reply)
        }
        Err(e) => {
            error!("Agent invocation failed: {}", e);
            error_response(e.status_code(), e.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, path: &str, body: &str) -> Request {
        lambda_http::http::Request::builder()
            .method(method)
            .uri(path)
            .body(Body::from(body))
            .unwrap()
    }

    async fn state() -> Arc<AppState> {
        Arc::new(AppState::new().await.unwrap())
    }

    fn body_text(response: &Response<Body>) -> &str {
        match response.body() {
            Body::Text(text) => text,
            _ => panic!("expected text body"),
        }
    }

    fn assert_cors(response: &Response<Body>) {
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let response = handler(state().await, request("GET", "/health", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_cors(&response);
        assert!(body_text(&response).contains("ok"));
    }

    #[tokio::test]
    async fn test_preflight_returns_204_with_cors() {
        let response = handler(state().await, request("OPTIONS", "/invoke-agent", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), 204);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404_with_cors() {
        let response = handler(state().await, request("GET", "/nope", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_wrong_method_returns_405() {
        let response = handler(state().await, request("DELETE", "/invoke-agent", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), 405);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_invalid_json_returns_400() {
        let response = handler(state().await, request("POST", "/invoke-agent", "{oops"))
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_blank_input_text_returns_400() {
        let response = handler(
            state().await,
            request("POST", "/invoke-agent", r#"{"inputText": "   "}"#),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 400);
        assert_cors(&response);
        assert!(body_text(&response).contains("inputText"));
    }

    #[tokio::test]
    async fn test_missing_input_text_returns_400() {
        let response = handler(
            state().await,
            request("POST", "/invoke-agent", r#"{"sessionId": "abc"}"#),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 400);
        assert_cors(&response);
    }
}
