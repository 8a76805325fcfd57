//! Zendesk Ticket Lambda - files support tickets for escalated conversations.
//!
//! The same function is wired three ways: as a Bedrock agent action group,
//! as an API Gateway proxy integration, and for direct invocation. The
//! envelope is detected per event and the response is shaped to match.

use std::collections::HashMap;
use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use validator::Validate;

use shared::config::ZendeskConfig;
use shared::models::{CreatedTicket, TicketRequest};
use shared::secrets::get_zendesk_credentials;
use shared::zendesk::ZendeskClient;

/// Bedrock agent action group event (simplified)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionGroupEvent {
    action_group: String,
    #[serde(default)]
    api_path: String,
    #[serde(default)]
    http_method: String,
    #[serde(default)]
    parameters: Vec<NamedValue>,
    #[serde(default)]
    request_body: Option<RequestBody>,
    #[serde(default)]
    session_attributes: Option<HashMap<String, String>>,
    #[serde(default)]
    prompt_session_attributes: Option<HashMap<String, String>>,
}

/// Name/value pair as the agent passes parameters and properties.
#[derive(Debug, Deserialize)]
struct NamedValue {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct RequestBody {
    #[serde(default)]
    content: HashMap<String, ContentBody>,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    #[serde(default)]
    properties: Vec<NamedValue>,
}

/// API Gateway proxy request (simplified)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGatewayRequest {
    body: Option<String>,
    is_base64_encoded: Option<bool>,
}

/// API Gateway proxy response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGatewayResponse {
    status_code: u16,
    headers: HashMap<String, String>,
    body: String,
    is_base64_encoded: bool,
}

impl ApiGatewayResponse {
    fn json<T: Serialize>(status_code: u16, data: &T) -> Result<Self, Error> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());

        Ok(Self {
            status_code,
            headers,
            body: serde_json::to_string(data)?,
            is_base64_encoded: false,
        })
    }
}

/// Application state
struct AppState {
    secrets_client: aws_sdk_secretsmanager::Client,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        Ok(Self {
            secrets_client: aws_sdk_secretsmanager::Client::new(&config),
        })
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, _context) = event.into_parts();

    // Action group events carry messageVersion + actionGroup.
    if payload.get("messageVersion").is_some() && payload.get("actionGroup").is_some() {
        let event: ActionGroupEvent = serde_json::from_value(payload)?;
        return handle_action_group(state, event).await;
    }

    // API Gateway proxy events carry the JSON payload inside `body`.
    if payload.get("body").is_some() {
        let request: ApiGatewayRequest = serde_json::from_value(payload)?;
        return handle_api_gateway(state, request).await;
    }

    // Otherwise the payload is the ticket itself.
    handle_direct(state, payload).await
}

async fn handle_action_group(state: Arc<AppState>, event: ActionGroupEvent) -> Result<Value, Error> {
    info!(
        action_group = %event.action_group,
        api_path = %event.api_path,
        "Processing action group ticket request"
    );

    let ticket = ticket_from_action_group(&event);
    let (status, payload) = ticket_outcome(&state, ticket).await;

    Ok(json!({
        "messageVersion": "1.0",
        "response": {
            "actionGroup": event.action_group,
            "apiPath": event.api_path,
            "httpMethod": event.http_method,
            "httpStatusCode": status,
            "responseBody": {
                "application/json": { "body": payload.to_string() }
            }
        },
        "sessionAttributes": event.session_attributes.unwrap_or_default(),
        "promptSessionAttributes": event.prompt_session_attributes.unwrap_or_default(),
    }))
}

async fn handle_api_gateway(state: Arc<AppState>, request: ApiGatewayRequest) -> Result<Value, Error> {
    info!("Processing API Gateway ticket request");

    let ticket = ticket_from_api_gateway(&request);
    let (status, payload) = ticket_outcome(&state, ticket).await;

    Ok(serde_json::to_value(ApiGatewayResponse::json(status, &payload)?)?)
}

async fn handle_direct(state: Arc<AppState>, payload: Value) -> Result<Value, Error> {
    info!("Processing direct ticket request");

    let ticket = serde_json::from_value(payload)
        .map_err(|e| shared::Error::Validation(format!("Invalid ticket payload: {}", e)));
    let (_status, payload) = ticket_outcome(&state, ticket).await;

    Ok(payload)
}

/// Run the ticket pipeline and shape the outcome as (status, JSON payload).
async fn ticket_outcome(
    state: &AppState,
    ticket: shared::Result<TicketRequest>,
) -> (u16, Value) {
    let result = match ticket {
        Ok(ticket) => create_ticket(state, &ticket).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(created) => {
            let mut payload = json!({ "ticketId": created.id, "status": "created" });
            if let Some(url) = created.url {
                payload["url"] = json!(url);
            }
            (200, payload)
        }
        Err(e) => {
            error!("Ticket creation failed: {}", e);
            (e.status_code(), json!({ "error": e.to_string() }))
        }
    }
}

/// Validate, fetch credentials and file the ticket. Credentials are fetched
/// fresh on every invocation so rotation needs no redeploy.
async fn create_ticket(state: &AppState, ticket: &TicketRequest) -> shared::Result<CreatedTicket> {
    ticket
        .validate()
        .map_err(|e| shared::Error::Validation(e.to_string()))?;

    let config = ZendeskConfig::from_env()?;
    let credentials = get_zendesk_credentials(&state.secrets_client, &config.secret_name).await?;
    let client = ZendeskClient::new(&credentials);

    info!(subject = %ticket.subject, "Creating Zendesk ticket");

    client.create_ticket(ticket).await
}

/// Fold action group parameters and request body properties into a ticket.
/// Properties win over parameters when both carry the same name.
fn ticket_from_action_group(event: &ActionGroupEvent) -> shared::Result<TicketRequest> {
    let mut fields: HashMap<&str, &str> = HashMap::new();

    for parameter in &event.parameters {
        fields.insert(parameter.name.as_str(), parameter.value.as_str());
    }

    if let Some(body) = &event.request_body {
        if let Some(content) = body.content.get("application/json") {
            for property in &content.properties {
                fields.insert(property.name.as_str(), property.value.as_str());
            }
        }
    }

    ticket_from_fields(&fields)
}

/// Build a `TicketRequest` from flat string fields. Tags arrive from the
/// agent as one comma-separated string.
fn ticket_from_fields(fields: &HashMap<&str, &str>) -> shared::Result<TicketRequest> {
    let mut object = serde_json::Map::new();

    for (name, value) in fields {
        if *name == "tags" {
            let tags: Vec<String> = value
                .split(',')
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect();
            object.insert((*name).to_string(), json!(tags));
        } else {
            object.insert((*name).to_string(), json!(value));
        }
    }

    serde_json::from_value(Value::Object(object))
        .map_err(|e| shared::Error::Validation(format!("Invalid ticket fields: {}", e)))
}

fn ticket_from_api_gateway(request: &ApiGatewayRequest) -> shared::Result<TicketRequest> {
    let body = request.body.clone().unwrap_or_default();

    let decoded = if request.is_base64_encoded.unwrap_or(false) {
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &body)
            .map_err(|e| shared::Error::Validation(format!("Invalid body encoding: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| shared::Error::Validation(format!("Invalid body encoding: {}", e)))?
    } else {
        body
    };

    serde_json::from_str(&decoded)
        .map_err(|e| shared::Error::Validation(format!("Invalid request body: {}", e)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    lambda_runtime::run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
