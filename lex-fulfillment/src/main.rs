//! Lex Fulfillment Lambda - voice/chat front end for the support bot.
//!
//! Lex V2 owns the event and response schema; this function only pattern
//! matches on the intent name, optionally asks the Bedrock agent, and fills
//! in `dialogAction`/`messages`. Failures never propagate to Lex as thrown
//! errors - the intent is closed as `Failed` with an apology instead.

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shared::agent::AgentClient;
use shared::config::AgentConfig;
use shared::models::AgentRequest;

const GREETING_MESSAGE: &str = "Hi! I'm the Datadog-MuleSoft integration assistant. \
    Ask me anything about setup, monitoring or troubleshooting, and I'll check the \
    knowledge base for you.";

const HELP_MESSAGE: &str = "I can answer questions about the Datadog-MuleSoft \
    integration - installation, configuration, dashboards and troubleshooting. \
    If I can't resolve your issue, ask me to create a support ticket.";

const TICKET_GUIDANCE_MESSAGE: &str = "I can escalate this to the support team. \
    Tell me your email address, a short subject and a description of the problem, \
    and I'll file the ticket for you.";

const UNKNOWN_INTENT_MESSAGE: &str = "I'm not sure how to help with that. \
    Try asking a question about the Datadog-MuleSoft integration, or say 'help'.";

const APOLOGY_MESSAGE: &str = "I'm sorry, I couldn't reach the knowledge base just \
    now. Please try again in a moment.";

const NO_ANSWER_MESSAGE: &str = "I couldn't find an answer for that in the \
    knowledge base. You can rephrase the question or ask me to create a ticket.";

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

async fn handler(state: Arc<AppState>, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, _context) = event.into_parts();

    let intent = payload
        .pointer("/sessionState/intent/name")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    info!(intent = %intent, "Handling Lex fulfillment");

    let response = match intent.as_str() {
        "Greeting" => close(&payload, &intent, "Fulfilled", GREETING_MESSAGE),
        "Help" => close(&payload, &intent, "Fulfilled", HELP_MESSAGE),
        "SupportQuestion" | "FallbackIntent" => answer_question(&state, &payload, &intent).await,
        "CreateSupportTicket" => close(&payload, &intent, "Fulfilled", TICKET_GUIDANCE_MESSAGE),
        _ => close(&payload, &intent, "Fulfilled", UNKNOWN_INTENT_MESSAGE),
    };

    Ok(response)
}

/// Forward the transcript to the Bedrock agent, reusing the Lex session ID
/// so the agent keeps conversation context across turns.
async fn answer_question(state: &AppState, payload: &Value, intent: &str) -> Value {
    let transcript = payload
        .get("inputTranscript")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();

    if transcript.is_empty() {
        return close(payload, intent, "Fulfilled", UNKNOWN_INTENT_MESSAGE);
    }

    let session_id = payload
        .get("sessionId")
        .and_then(Value::as_str)
        .unwrap_or("lex-session")
        .to_string();

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return close(payload, intent, "Failed", APOLOGY_MESSAGE);
        }
    };

    let agent = AgentClient::new(
        state.bedrock_client.clone(),
        config.agent_id,
        config.agent_alias_id,
    );

    match agent
        .invoke(AgentRequest {
            input_text: transcript,
            session_id,
            session_attributes: None,
            enable_trace: false,
        })
        .await
    {
        Ok(reply) if !reply.completion.trim().is_empty() => {
            close(payload, intent, "Fulfilled", &reply.completion)
        }
        Ok(_) => close(payload, intent, "Fulfilled", NO_ANSWER_MESSAGE),
        Err(e) => {
            error!("Agent invocation failed: {}", e);
            close(payload, intent, "Failed", APOLOGY_MESSAGE)
        }
    }
}

/// Build a Lex V2 Close response with one PlainText message, echoing the
/// session attributes back.
fn close(payload: &Value, intent: &str, state: &str, message: &str) -> Value {
    let session_attributes = payload
        .pointer("/sessionState/sessionAttributes")
        .cloned()
        .unwrap_or_else(|| json!({}));

    json!({
        "sessionState": {
            "dialogAction": { "type": "Close" },
            "intent": {
                "name": intent,
                "state": state
            },
            "sessionAttributes": session_attributes
        },
        "messages": [
            {
                "contentType": "PlainText",
                "content": message
            }
        ]
    })
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

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;

    async fn state() -> Arc<AppState> {
        Arc::new(AppState::new().await.unwrap())
    }

    fn lex_event(intent: &str, transcript: &str) -> Value {
        json!({
            "sessionId": "lex-session-1",
            "inputTranscript": transcript,
            "sessionState": {
                "sessionAttributes": { "channel": "web" },
                "intent": { "name": intent, "state": "InProgress" }
            }
        })
    }

    fn assert_close_shape(response: &Value, intent: &str, state: &str) {
        assert_eq!(response["sessionState"]["dialogAction"]["type"], "Close");
        assert_eq!(response["sessionState"]["intent"]["name"], intent);
        assert_eq!(response["sessionState"]["intent"]["state"], state);
        assert_eq!(response["messages"][0]["contentType"], "PlainText");
        assert!(!response["messages"][0]["content"]
            .as_str()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_greeting_intent_is_static_fulfilled() {
        let response = handler(
            state().await,
            LambdaEvent::new(lex_event("Greeting", "hello"), Context::default()),
        )
        .await
        .unwrap();

        assert_close_shape(&response, "Greeting", "Fulfilled");
        assert_eq!(
            response["sessionState"]["sessionAttributes"]["channel"],
            "web"
        );
    }

    #[tokio::test]
    async fn test_help_intent_mentions_tickets() {
        let response = handler(
            state().await,
            LambdaEvent::new(lex_event("Help", "help"), Context::default()),
        )
        .await
        .unwrap();

        assert_close_shape(&response, "Help", "Fulfilled");
        assert!(response["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("ticket"));
    }

    #[tokio::test]
    async fn test_create_ticket_intent_returns_guidance() {
        let response = handler(
            state().await,
            LambdaEvent::new(
                lex_event("CreateSupportTicket", "open a ticket"),
                Context::default(),
            ),
        )
        .await
        .unwrap();

        assert_close_shape(&response, "CreateSupportTicket", "Fulfilled");
        assert!(response["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("email"));
    }

    #[tokio::test]
    async fn test_unknown_intent_gets_polite_fallback() {
        let response = handler(
            state().await,
            LambdaEvent::new(lex_event("OrderPizza", "pepperoni"), Context::default()),
        )
        .await
        .unwrap();

        assert_close_shape(&response, "OrderPizza", "Fulfilled");
    }

    #[tokio::test]
    async fn test_empty_transcript_never_calls_the_agent() {
        let response = handler(
            state().await,
            LambdaEvent::new(lex_event("SupportQuestion", "   "), Context::default()),
        )
        .await
        .unwrap();

        assert_close_shape(&response, "SupportQuestion", "Fulfilled");
    }

    #[test]
    fn test_close_echoes_missing_session_attributes_as_empty_map() {
        let response = close(&json!({}), "Greeting", "Fulfilled", "hi");
        assert_eq!(response["sessionState"]["sessionAttributes"], json!({}));
    }
}
