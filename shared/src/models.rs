//! Shared data models for the support-bot adapters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request forwarded to the Bedrock support agent.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// User's message
    pub input_text: String,
    /// Conversation/session ID
    pub session_id: String,
    /// Attributes forwarded into the agent session state
    pub session_attributes: Option<HashMap<String, String>>,
    /// Whether to collect trace events from the stream
    pub enable_trace: bool,
}

/// Completed agent exchange, assembled from the response stream.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    /// Completion text, chunks concatenated in arrival order
    pub completion: String,
    /// Session ID the exchange ran under
    pub session_id: String,
    /// Knowledge-base citations attached to the streamed chunks
    pub citations: Vec<KnowledgeCitation>,
    /// Trace summary, present only when tracing was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<AgentTraceSummary>,
}

/// Citation extracted from a retrieved knowledge-base reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeCitation {
    /// Excerpt of the retrieved passage
    pub excerpt: String,
    /// S3 URI or web URL of the source document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

/// Summary of the trace events observed on the response stream.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTraceSummary {
    /// Orchestration rationale texts in arrival order
    pub rationales: Vec<String>,
    /// Total number of trace events seen
    pub event_count: usize,
}

/// Zendesk ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Urgent,
    High,
    Normal,
    Low,
}

impl TicketPriority {
    /// Wire value used by the Zendesk API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Urgent => "urgent",
            TicketPriority::High => "high",
            TicketPriority::Normal => "normal",
            TicketPriority::Low => "low",
        }
    }
}

/// Support ticket to file in Zendesk.
///
/// Accepts both snake_case and camelCase field names so the same type works
/// for action-group properties and the web widget payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TicketRequest {
    /// Requester email address
    #[serde(alias = "requesterEmail")]
    #[validate(email(message = "requester_email must be a valid email address"))]
    pub requester_email: String,
    /// Ticket subject line
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
    /// Ticket body
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    /// Priority (urgent/high/normal/low)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    /// Tags to attach to the ticket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Connector plugin version, filed as a custom field when configured
    #[serde(default, alias = "pluginVersion", skip_serializing_if = "Option::is_none")]
    pub plugin_version: Option<String>,
    /// Mule runtime version, filed as a custom field when configured
    #[serde(default, alias = "muleRuntime", skip_serializing_if = "Option::is_none")]
    pub mule_runtime: Option<String>,
}

/// Result of a successful ticket creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedTicket {
    /// Zendesk ticket ID
    pub id: u64,
    /// API URL of the created ticket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
