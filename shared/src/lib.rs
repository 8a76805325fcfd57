//! Shared library for NovaBot Lambda functions.
//!
//! This crate provides the common error/config/model types and the Bedrock
//! agent and Zendesk clients used across the Lambda adapters.

pub mod agent;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod secrets;
pub mod zendesk;

pub use agent::{AgentClient, StreamAccumulator};
pub use config::{AgentConfig, ZendeskConfig};
pub use error::{Error, Result};
pub use models::{
    AgentReply, AgentRequest, AgentTraceSummary, CreatedTicket, KnowledgeCitation, TicketPriority,
    TicketRequest,
};
pub use secrets::{get_secret, get_zendesk_credentials};
pub use zendesk::{ZendeskClient, ZendeskCredentials};
