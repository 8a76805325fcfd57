//! Configuration management for Lambda functions.
//!
//! Configuration is read per invocation so a missing variable surfaces as an
//! error response rather than a crashed cold start. Constructors take an
//! injectable lookup so the missing-variable messages are unit-testable.

use std::env;

use crate::{Error, Result};

/// Bedrock agent coordinates for InvokeAgent calls.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Bedrock agent ID
    pub agent_id: String,
    /// Bedrock agent alias ID
    pub agent_alias_id: String,
}

impl AgentConfig {
    /// Load from `BEDROCK_AGENT_ID` / `BEDROCK_AGENT_ALIAS_ID`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load using the given variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            agent_id: require(&lookup, "BEDROCK_AGENT_ID")?,
            agent_alias_id: require(&lookup, "BEDROCK_AGENT_ALIAS_ID")?,
        })
    }
}

/// Location of the Zendesk credentials secret.
#[derive(Debug, Clone)]
pub struct ZendeskConfig {
    /// Name or ARN of the Secrets Manager secret holding the credentials
    pub secret_name: String,
}

impl ZendeskConfig {
    /// Load from `ZENDESK_SECRET_NAME`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load using the given variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            secret_name: require(&lookup, "ZENDESK_SECRET_NAME")?,
        })
    }
}

fn require<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| Error::Config(format!("{} not set", name)))
}
