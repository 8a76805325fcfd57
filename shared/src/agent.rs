//! Bedrock agent client for the support bot.
//!
//! `InvokeAgent` responds with an event stream; callers here want a single
//! document, so the stream is drained to completion through a
//! [`StreamAccumulator`] before anything is returned.

use aws_sdk_bedrockagentruntime::types::{
    Citation, PayloadPart, ResponseStream, RetrievalResultLocation, SessionState, TracePart,
};
use aws_sdk_bedrockagentruntime::Client as BedrockAgentClient;
use tracing::debug;

use crate::models::{AgentReply, AgentRequest, AgentTraceSummary, KnowledgeCitation};
use crate::{Error, Result};

/// Client for invoking the Bedrock support agent.
pub struct AgentClient {
    /// Bedrock agent runtime client
    client: BedrockAgentClient,
    /// Bedrock agent ID
    agent_id: String,
    /// Bedrock agent alias ID
    agent_alias_id: String,
}

impl AgentClient {
    /// Create a new agent client.
    pub fn new(client: BedrockAgentClient, agent_id: String, agent_alias_id: String) -> Self {
        Self {
            client,
            agent_id,
            agent_alias_id,
        }
    }

    /// Invoke the agent and drain the response stream into a single reply.
    ///
    /// Exactly one outbound call; a stream error fails the whole invocation.
    pub async fn invoke(&self, request: AgentRequest) -> Result<AgentReply> {
        let mut builder = self
            .client
            .invoke_agent()
            .agent_id(&self.agent_id)
            .agent_alias_id(&self.agent_alias_id)
            .session_id(&request.session_id)
            .input_text(&request.input_text)
            .enable_trace(request.enable_trace);

        if let Some(attributes) = &request.session_attributes {
            let session_state = SessionState::builder()
                .set_session_attributes(Some(attributes.clone()))
                .build();
            builder = builder.session_state(session_state);
        }

        let output = builder
            .send()
            .await
            .map_err(|e| Error::aws("Failed to invoke agent", e))?;

        let mut completion = output.completion;
        let mut accumulator = StreamAccumulator::new(request.enable_trace);

        while let Some(event) = completion
            .recv()
            .await
            .map_err(|e| Error::aws("Agent response stream failed", e))?
        {
            accumulator.absorb(&event);
        }

        Ok(accumulator.into_reply(request.session_id))
    }
}

/// Folds agent response stream events into a single reply.
///
/// Chunk text is appended in arrival order; citations and rationales
/// accumulate independently of the chunk text.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    completion: String,
    citations: Vec<KnowledgeCitation>,
    rationales: Vec<String>,
    trace_events: usize,
    unknown_events: usize,
    collect_trace: bool,
}

impl StreamAccumulator {
    /// Create an accumulator; the trace summary is kept only when requested.
    pub fn new(collect_trace: bool) -> Self {
        Self {
            collect_trace,
            ..Self::default()
        }
    }

    /// Fold one stream event into the accumulated state.
    ///
    /// Event kinds this adapter doesn't handle are counted and ignored,
    /// never fatal.
    pub fn absorb(&mut self, event: &ResponseStream) {
        match event {
            ResponseStream::Chunk(part) => self.absorb_chunk(part),
            ResponseStream::Trace(part) => self.absorb_trace(part),
            _ => {
                self.unknown_events += 1;
                debug!(count = self.unknown_events, "Ignoring unhandled agent stream event");
            }
        }
    }

    /// Finish accumulation and produce the reply.
    pub fn into_reply(self, session_id: String) -> AgentReply {
        let StreamAccumulator {
            completion,
            citations,
            rationales,
            trace_events,
            collect_trace,
            ..
        } = self;

        let trace = collect_trace.then_some(AgentTraceSummary {
            rationales,
            event_count: trace_events,
        });

        AgentReply {
            completion,
            session_id,
            citations,
            trace,
        }
    }

    fn absorb_chunk(&mut self, part: &PayloadPart) {
        if let Some(bytes) = part.bytes() {
            self.completion
                .push_str(&String::from_utf8_lossy(bytes.as_ref()));
        }

        if let Some(attribution) = part.attribution() {
            for citation in attribution.citations() {
                self.absorb_citation(citation);
            }
        }
    }

    fn absorb_citation(&mut self, citation: &Citation) {
        for reference in citation.retrieved_references() {
            let excerpt = reference
                .content()
                .map(|content| content.text())
                .unwrap_or_default()
                .to_string();

            self.citations.push(KnowledgeCitation {
                excerpt,
                source_uri: reference.location().and_then(source_uri),
            });
        }
    }

    fn absorb_trace(&mut self, part: &TracePart) {
        self.trace_events += 1;

        if !self.collect_trace {
            return;
        }

        let rationale = part
            .trace()
            .and_then(|trace| trace.as_orchestration_trace().ok())
            .and_then(|orchestration| orchestration.as_rationale().ok())
            .and_then(|rationale| rationale.text());

        if let Some(text) = rationale {
            self.rationales.push(text.to_string());
        }
    }
}

fn source_uri(location: &RetrievalResultLocation) -> Option<String> {
    if let Some(s3) = location.s3_location() {
        return s3.uri().map(str::to_string);
    }

    location
        .web_location()
        .and_then(|web| web.url())
        .map(str::to_string)
}
