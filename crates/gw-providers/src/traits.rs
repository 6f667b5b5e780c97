use async_trait::async_trait;
use gw_domain::Result;

/// Speech-to-text request: one buffered audio segment for a call turn.
#[derive(Debug, Clone)]
pub struct SttRequest {
    pub call_id: String,
    pub audio: Vec<u8>,
    pub sample_rate: u32,
}

#[derive(Debug, Clone)]
pub struct SttResponse {
    pub text: String,
    pub confidence: f32,
}

/// Speech-to-text is an external collaborator: the gateway calls out to a
/// provider-hosted recognizer and never implements recognition itself.
#[async_trait]
pub trait SttProvider: Send + Sync {
    async fn transcribe(&self, req: SttRequest) -> Result<SttResponse>;
}

/// A single turn's conversational context handed to the LLM.
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub call_id: String,
    /// Prior turns, oldest first, already windowed to the configured
    /// context size (spec §4.4 `context_window_size`).
    pub history: Vec<(String, String)>,
    pub user_text: String,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
}

/// Response generation is an external collaborator (spec §1 Non-goals).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, req: LlmRequest) -> Result<LlmResponse>;
}

#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub call_id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TtsResponse {
    pub audio: Vec<u8>,
    pub sample_rate: u32,
}

/// Speech synthesis is an external collaborator (spec §1 Non-goals).
#[async_trait]
pub trait TtsProvider: Send + Sync {
    async fn synthesize(&self, req: TtsRequest) -> Result<TtsResponse>;
}
