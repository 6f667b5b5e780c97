//! Deterministic in-memory stand-ins for the external STT/LLM/TTS
//! collaborators, used by orchestrator tests so a turn can be driven
//! end-to-end without a network dependency.

use async_trait::async_trait;
use gw_domain::Result;

use crate::traits::{
    LlmProvider, LlmRequest, LlmResponse, SttProvider, SttRequest, SttResponse, TtsProvider,
    TtsRequest, TtsResponse,
};

/// Echoes back a fixed transcript with a configurable confidence.
pub struct EchoSttProvider {
    pub transcript: String,
    pub confidence: f32,
}

impl EchoSttProvider {
    pub fn new(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
        }
    }
}

#[async_trait]
impl SttProvider for EchoSttProvider {
    async fn transcribe(&self, _req: SttRequest) -> Result<SttResponse> {
        Ok(SttResponse {
            text: self.transcript.clone(),
            confidence: self.confidence,
        })
    }
}

/// Replies with a fixed acknowledgement, echoing the user's text for
/// assertions in tests that check turn plumbing rather than LLM quality.
pub struct EchoLlmProvider;

#[async_trait]
impl LlmProvider for EchoLlmProvider {
    async fn generate(&self, req: LlmRequest) -> Result<LlmResponse> {
        let text = format!("you said: {}", req.user_text);
        let tokens_in = req.user_text.split_whitespace().count() as u32;
        let tokens_out = text.split_whitespace().count() as u32;
        Ok(LlmResponse {
            text,
            tokens_in,
            tokens_out,
        })
    }
}

/// Synthesizes a fixed-size silent PCM buffer proportional to text length.
pub struct SilentTtsProvider {
    pub sample_rate: u32,
}

impl Default for SilentTtsProvider {
    fn default() -> Self {
        Self { sample_rate: 8_000 }
    }
}

#[async_trait]
impl TtsProvider for SilentTtsProvider {
    async fn synthesize(&self, req: TtsRequest) -> Result<TtsResponse> {
        let audio = vec![0u8; req.text.len() * 160];
        Ok(TtsResponse {
            audio,
            sample_rate: self.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_stt_returns_fixed_transcript() {
        let provider = EchoSttProvider::new("hello there", 0.92);
        let resp = provider
            .transcribe(SttRequest {
                call_id: "call-1".into(),
                audio: vec![],
                sample_rate: 8_000,
            })
            .await
            .unwrap();
        assert_eq!(resp.text, "hello there");
        assert_eq!(resp.confidence, 0.92);
    }

    #[tokio::test]
    async fn echo_llm_echoes_user_text() {
        let resp = EchoLlmProvider
            .generate(LlmRequest {
                call_id: "call-1".into(),
                history: vec![],
                user_text: "what time is it".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.text, "you said: what time is it");
        assert_eq!(resp.tokens_in, 4);
    }

    #[tokio::test]
    async fn silent_tts_scales_with_text_length() {
        let resp = SilentTtsProvider::default()
            .synthesize(TtsRequest {
                call_id: "call-1".into(),
                text: "hi".into(),
            })
            .await
            .unwrap();
        assert_eq!(resp.audio.len(), 2 * 160);
        assert_eq!(resp.sample_rate, 8_000);
    }
}
