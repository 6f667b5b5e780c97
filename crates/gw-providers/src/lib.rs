pub mod test_double;
pub mod traits;

pub use traits::{
    LlmProvider, LlmRequest, LlmResponse, SttProvider, SttRequest, SttResponse, TtsProvider,
    TtsRequest, TtsResponse,
};
