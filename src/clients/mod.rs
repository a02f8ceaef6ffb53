pub mod llm_client;
pub mod provider;

pub use llm_client::LlmClient;
pub use provider::{ChatRequest, LlmProvider};
