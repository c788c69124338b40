//! LLM backend adapters, quota fallback, and request routing.

mod anthropic;
mod error;
mod fallback;
mod gemini;
mod openai;
mod provider;
mod router;
mod types;

pub use anthropic::AnthropicProvider;
pub use error::LLMError;
pub use fallback::{FallbackChain, GEMINI_FALLBACK_MODELS};
pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
pub use provider::{LLMProvider, Provider};
pub use router::ProviderRouter;
pub use types::{CompletionRequest, Issue, IssueKind, Message, Role, StructuredReview};
