//! OpenAI-compatible model client.
//!
//! This crate implements the [`LanguageModel`](chat_core::LanguageModel) and
//! [`ImageModel`](chat_core::ImageModel) traits over the OpenAI chat
//! completions and image generation APIs. DeepSeek speaks the same protocol
//! and is selected by the `deepseek-` identifier prefix.
//!
//! # Features
//!
//! - Single completions and SSE streaming with whole tool calls
//! - Tool declarations and tool result round trips
//! - Image generation returning base64 payloads
//! - Model catalog for the browser's model picker
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use chat_core::{CompletionRequest, CoreMessage, ModelProvider};
//! use model_provider::Providers;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let providers = Providers::from_env()?;
//!     let model = providers.language_model("gpt-4o-mini")?;
//!     let completion = model
//!         .complete(CompletionRequest::new(vec![CoreMessage::user("Hello")]))
//!         .await?;
//!     println!("{}", completion.text);
//!     Ok(())
//! }
//! ```

mod api_types;
pub mod catalog;
mod client;
mod config;
mod convert;
mod provider;
mod sse;

pub use catalog::{find_model, model_or_default, ModelInfo, DEFAULT_MODEL_ID, MODELS};
pub use client::{OpenAiImageModel, OpenAiModel};
pub use config::{ProviderConfig, ProvidersConfig};
pub use provider::Providers;
