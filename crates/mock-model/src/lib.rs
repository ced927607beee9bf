//! Mock model implementations for chat turns.
//!
//! This crate provides mock implementations of the model traits for testing:
//! - `EchoModel` - Answers with the last user message
//! - `ScriptedModel` - Plays back scripted text and tool-call steps
//! - `StaticImageModel` - Returns a fixed image
//! - `MockProvider` - Serves any of the above by model identifier
//!
//! For production use, see the `model-provider` crate.
//!
//! # Example
//!
//! ```rust
//! use chat_core::{CompletionRequest, CoreMessage, LanguageModel};
//! use mock_model::EchoModel;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), chat_core::ModelError> {
//!     let model = EchoModel::new();
//!
//!     let request = CompletionRequest::new(vec![CoreMessage::user("Hello!")]);
//!     let completion = model.complete(request).await?;
//!     println!("Response: {}", completion.text);
//!     Ok(())
//! }
//! ```

mod echo;
mod provider;
mod scripted;

pub use echo::EchoModel;
pub use provider::{MockProvider, StaticImageModel};
pub use scripted::{ScriptedModel, Step};
