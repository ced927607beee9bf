//! Built-in tool implementations.

mod create_document;
mod draft;
mod request_suggestions;
mod update_document;
mod weather;

pub use create_document::CreateDocument;
pub use request_suggestions::RequestSuggestions;
pub use update_document::UpdateDocument;
pub use weather::GetWeather;
