pub mod analyzer;
pub mod client;
pub mod prompts;
pub mod types;

pub use analyzer::*;
pub use client::*;
pub use prompts::PromptTemplate;
pub use types::*;
