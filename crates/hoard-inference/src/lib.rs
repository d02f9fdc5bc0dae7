//! # hoard-inference
//!
//! Chat-completion inference backends for hoard.
//!
//! This crate provides:
//! - An OpenAI-compatible backend implementing `GenerationBackend`
//! - A scripted mock backend (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use hoard_inference::OpenAIBackend;
//! use hoard_inference::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::from_env().unwrap();
//!     let reply = backend
//!         .generate_json(r#"Respond with {"tags": ["example"]}"#)
//!         .await
//!         .unwrap();
//!     println!("{:?}", reply);
//! }
//! ```

pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use hoard_core::*;

pub use openai::{OpenAIBackend, OpenAIConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerationBackend;
