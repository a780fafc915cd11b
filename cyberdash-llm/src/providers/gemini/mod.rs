//! Gemini provider implementation
//!
//! Multi-turn text generation against the Generative Language
//! `generateContent` endpoint.

pub mod client;
pub mod provider;
pub mod types;

pub use client::GeminiClient;
pub use provider::GeminiChatProvider;
