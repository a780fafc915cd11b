//! CyberDash client library exports.

pub mod api_client;
pub mod commands;
pub mod config;
pub mod deep_link;
pub mod error;
pub mod settings;
pub mod state;
pub mod store;
pub mod transcript;
