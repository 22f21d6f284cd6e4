// Infrastructure layer - External dependencies and adapters
pub mod api_client;
pub mod auth;
pub mod config;
pub mod local_store;
