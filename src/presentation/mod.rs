// Presentation layer - JSON view models for the display layer
pub mod app_state;
pub mod handlers;
