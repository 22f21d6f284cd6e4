// Domain layer - Records, series and pure derivations
pub mod aggregate;
pub mod analytics;
pub mod filter;
pub mod hierarchy;
pub mod record;
pub mod series;
pub mod settings;
