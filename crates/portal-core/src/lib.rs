pub mod config;
pub mod consents;
pub mod error;
pub mod identity;
pub mod ids;
pub mod notifications;
pub mod processes;
pub mod registration;
pub mod store;
pub mod subscriptions;
pub mod telemetry;
