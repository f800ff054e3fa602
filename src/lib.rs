pub mod auth;
pub mod content;
pub mod context;
pub mod credentials;
pub mod error;
pub mod models;
pub mod openapi;
pub mod repo;
pub mod resolve;
pub mod routes;
pub mod seed;
pub mod settings;
pub mod users;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
pub use settings::Settings;
