// Adapters layer: concrete implementations for external systems (databases, http).

pub mod database;
pub mod http;
