pub mod base_client;
pub mod store_client;

pub use base_client::BaseClient;
pub use store_client::{routes, StoreApiClient};
