// Domain layer: shared models, API payloads and the database port.

pub mod model;
pub mod ports;
pub mod resources;
