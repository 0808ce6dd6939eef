// Endpoint module - HOW TO REACH A PEER
// Parses advertised endpoint descriptors into connectivity info

mod bma;

pub use bma::{BmaEndpoint, BMA_API, DEFAULT_BMA_PORT};
