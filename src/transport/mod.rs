// Transport module - THE WIRE (abstract)
// Peers are contacted through an external client; only its contract lives here

mod client;

pub use client::{ConnectCall, ConnectError, MockTransport, TransportClient};
