// despacho-api: Async Rust client for the assistance dispatch REST API

pub mod auth;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod models;
pub mod resources;
pub mod transport;

pub use auth::{Credentials, LoginOutcome};
pub use envelope::{Page, Probe};
pub use error::Error;
pub use gateway::Gateway;
pub use transport::{TlsMode, TransportConfig};
