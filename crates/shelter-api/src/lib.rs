// shelter-api: Async Rust client for the shelter backend (REST tables + realtime feed)

pub mod error;
pub mod realtime;
pub mod rest;
pub mod transport;

pub use error::Error;
pub use realtime::{ChangeMessage, ChangeOp, RealtimeHandle, ReconnectConfig};
pub use rest::{Filter, FilterOp, Order, Query, RestClient};
pub use transport::{TlsMode, TransportConfig};
