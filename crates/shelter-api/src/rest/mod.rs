// REST table surface
//
// Row-oriented access to the backend's `/rest/v1/{table}` endpoints.
// Rows travel as `serde_json::Value`; typing them is the caller's job.

mod client;
mod query;

pub use client::RestClient;
pub use query::{Filter, FilterOp, Order, Query};
