//! Test helper modules for cxperia-server integration tests

pub mod test_server;

pub use test_server::{json_request, TestServer};
