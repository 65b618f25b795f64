//! Integration test utilities for the client SDK
//!
//! Provides an in-process, scripted mock gateway server that tests drive
//! frame by frame while a real client connects to it over a real WebSocket.

pub mod mock_gateway;

pub use mock_gateway::{GatewayPeer, MockGateway};
