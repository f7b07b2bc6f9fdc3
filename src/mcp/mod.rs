//! Model Context Protocol (MCP) client over streamable HTTP
//!
//! Provides the JSON-RPC envelopes, the per-scan session state, the HTTP
//! transport with SSE normalization, the lifecycle handshake and the
//! capability enumerator.

pub mod enumerator;
pub mod handshake;
pub mod rpc;
pub mod session;
pub mod transport;
