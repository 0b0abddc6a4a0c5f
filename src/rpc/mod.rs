//! The RPC surface shared by the coordinator and the participant (§4.2, §6A).
//!
//! `message` defines the request/response envelope; `wire` frames it onto a
//! `TcpStream`; `client` makes outbound calls with a per-call deadline and the
//! ok/transport-error/deadline-exceeded trichotomy the drivers rely on;
//! `server` runs the accept loop each side's binary starts.

pub mod client;
pub mod message;
pub mod server;
pub mod wire;

pub use message::{RpcRequest, RpcResponse, TxId};
