//! JSON-RPC tool dispatch
//!
//! - [`protocol`]: frame types and error codes
//! - [`server`]: request handling over a [`ToolRegistry`](crate::tools::ToolRegistry)
//!   and the line-delimited server loop
//! - [`proxy`]: [`ToolDispatcherPort`](pmcro_application::ToolDispatcherPort)
//!   adapters for in-process and HTTP peers

pub mod protocol;
pub mod proxy;
pub mod server;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, ServerInfo};
pub use proxy::{HttpDispatcher, InProcessDispatcher};
pub use server::ToolServer;
