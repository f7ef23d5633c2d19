//! Tool domain module
//!
//! This module defines the core abstractions for **tools**: named external
//! capabilities that plan steps are executed against.
//!
//! # Overview
//!
//! ```text
//! ┌────────────────┐    ┌─────────────────┐    ┌────────────────┐
//! │ ToolDescriptor │───▶│ ToolCallRequest │───▶│ ToolCallResult │
//! │ (registration) │    │ (invocation)    │    │ (outcome)      │
//! └────────────────┘    └─────────────────┘    └────────────────┘
//!         ▲
//!         └── ToolHandler::descriptor()
//! ```
//!
//! Every handler is registered once at startup through an explicit list; there
//! is no runtime discovery. Each handler declares its input shape as a JSON
//! schema in its [`ToolDescriptor`] and performs its own typed deserialization
//! through [`parse_arguments`], so a malformed argument blob becomes a
//! [`ToolErrorKind::InvalidArguments`] result instead of a crash.
//!
//! # Error kinds
//!
//! | Kind | Raised by | Surfaced as |
//! |------|-----------|-------------|
//! | `UnknownTool` | registry lookup | protocol error `-32602` |
//! | `InvalidArguments` | schema check / handler deserialization | protocol error `-32602` |
//! | `ExecutionFailure` | handler body | failed [`ToolCallResult`] / `-32603` |
//! | `Timeout` / `Cancelled` | dispatcher proxy | failed execution record |
//!
//! # Architecture
//!
//! - **Domain** (this module): descriptors, results, the handler trait
//! - **Application** (`ToolDispatcherPort`): the proxy the orchestration loop calls
//! - **Infrastructure** (`ToolRegistry`): registration, routing and JSON-RPC framing

pub mod entities;
pub mod handler;
pub mod value_objects;

pub use entities::{ToolCallRequest, ToolDescriptor};
pub use handler::{ToolHandler, parse_arguments};
pub use value_objects::{ToolCallResult, ToolError, ToolErrorKind};
