//! Bidirectional call bridge between Rust host code and a CMake-style
//! command runtime.
//!
//! The runtime exposes named commands taking string arguments, and flat
//! string variables. Through this crate, host code can:
//!
//! - **Invoke** any runtime command by name ([`Bridge::invoke_command`],
//!   [`Bridge::command`]), with plain values quoted by the runtime and
//!   [`uq`] literals passed through as written
//! - **Read** variables, including `;`-encoded lists ([`Bridge::get_list`])
//! - **Export** closures as runtime commands ([`Bridge::export`]); calls to
//!   them come back through the [`DISPATCH_COMMAND`] and [`dispatch`]
//!
//! The runtime itself is an external collaborator implementing
//! [`CommandRuntime`]. It owns the session's [`ExportRegistry`].
//!
//! # Example
//!
//! ```ignore
//! use cmake_bridge::{Bridge, Signature, uq};
//!
//! let bridge = Bridge::new(&runtime);
//! bridge.cmake_minimum_required("3.20")?;
//! bridge.export(Signature::new("greet").param("who"), |bridge, args| {
//!     bridge.invoke_command("message", ["STATUS", &format!("hello {}", args.require(0)?)])?;
//!     Ok(())
//! })?;
//! bridge.invoke_command("greet", ["world"])?;
//! ```
//!
//! # Modules
//!
//! - [`marshal`]: argument kinds and the `;`-list codec
//! - [`runtime`]: the interface the embedding runtime implements
//! - [`proxy`]: outbound calls
//! - [`signature`]: parameter descriptors and callback arguments
//! - [`registry`]: exported-function registry and session configuration
//! - [`export`]: definition synthesis for exported functions
//! - [`dispatch`]: the callback dispatcher and entry-point wrapper
//! - [`stdlib`]: wrappers over common commands

pub mod dispatch;
pub mod error;
pub mod export;
pub mod marshal;
pub mod proxy;
pub mod registry;
pub mod runtime;
pub mod signature;
pub mod stdlib;

#[cfg(test)]
mod test_support;

pub use dispatch::{dispatch, run_entry_point, DISPATCH_COMMAND};
pub use error::{BridgeError, HostError};
pub use export::{definition, placeholders, CommandCall, REMAINDER_TOKEN};
pub use marshal::{decode_list, encode_list, to_arguments, uq, Argument, LIST_SEPARATOR};
pub use proxy::{Bridge, Command};
pub use registry::{BridgeConfig, ExportRegistry, ExportedFunction, HostFn, ShadowPolicy};
pub use runtime::CommandRuntime;
pub use signature::{CallArgs, Signature};
pub use stdlib::ProjectInfo;
