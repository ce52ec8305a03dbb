//! Outbound invocation proxy.
//!
//! Any command name is accepted: whether it exists is decided by the runtime
//! when the call is made. No arity checking happens on this side.

use tracing::{info, trace};

use crate::error::BridgeError;
use crate::marshal::{decode_list, to_arguments, Argument};
use crate::registry::{ExportRegistry, HostFrame};
use crate::runtime::CommandRuntime;

/// Host-side handle on a command runtime.
///
/// Cheap to copy; every method forwards synchronously to the runtime.
#[derive(Clone, Copy)]
pub struct Bridge<'r> {
    runtime: &'r dyn CommandRuntime,
}

impl<'r> Bridge<'r> {
    /// Wraps a runtime.
    pub fn new(runtime: &'r dyn CommandRuntime) -> Self {
        Self { runtime }
    }

    /// The wrapped runtime.
    pub fn runtime(&self) -> &'r dyn CommandRuntime {
        self.runtime
    }

    /// The session's export registry.
    pub fn registry(&self) -> &'r ExportRegistry {
        self.runtime.registry()
    }

    /// Invokes `command` with already-marshaled arguments.
    ///
    /// Called outside any entry point, the call itself is the outermost host
    /// frame: failures coming back from callbacks are returned here rather
    /// than reported as unhandled.
    pub fn invoke(&self, command: &str, args: &[Argument]) -> Result<(), BridgeError> {
        if self.registry().debug() {
            info!(command, args = ?args, "invoke");
        } else {
            trace!(command, args = ?args, "invoke");
        }
        let _frame = HostFrame::enter_outermost(self.registry());
        self.runtime.invoke(command, args)
    }

    /// Invokes `command`, converting each argument through the marshaling layer.
    ///
    /// ```ignore
    /// bridge.invoke_command("message", ["STATUS", "configuring"])?;
    /// bridge.invoke_command("foo", [Argument::from("x"), uq("${ARGN}")])?;
    /// ```
    pub fn invoke_command<I>(&self, command: &str, args: I) -> Result<(), BridgeError>
    where
        I: IntoIterator,
        I::Item: Into<Argument>,
    {
        self.invoke(command, &to_arguments(args))
    }

    /// Returns a callable bound to `command`.
    pub fn command(&self, command: impl Into<String>) -> Command<'r> {
        Command {
            bridge: *self,
            name: command.into(),
        }
    }

    /// Reads a variable. `None` if unset.
    pub fn get(&self, variable: &str) -> Option<String> {
        self.runtime.get(variable)
    }

    /// Reads a list variable. `None` if unset, `Some(vec![""])` if empty.
    pub fn get_list(&self, variable: &str) -> Option<Vec<String>> {
        decode_list(self.get(variable).as_deref())
    }

    /// Turns debug output on or off, both here and in the runtime.
    pub fn enable_debug(&self, enabled: bool) {
        self.registry().set_debug(enabled);
        self.runtime.enable_debug(enabled);
    }
}

impl std::fmt::Debug for Bridge<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("exports", &self.registry().names())
            .finish()
    }
}

/// A command name bound to a bridge, callable any number of times.
#[derive(Debug, Clone)]
pub struct Command<'r> {
    bridge: Bridge<'r>,
    name: String,
}

impl Command<'_> {
    /// The bound command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the command.
    pub fn call<I>(&self, args: I) -> Result<(), BridgeError>
    where
        I: IntoIterator,
        I::Item: Into<Argument>,
    {
        self.bridge.invoke_command(&self.name, args)
    }

    /// Invokes the command with no arguments.
    pub fn call0(&self) -> Result<(), BridgeError> {
        self.bridge.invoke(&self.name, &[])
    }
}
