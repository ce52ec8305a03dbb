//! Interface of the external command runtime.

use crate::error::BridgeError;
use crate::marshal::Argument;
use crate::registry::ExportRegistry;

/// The primitives an embedding runtime provides to the bridge.
///
/// All methods take `&self`: a call to [`invoke`](Self::invoke) may re-enter
/// the host through the dispatcher, which may in turn call `invoke` again.
/// Implementations must not hold interior borrows across a command execution.
pub trait CommandRuntime {
    /// Executes `command` with `args` and waits for it to finish.
    ///
    /// [`Argument::Quoted`] values are subject to the runtime's own quoting
    /// rules; [`Argument::Unquoted`] values are taken as written.
    fn invoke(&self, command: &str, args: &[Argument]) -> Result<(), BridgeError>;

    /// Reads a variable. Returns `None` if it is unset.
    fn get(&self, variable: &str) -> Option<String>;

    /// Turns the runtime's own diagnostic output on or off.
    fn enable_debug(&self, enabled: bool);

    /// The export registry shared with the bridge for this session.
    fn registry(&self) -> &ExportRegistry;
}

impl<R: CommandRuntime + ?Sized> CommandRuntime for &R {
    fn invoke(&self, command: &str, args: &[Argument]) -> Result<(), BridgeError> {
        (**self).invoke(command, args)
    }

    fn get(&self, variable: &str) -> Option<String> {
        (**self).get(variable)
    }

    fn enable_debug(&self, enabled: bool) {
        (**self).enable_debug(enabled)
    }

    fn registry(&self) -> &ExportRegistry {
        (**self).registry()
    }
}
