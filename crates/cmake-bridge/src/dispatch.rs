//! Callback dispatcher and host entry points.
//!
//! The runtime resolves calls to exported commands into a call of the
//! well-known [`DISPATCH_COMMAND`], which lands in [`dispatch`]. Every host
//! entry (a dispatched callback, or host code started by the embedder) runs
//! through [`run_entry_point`], which maps errors back to [`BridgeError`] and
//! reports a failure once, at the outermost host frame.

use tracing::{debug, error};

use crate::error::BridgeError;
use crate::proxy::Bridge;
use crate::registry::HostFrame;
use crate::runtime::CommandRuntime;
use crate::signature::CallArgs;

/// Name of the runtime command that forwards into exported host functions.
pub const DISPATCH_COMMAND: &str = "__invoke_pyfunc";

/// Handles one `__invoke_pyfunc(name, args...)` call.
///
/// `args[0]` names the exported function; the remaining arguments are passed
/// to it positionally.
pub fn dispatch(runtime: &dyn CommandRuntime, args: &[String]) -> Result<(), BridgeError> {
    let (name, forwarded) = args.split_first().ok_or(BridgeError::DispatchUsage)?;

    run_entry_point(runtime, name, |bridge| {
        let function = bridge
            .registry()
            .get(name)
            .ok_or_else(|| BridgeError::UnknownExport { name: name.clone() })?;

        let signature = function.signature();
        if !signature.accepts(forwarded.len()) {
            return Err(BridgeError::ArityMismatch {
                name: name.clone(),
                expected: signature.expected(),
                got: forwarded.len(),
            }
            .into());
        }

        debug!(name = name.as_str(), args = ?forwarded, "dispatching");
        let call_args = CallArgs::split(signature, forwarded.to_vec());
        function.call(bridge, &call_args)
    })
}

/// Runs host code `f` as an entry point named `name`.
///
/// A [`BridgeError`] returned by `f` (for example a runtime failure that
/// already crossed the boundary further down the chain) is passed through
/// unchanged; any other error becomes [`BridgeError::HostFunction`]. An error
/// leaving the outermost host frame is logged as unhandled. Outbound calls
/// made through a [`Bridge`] outside any entry point count as a host frame,
/// since their caller receives the error.
pub fn run_entry_point<T, F>(
    runtime: &dyn CommandRuntime,
    name: &str,
    f: F,
) -> Result<T, BridgeError>
where
    F: FnOnce(&Bridge<'_>) -> anyhow::Result<T>,
{
    let frame = HostFrame::enter(runtime.registry());
    let bridge = Bridge::new(runtime);
    let result = f(&bridge).map_err(|e| into_bridge_error(name, e));
    let depth = frame.depth();
    drop(frame);

    if let Err(err) = &result {
        if depth == 1 {
            error!(code = err.code(), "unhandled host error: {}", err);
        } else {
            debug!(code = err.code(), depth, "host error propagating: {}", err);
        }
    }
    result
}

fn into_bridge_error(name: &str, err: anyhow::Error) -> BridgeError {
    match err.downcast::<BridgeError>() {
        Ok(bridge_err) => bridge_err,
        Err(other) => BridgeError::HostFunction {
            name: name.to_string(),
            source: other.into(),
        },
    }
}
