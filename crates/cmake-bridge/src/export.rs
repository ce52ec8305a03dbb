//! Inbound export mechanism.
//!
//! Exporting a host function defines a runtime command of the same name whose
//! body forwards every argument it receives to the dispatcher:
//!
//! ```text
//! function(greet arg0)
//!   __invoke_pyfunc("greet" "${arg0}" ${ARGN})
//! endfunction()
//! ```
//!
//! Named placeholders are quoted so each one stays a single argument (empty
//! values included). `${ARGN}` is passed unquoted so the runtime expands the
//! remainder into separate arguments; calls with extra arguments therefore
//! succeed at the runtime level and are checked against the signature only
//! when dispatched.

use tracing::{debug, warn};

use crate::dispatch::DISPATCH_COMMAND;
use crate::error::BridgeError;
use crate::marshal::Argument;
use crate::proxy::Bridge;
use crate::registry::{ExportedFunction, ShadowPolicy};
use crate::signature::{CallArgs, Signature};

/// Runtime token that expands to the arguments beyond the declared formals.
pub const REMAINDER_TOKEN: &str = "${ARGN}";

/// Command that opens a function definition.
pub const DEFINE_COMMAND: &str = "function";

/// Command that closes a function definition.
pub const END_DEFINE_COMMAND: &str = "endfunction";

/// One command emitted while defining an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCall {
    pub command: String,
    pub args: Vec<Argument>,
}

impl CommandCall {
    fn new(command: &str, args: Vec<Argument>) -> Self {
        Self {
            command: command.to_string(),
            args,
        }
    }
}

/// Placeholder formal names `arg0 .. arg{arity-1}`.
pub fn placeholders(arity: usize) -> Vec<String> {
    (0..arity).map(|i| format!("arg{}", i)).collect()
}

/// The commands that define `name` as a forwarder for `signature`.
pub fn definition(name: &str, signature: &Signature) -> Vec<CommandCall> {
    let formals = placeholders(signature.arity());

    let mut header = Vec::with_capacity(formals.len() + 1);
    header.push(Argument::from(name));
    header.extend(formals.iter().map(Argument::from));

    let mut body = Vec::with_capacity(formals.len() + 2);
    body.push(Argument::from(name));
    for formal in &formals {
        body.push(Argument::Quoted(format!("${{{}}}", formal)));
    }
    body.push(Argument::unquoted(REMAINDER_TOKEN));

    vec![
        CommandCall::new(DEFINE_COMMAND, header),
        CommandCall::new(DISPATCH_COMMAND, body),
        CommandCall::new(END_DEFINE_COMMAND, Vec::new()),
    ]
}

impl Bridge<'_> {
    /// Exports `handler` under the signature's own name.
    pub fn export<F>(&self, signature: Signature, handler: F) -> Result<(), BridgeError>
    where
        F: Fn(&Bridge<'_>, &CallArgs) -> anyhow::Result<()> + 'static,
    {
        let name = signature.name.clone();
        self.export_as(&name, signature, handler)
    }

    /// Exports `handler` as the runtime command `name`.
    ///
    /// Defines the forwarding command in the runtime, then records the
    /// handler in the registry. Re-exporting a name follows the session's
    /// [`ShadowPolicy`].
    pub fn export_as<F>(
        &self,
        name: &str,
        signature: Signature,
        handler: F,
    ) -> Result<(), BridgeError>
    where
        F: Fn(&Bridge<'_>, &CallArgs) -> anyhow::Result<()> + 'static,
    {
        let registry = self.registry();
        if registry.contains(name) {
            match registry.config().shadow_policy {
                ShadowPolicy::Reject => {
                    return Err(BridgeError::AlreadyExported {
                        name: name.to_string(),
                    });
                }
                ShadowPolicy::Replace => {
                    warn!(name, "re-exporting function, replacing previous definition")
                }
            }
        }

        for call in definition(name, &signature) {
            self.invoke(&call.command, &call.args)?;
        }

        debug!(
            name,
            arity = signature.arity(),
            variadic = signature.is_variadic(),
            "exported function"
        );
        registry.insert(name, ExportedFunction::new(signature, handler));
        Ok(())
    }
}
