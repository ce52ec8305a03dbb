//! Recording runtime double for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::error::BridgeError;
use crate::marshal::Argument;
use crate::registry::{BridgeConfig, ExportRegistry};
use crate::runtime::CommandRuntime;

/// Records every invocation and answers `get` from a fixed variable table.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    calls: RefCell<Vec<(String, Vec<Argument>)>>,
    vars: HashMap<String, String>,
    failing: HashSet<String>,
    debug: Cell<bool>,
    max_depth: Cell<usize>,
    registry: ExportRegistry,
}

impl RecordingRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self {
            registry: ExportRegistry::with_config(config),
            ..Self::default()
        }
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    /// Makes `command` fail as unknown.
    pub fn failing(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<Argument>)> {
        self.calls.borrow().clone()
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.get()
    }

    /// Deepest host-frame nesting seen by any invocation.
    pub fn max_depth(&self) -> usize {
        self.max_depth.get()
    }
}

impl CommandRuntime for RecordingRuntime {
    fn invoke(&self, command: &str, args: &[Argument]) -> Result<(), BridgeError> {
        let depth = self.registry.depth();
        self.max_depth.set(self.max_depth.get().max(depth));
        if self.failing.contains(command) {
            return Err(BridgeError::UnknownCommand {
                command: command.to_string(),
            });
        }
        self.calls
            .borrow_mut()
            .push((command.to_string(), args.to_vec()));
        Ok(())
    }

    fn get(&self, variable: &str) -> Option<String> {
        self.vars.get(variable).cloned()
    }

    fn enable_debug(&self, enabled: bool) {
        self.debug.set(enabled);
    }

    fn registry(&self) -> &ExportRegistry {
        &self.registry
    }
}
