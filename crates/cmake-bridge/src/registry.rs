//! Session-wide registry of exported host functions.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::proxy::Bridge;
use crate::signature::{CallArgs, Signature};

/// Host function callable from the runtime through the dispatcher.
pub type HostFn = dyn Fn(&Bridge<'_>, &CallArgs) -> anyhow::Result<()>;

/// What to do when a name is exported a second time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShadowPolicy {
    /// Replace the previous definition and registry entry (with a warning).
    #[default]
    Replace,
    /// Refuse the export with `BridgeError::AlreadyExported`.
    Reject,
}

/// Configuration for one embedding session.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Re-export behavior (default: replace).
    pub shadow_policy: ShadowPolicy,
    /// Whether outbound invocations are logged at info level from the start.
    ///
    /// Only the bridge's own logging is affected. The runtime's flag stays
    /// off until [`Bridge::enable_debug`] is called, which sets both.
    pub debug: bool,
}

/// A host function recorded by export.
pub struct ExportedFunction {
    signature: Signature,
    handler: Box<HostFn>,
}

impl ExportedFunction {
    /// Creates a record from a signature and a handler.
    pub fn new<F>(signature: Signature, handler: F) -> Self
    where
        F: Fn(&Bridge<'_>, &CallArgs) -> anyhow::Result<()> + 'static,
    {
        Self {
            signature,
            handler: Box::new(handler),
        }
    }

    /// The declared parameter list.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Calls the handler.
    pub fn call(&self, bridge: &Bridge<'_>, args: &CallArgs) -> anyhow::Result<()> {
        (self.handler)(bridge, args)
    }
}

impl fmt::Debug for ExportedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedFunction")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Registry mapping command names to exported host functions.
///
/// One registry lives for one embedding session, owned by the runtime and
/// handed out by reference. Entries are never removed; a re-export replaces
/// the previous entry. Lookups return an `Rc` so no borrow is held while
/// the function runs.
#[derive(Debug, Default)]
pub struct ExportRegistry {
    config: BridgeConfig,
    functions: RefCell<HashMap<String, Rc<ExportedFunction>>>,
    debug: Cell<bool>,
    depth: Cell<usize>,
}

impl ExportRegistry {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with a custom configuration.
    pub fn with_config(config: BridgeConfig) -> Self {
        let debug = Cell::new(config.debug);
        Self {
            config,
            debug,
            ..Self::default()
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Records `function` under `name`, returning the entry it replaced.
    pub fn insert(
        &self,
        name: impl Into<String>,
        function: ExportedFunction,
    ) -> Option<Rc<ExportedFunction>> {
        self.functions
            .borrow_mut()
            .insert(name.into(), Rc::new(function))
    }

    /// Looks up an exported function.
    pub fn get(&self, name: &str) -> Option<Rc<ExportedFunction>> {
        self.functions.borrow().get(name).cloned()
    }

    /// Returns true if `name` has been exported.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.borrow().contains_key(name)
    }

    /// Number of exported functions.
    pub fn len(&self) -> usize {
        self.functions.borrow().len()
    }

    /// Returns true if nothing has been exported.
    pub fn is_empty(&self) -> bool {
        self.functions.borrow().is_empty()
    }

    /// Exported names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Signatures keyed by exported name.
    pub fn signatures(&self) -> BTreeMap<String, Signature> {
        self.functions
            .borrow()
            .iter()
            .map(|(name, f)| (name.clone(), f.signature().clone()))
            .collect()
    }

    /// JSON manifest of everything exported in this session.
    pub fn manifest(&self) -> serde_json::Value {
        serde_json::to_value(self.signatures()).unwrap_or(serde_json::Value::Null)
    }

    pub(crate) fn debug(&self) -> bool {
        self.debug.get()
    }

    pub(crate) fn set_debug(&self, enabled: bool) {
        self.debug.set(enabled);
    }

    /// Current nesting of host entry points.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub(crate) fn enter(&self) -> usize {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        depth
    }

    pub(crate) fn leave(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// One active host frame, released on drop.
pub(crate) struct HostFrame<'a> {
    registry: &'a ExportRegistry,
    depth: usize,
}

impl<'a> HostFrame<'a> {
    pub(crate) fn enter(registry: &'a ExportRegistry) -> Self {
        let depth = registry.enter();
        Self { registry, depth }
    }

    /// Only when no host frame is active yet.
    pub(crate) fn enter_outermost(registry: &'a ExportRegistry) -> Option<Self> {
        (registry.depth() == 0).then(|| Self::enter(registry))
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for HostFrame<'_> {
    fn drop(&mut self) {
        self.registry.leave();
    }
}
