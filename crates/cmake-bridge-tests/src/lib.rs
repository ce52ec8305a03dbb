//! In-memory command runtime for end-to-end tests of cmake-bridge.
//!
//! `MemoryRuntime` implements just enough of a CMake-style evaluator to run
//! the bridge's round trips:
//!
//! - `function()`/`endfunction()` record a body instead of executing it
//! - calling a recorded function binds its formals, `ARGC`, `ARGV`, `ARGV<n>`
//!   and `ARGN` in a new scope and executes the body
//! - `${NAME}` references are expanded at execution time; quoted arguments
//!   stay one argument, unquoted ones are split on `;` with empty elements
//!   dropped
//! - `set`, `unset` and `message` builtins
//! - `__invoke_pyfunc` is routed to [`cmake_bridge::dispatch`]
//!
//! Every executed command is appended to a transcript with its expanded
//! arguments, so tests can assert on exactly what the runtime saw.
//!
//! [`capture_logs`] runs a closure under a TRACE-level `fmt` subscriber and
//! returns what the bridge logged.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::fmt::MakeWriter;

use cmake_bridge::{
    dispatch, encode_list, Argument, BridgeConfig, BridgeError, CommandRuntime, ExportRegistry,
    DISPATCH_COMMAND, LIST_SEPARATOR,
};

/// One executed command, with arguments after expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug)]
struct FunctionDef {
    formals: Vec<String>,
    body: Vec<(String, Vec<Argument>)>,
}

#[derive(Debug)]
struct Recording {
    name: String,
    formals: Vec<String>,
    body: Vec<(String, Vec<Argument>)>,
    nesting: usize,
}

/// A small CMake-like command evaluator held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    globals: RefCell<HashMap<String, String>>,
    scopes: RefCell<Vec<HashMap<String, String>>>,
    functions: RefCell<HashMap<String, Rc<FunctionDef>>>,
    recording: RefCell<Option<Recording>>,
    transcript: RefCell<Vec<CallRecord>>,
    messages: RefCell<Vec<String>>,
    debug: Cell<bool>,
    registry: ExportRegistry,
}

impl MemoryRuntime {
    /// Creates a runtime with an empty registry and default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runtime whose registry uses `config`.
    pub fn with_config(config: BridgeConfig) -> Self {
        Self {
            registry: ExportRegistry::with_config(config),
            ..Self::default()
        }
    }

    /// Sets a global variable directly.
    pub fn set_var(&self, name: &str, value: &str) {
        self.globals
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Simulates a call site in a runtime script: `command("a" "b" ...)`.
    pub fn call(&self, command: &str, args: &[&str]) -> Result<(), BridgeError> {
        let args: Vec<Argument> = args.iter().map(|a| Argument::from(*a)).collect();
        self.invoke(command, &args)
    }

    /// Executed commands so far.
    pub fn transcript(&self) -> Vec<CallRecord> {
        self.transcript.borrow().clone()
    }

    /// Executed commands named `command`.
    pub fn calls_to(&self, command: &str) -> Vec<CallRecord> {
        self.transcript
            .borrow()
            .iter()
            .filter(|r| r.command == command)
            .cloned()
            .collect()
    }

    /// Clears the transcript.
    pub fn clear_transcript(&self) {
        self.transcript.borrow_mut().clear();
    }

    /// Text of every `message()` call.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Returns true if a function with this name has been defined.
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.borrow().contains_key(name)
    }

    /// Formal parameters of a defined function.
    pub fn formals(&self, name: &str) -> Option<Vec<String>> {
        self.functions.borrow().get(name).map(|f| f.formals.clone())
    }

    /// Unexpanded body of a defined function.
    pub fn body(&self, name: &str) -> Option<Vec<(String, Vec<Argument>)>> {
        self.functions.borrow().get(name).map(|f| f.body.clone())
    }

    /// Returns true if `enable_debug(true)` is in effect.
    pub fn debug_enabled(&self) -> bool {
        self.debug.get()
    }

    /// Returns true while a `function()` body is being recorded.
    pub fn is_recording(&self) -> bool {
        self.recording.borrow().is_some()
    }

    /// Captures a command into the open definition, if there is one.
    ///
    /// Returns `true` when the command was consumed by the recording.
    fn capture(&self, command: &str, args: &[Argument]) -> bool {
        let mut slot = self.recording.borrow_mut();
        let Some(recording) = slot.as_mut() else {
            return false;
        };

        let closes = match command {
            "function" => {
                recording.nesting += 1;
                false
            }
            "endfunction" if recording.nesting == 0 => true,
            "endfunction" => {
                recording.nesting -= 1;
                false
            }
            _ => false,
        };
        if !closes {
            recording.body.push((command.to_string(), args.to_vec()));
            return true;
        }

        if let Some(done) = slot.take() {
            self.functions.borrow_mut().insert(
                done.name,
                Rc::new(FunctionDef {
                    formals: done.formals,
                    body: done.body,
                }),
            );
        }
        true
    }

    fn lookup(&self, name: &str) -> Option<String> {
        for scope in self.scopes.borrow().iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(value.clone());
            }
        }
        self.globals.borrow().get(name).cloned()
    }

    /// Replaces `${NAME}` references; unset names expand to nothing.
    fn expand_refs(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    if let Some(value) = self.lookup(&after[..end]) {
                        out.push_str(&value);
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn expand(&self, args: &[Argument]) -> Vec<String> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Argument::Quoted(s) => out.push(self.expand_refs(s)),
                Argument::Unquoted(s) => out.extend(
                    self.expand_refs(s)
                        .split(LIST_SEPARATOR)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string),
                ),
            }
        }
        out
    }

    fn assign(&self, name: &str, value: Option<String>) {
        let mut scopes = self.scopes.borrow_mut();
        let mut globals = self.globals.borrow_mut();
        let target = match scopes.last_mut() {
            Some(scope) => scope,
            None => &mut *globals,
        };
        match value {
            Some(value) => {
                target.insert(name.to_string(), value);
            }
            None => {
                target.remove(name);
            }
        }
    }

    fn call_function(
        &self,
        name: &str,
        def: &FunctionDef,
        args: Vec<String>,
    ) -> Result<(), BridgeError> {
        if args.len() < def.formals.len() {
            return Err(BridgeError::command_failed(
                name,
                format!("Function invoked with incorrect arguments for function named: {}", name),
            ));
        }

        let mut scope = HashMap::new();
        for (formal, value) in def.formals.iter().zip(&args) {
            scope.insert(formal.clone(), value.clone());
        }
        for (i, value) in args.iter().enumerate() {
            scope.insert(format!("ARGV{}", i), value.clone());
        }
        scope.insert("ARGC".to_string(), args.len().to_string());
        scope.insert("ARGV".to_string(), encode_list(&args));
        scope.insert("ARGN".to_string(), encode_list(&args[def.formals.len()..]));

        self.scopes.borrow_mut().push(scope);
        let mut result = Ok(());
        for (command, command_args) in &def.body {
            result = self.invoke(command, command_args);
            if result.is_err() {
                break;
            }
        }
        self.scopes.borrow_mut().pop();
        result
    }
}

impl CommandRuntime for MemoryRuntime {
    fn invoke(&self, command: &str, args: &[Argument]) -> Result<(), BridgeError> {
        if self.capture(command, args) {
            return Ok(());
        }

        let expanded = self.expand(args);
        if self.debug.get() {
            info!(command, args = ?expanded, "executing");
        }
        self.transcript.borrow_mut().push(CallRecord {
            command: command.to_string(),
            args: expanded.clone(),
        });

        match command {
            "function" => {
                let Some((name, formals)) = expanded.split_first() else {
                    return Err(BridgeError::command_failed(
                        "function",
                        "called with incorrect number of arguments",
                    ));
                };
                *self.recording.borrow_mut() = Some(Recording {
                    name: name.clone(),
                    formals: formals.to_vec(),
                    body: Vec::new(),
                    nesting: 0,
                });
                Ok(())
            }
            "endfunction" => Err(BridgeError::command_failed(
                "endfunction",
                "ENDFUNCTION found outside of a FUNCTION ENDFUNCTION block",
            )),
            "set" => {
                let Some((name, values)) = expanded.split_first() else {
                    return Err(BridgeError::command_failed(
                        "set",
                        "called with incorrect number of arguments",
                    ));
                };
                let value = if values.is_empty() {
                    None
                } else {
                    Some(encode_list(values))
                };
                self.assign(name, value);
                Ok(())
            }
            "unset" => {
                let Some(name) = expanded.first() else {
                    return Err(BridgeError::command_failed(
                        "unset",
                        "called with incorrect number of arguments",
                    ));
                };
                self.assign(name, None);
                Ok(())
            }
            "message" => {
                self.messages.borrow_mut().push(expanded.join(" "));
                Ok(())
            }
            DISPATCH_COMMAND => dispatch(self, &expanded),
            _ => {
                let def = self.functions.borrow().get(command).cloned();
                match def {
                    Some(def) => self.call_function(command, &def, expanded),
                    None => Err(BridgeError::UnknownCommand {
                        command: command.to_string(),
                    }),
                }
            }
        }
    }

    fn get(&self, variable: &str) -> Option<String> {
        self.lookup(variable)
    }

    fn enable_debug(&self, enabled: bool) {
        self.debug.set(enabled);
    }

    fn registry(&self) -> &ExportRegistry {
        &self.registry
    }
}

// ============================================================================
// Log capture
// ============================================================================

/// Shared in-memory sink for formatted log lines.
#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Log lines emitted while a closure ran.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    lines: Vec<String>,
}

impl CapturedLogs {
    /// Every captured line, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines logged at exactly `level` by events whose target is `target`.
    pub fn at(&self, level: Level, target: &str) -> Vec<&str> {
        let prefix = format!("{} {}:", level, target);
        self.lines
            .iter()
            .map(|line| line.trim_start())
            .filter(|line| line.starts_with(&prefix))
            .collect()
    }

    /// Lines at `level` from `target` that contain `text`.
    pub fn count(&self, level: Level, target: &str, text: &str) -> usize {
        self.at(level, target)
            .into_iter()
            .filter(|line| line.contains(text))
            .count()
    }
}

/// Runs `f` with a TRACE-level subscriber installed on this thread.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .without_time()
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    let logs = CapturedLogs {
        lines: buffer.lines(),
    };
    (value, logs)
}
