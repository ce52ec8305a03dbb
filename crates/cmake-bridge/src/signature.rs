//! Parameter descriptors for exported functions.
//!
//! Host functions are plain closures, so the parameter list the runtime-side
//! definition is generated from has to be declared explicitly at export time.

use serde::{Deserialize, Serialize};

/// Declared parameter list of an exported host function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Default command name the function is exported under.
    pub name: String,
    /// Fixed positional parameters, in declaration order.
    pub params: Vec<String>,
    /// Trailing parameter that absorbs any remaining arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variadic: Option<String>,
}

impl Signature {
    /// Creates a signature with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            variadic: None,
        }
    }

    /// Appends a fixed positional parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Appends several fixed positional parameters.
    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares a trailing variadic parameter.
    pub fn variadic(mut self, name: impl Into<String>) -> Self {
        self.variadic = Some(name.into());
        self
    }

    /// Number of fixed positional parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the function absorbs extra arguments.
    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    /// Returns true if a call with `count` positional arguments is accepted.
    pub fn accepts(&self, count: usize) -> bool {
        if self.is_variadic() {
            count >= self.arity()
        } else {
            count == self.arity()
        }
    }

    /// Human-readable description of the accepted argument count.
    pub fn expected(&self) -> String {
        if self.is_variadic() {
            format!("at least {}", self.arity())
        } else {
            self.arity().to_string()
        }
    }
}

/// Positional arguments delivered to an exported function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    fixed: Vec<String>,
    rest: Vec<String>,
}

impl CallArgs {
    /// Splits forwarded arguments at the signature's fixed arity.
    ///
    /// The caller has already checked the count with [`Signature::accepts`].
    pub(crate) fn split(signature: &Signature, mut args: Vec<String>) -> Self {
        let rest = args.split_off(signature.arity().min(args.len()));
        Self { fixed: args, rest }
    }

    /// Returns the fixed argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fixed.get(index).map(String::as_str)
    }

    /// Returns the fixed argument at `index`, or an error naming it.
    pub fn require(&self, index: usize) -> anyhow::Result<&str> {
        self.get(index)
            .ok_or_else(|| anyhow::anyhow!("missing positional argument {}", index))
    }

    /// Fixed arguments, in declaration order.
    pub fn fixed(&self) -> &[String] {
        &self.fixed
    }

    /// Arguments absorbed by the variadic parameter.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    /// Total number of arguments received.
    pub fn len(&self) -> usize {
        self.fixed.len() + self.rest.len()
    }

    /// Returns true if no arguments were received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All arguments in their original order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fixed
            .iter()
            .chain(self.rest.iter())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fixed_arity() {
        let sig = Signature::new("greet").param("who");
        assert_eq!(sig.arity(), 1);
        assert!(!sig.is_variadic());
        assert!(sig.accepts(1));
        assert!(!sig.accepts(0));
        assert!(!sig.accepts(2));
        assert_eq!(sig.expected(), "1");
    }

    #[test]
    fn test_variadic_arity() {
        let sig = Signature::new("add_sources")
            .param("target")
            .variadic("files");
        assert!(sig.accepts(1));
        assert!(sig.accepts(5));
        assert!(!sig.accepts(0));
        assert_eq!(sig.expected(), "at least 1");
    }

    #[test]
    fn test_call_args_split() {
        let sig = Signature::new("f").params(["a", "b"]).variadic("rest");
        let args = CallArgs::split(&sig, strings(&["1", "2", "3", "4"]));
        assert_eq!(args.fixed(), strings(&["1", "2"]).as_slice());
        assert_eq!(args.rest(), strings(&["3", "4"]).as_slice());
        assert_eq!(args.get(1), Some("2"));
        assert_eq!(args.get(2), None);
        assert_eq!(args.len(), 4);
        assert_eq!(args.iter().collect::<Vec<_>>(), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_require_reports_index() {
        let args = CallArgs::default();
        assert!(args.is_empty());
        let err = args.require(0).unwrap_err();
        assert!(err.to_string().contains("argument 0"));
    }

    #[test]
    fn test_signature_serializes() {
        let sig = Signature::new("greet").param("who");
        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json, serde_json::json!({"name": "greet", "params": ["who"]}));

        let back: Signature = serde_json::from_value(json).unwrap();
        assert_eq!(back, sig);
    }
}
