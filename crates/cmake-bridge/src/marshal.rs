//! Conversion of host values to command arguments, and of `;`-lists back.
//!
//! Ordinary values become [`Argument::Quoted`]: the runtime applies its own
//! quoting rules to them. [`Argument::Unquoted`] carries runtime syntax (such
//! as `${ARGN}`) that has to reach the runtime exactly as written.

use std::fmt;

/// Separator of the runtime's native list encoding.
pub const LIST_SEPARATOR: char = ';';

/// A single argument of an external command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Argument {
    /// A plain value, quoted by the runtime.
    Quoted(String),
    /// A literal token passed through unquoted.
    Unquoted(String),
}

impl Argument {
    /// Creates a quoted argument from any displayable value.
    pub fn quoted(value: impl fmt::Display) -> Self {
        Argument::Quoted(value.to_string())
    }

    /// Creates a literal argument that bypasses quoting.
    ///
    /// Only use this for trusted runtime syntax; the content is not checked.
    pub fn unquoted(token: impl Into<String>) -> Self {
        Argument::Unquoted(token.into())
    }

    /// Returns the raw string content.
    pub fn as_str(&self) -> &str {
        match self {
            Argument::Quoted(s) | Argument::Unquoted(s) => s,
        }
    }

    /// Returns true for literal (unquoted) arguments.
    pub fn is_unquoted(&self) -> bool {
        matches!(self, Argument::Unquoted(_))
    }

    /// Consumes the argument, returning its raw string content.
    pub fn into_string(self) -> String {
        match self {
            Argument::Quoted(s) | Argument::Unquoted(s) => s,
        }
    }
}

/// Shorthand for [`Argument::unquoted`].
///
/// ```
/// use cmake_bridge::{uq, Argument};
///
/// assert_eq!(uq("${ARGN}"), Argument::Unquoted("${ARGN}".to_string()));
/// ```
pub fn uq(token: impl Into<String>) -> Argument {
    Argument::unquoted(token)
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Quoted(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Quoted(value)
    }
}

impl From<&String> for Argument {
    fn from(value: &String) -> Self {
        Argument::Quoted(value.clone())
    }
}

impl From<char> for Argument {
    fn from(value: char) -> Self {
        Argument::Quoted(value.to_string())
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Argument::Quoted(if value { "True" } else { "False" }.to_string())
    }
}

impl From<&Argument> for Argument {
    fn from(value: &Argument) -> Self {
        value.clone()
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Argument::Quoted(value.to_string())
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Collects anything convertible into arguments.
pub fn to_arguments<I>(args: I) -> Vec<Argument>
where
    I: IntoIterator,
    I::Item: Into<Argument>,
{
    args.into_iter().map(Into::into).collect()
}

/// Joins list elements with the runtime's list separator.
pub fn encode_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(LIST_SEPARATOR);
        }
        out.push_str(item.as_ref());
    }
    out
}

/// Splits a list-encoded variable value into its elements.
///
/// An unset variable (`None`) stays `None`. A set-but-empty variable yields a
/// single empty element, matching how the runtime joins lists.
pub fn decode_list(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|s| s.split(LIST_SEPARATOR).map(str::to_string).collect())
}
