//! Thin wrappers over common runtime commands.
//!
//! Each wrapper is a single pass-through to [`Bridge::invoke_command`].

use crate::error::BridgeError;
use crate::marshal::Argument;
use crate::proxy::Bridge;

/// Arguments of a `project()` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub homepage_url: Option<String>,
    pub languages: Vec<String>,
}

impl ProjectInfo {
    /// Creates a project declaration with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn homepage_url(mut self, url: impl Into<String>) -> Self {
        self.homepage_url = Some(url.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    /// Argument list in `project()` keyword order.
    pub fn to_args(&self) -> Vec<Argument> {
        let mut args = vec![Argument::from(&self.name)];
        let keywords = [
            ("VERSION", &self.version),
            ("DESCRIPTION", &self.description),
            ("HOMEPAGE_URL", &self.homepage_url),
        ];
        for (keyword, value) in keywords {
            if let Some(value) = value {
                args.push(Argument::from(keyword));
                args.push(Argument::from(value));
            }
        }
        if !self.languages.is_empty() {
            args.push(Argument::from("LANGUAGES"));
            args.extend(self.languages.iter().map(Argument::from));
        }
        args
    }
}

impl Bridge<'_> {
    /// `set(<variable> <values>...)`
    pub fn set<I>(&self, variable: &str, values: I) -> Result<(), BridgeError>
    where
        I: IntoIterator,
        I::Item: Into<Argument>,
    {
        let args: Vec<Argument> = std::iter::once(Argument::from(variable))
            .chain(values.into_iter().map(Into::into))
            .collect();
        self.invoke("set", &args)
    }

    /// `cmake_minimum_required(VERSION <version> FATAL_ERROR)`
    pub fn cmake_minimum_required(&self, version: &str) -> Result<(), BridgeError> {
        self.invoke_command("cmake_minimum_required", ["VERSION", version, "FATAL_ERROR"])
    }

    /// `project(<name> [VERSION ..] [DESCRIPTION ..] [HOMEPAGE_URL ..] [LANGUAGES ..])`
    pub fn project(&self, info: &ProjectInfo) -> Result<(), BridgeError> {
        self.invoke("project", &info.to_args())
    }

    /// `add_executable(<name> <files>...)`
    pub fn add_executable<I>(&self, name: &str, files: I) -> Result<(), BridgeError>
    where
        I: IntoIterator,
        I::Item: Into<Argument>,
    {
        let args: Vec<Argument> = std::iter::once(Argument::from(name))
            .chain(files.into_iter().map(Into::into))
            .collect();
        self.invoke("add_executable", &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRuntime;
    use pretty_assertions::assert_eq;

    fn quoted(items: &[&str]) -> Vec<Argument> {
        items.iter().map(|s| Argument::from(*s)).collect()
    }

    #[test]
    fn test_set() {
        let runtime = RecordingRuntime::new();
        Bridge::new(&runtime).set("SRCS", ["a.c", "b.c"]).unwrap();
        assert_eq!(
            runtime.calls(),
            vec![("set".to_string(), quoted(&["SRCS", "a.c", "b.c"]))]
        );
    }

    #[test]
    fn test_cmake_minimum_required() {
        let runtime = RecordingRuntime::new();
        let bridge = Bridge::new(&runtime);
        bridge.cmake_minimum_required("3.20").unwrap();
        assert_eq!(
            runtime.calls()[0].1,
            quoted(&["VERSION", "3.20", "FATAL_ERROR"])
        );
    }

    #[test]
    fn test_project_minimal() {
        assert_eq!(ProjectInfo::new("demo").to_args(), quoted(&["demo"]));
    }

    #[test]
    fn test_project_full() {
        let info = ProjectInfo::new("demo")
            .version("1.2.3")
            .description("A demo")
            .homepage_url("https://example.org")
            .language("C")
            .language("CXX");
        let runtime = RecordingRuntime::new();
        Bridge::new(&runtime).project(&info).unwrap();
        assert_eq!(
            runtime.calls()[0],
            (
                "project".to_string(),
                quoted(&[
                    "demo",
                    "VERSION",
                    "1.2.3",
                    "DESCRIPTION",
                    "A demo",
                    "HOMEPAGE_URL",
                    "https://example.org",
                    "LANGUAGES",
                    "C",
                    "CXX",
                ])
            )
        );
    }

    #[test]
    fn test_project_skips_unset_keywords() {
        let args = ProjectInfo::new("demo").language("C").to_args();
        assert_eq!(args, quoted(&["demo", "LANGUAGES", "C"]));
    }

    #[test]
    fn test_add_executable() {
        let runtime = RecordingRuntime::new();
        Bridge::new(&runtime)
            .add_executable("app", ["main.c", "util.c"])
            .unwrap();
        assert_eq!(
            runtime.calls()[0],
            (
                "add_executable".to_string(),
                quoted(&["app", "main.c", "util.c"])
            )
        );
    }
}
