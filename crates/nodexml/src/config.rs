//! Conversion and rendering configuration

use crate::error::{Error, Result};

/// Configuration for converting a [`Node`](crate::Node) tree into a document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Version written into the XML declaration
    pub version: String,
    /// Encoding label written into the XML declaration
    pub encoding: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            version: "1.0".to_string(),
            encoding: "UTF-8".to_string(),
        }
    }
}

impl Config {
    /// Default declaration with no depth limit
    pub fn unlimited() -> Self {
        Self {
            max_depth: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The label is only written into the declaration. Rendered output is
    /// always a UTF-8 `String`, so a label such as `ISO-8859-1` describes
    /// the text correctly only while the content stays ASCII.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Check that `version` and `encoding` fit the declaration grammar
    pub(crate) fn validate_declaration(&self, root_name: &str) -> Result<()> {
        let valid_version = self.version.strip_prefix("1.").is_some_and(|minor| {
            !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit())
        });
        if !valid_version {
            return Err(Error::invalid_content(
                "version",
                root_name,
                "a version number such as 1.0",
            ));
        }

        let mut bytes = self.encoding.bytes();
        let valid_encoding = bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
            && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
        if !valid_encoding {
            return Err(Error::invalid_content(
                "encoding",
                root_name,
                "an encoding name such as UTF-8",
            ));
        }
        Ok(())
    }
}

/// Options for rendering a document to text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteConfig {
    /// Put element-only children on their own indented lines
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set
    pub indent: usize,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 2,
        }
    }
}

impl WriteConfig {
    /// No indentation or line breaks inside the root element
    pub const fn compact() -> Self {
        Self {
            pretty: false,
            indent: 0,
        }
    }

    pub const fn new(pretty: bool, indent: usize) -> Self {
        Self { pretty, indent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_depth, 128);
        assert_eq!(config.version, "1.0");
        assert_eq!(config.encoding, "UTF-8");

        let write = WriteConfig::default();
        assert!(write.pretty);
        assert_eq!(write.indent, 2);
    }

    #[test]
    fn test_builders() {
        let config = Config::unlimited()
            .with_version("1.1")
            .with_encoding("ISO-8859-1");
        assert_eq!(config.max_depth, 0);
        assert_eq!(config.version, "1.1");
        assert_eq!(config.encoding, "ISO-8859-1");
        assert_eq!(Config::default().with_max_depth(4).max_depth, 4);
    }

    #[test]
    fn test_declaration_grammar() {
        assert!(Config::default().validate_declaration("r").is_ok());
        assert!(Config::default()
            .with_version("1.10")
            .with_encoding("ISO-8859-1")
            .validate_declaration("r")
            .is_ok());

        for config in [
            Config::default().with_version("2.0"),
            Config::default().with_version("1."),
            Config::default().with_encoding("UTF\"8"),
            Config::default().with_encoding("8bit"),
            Config::default().with_encoding(""),
        ] {
            assert!(config.validate_declaration("r").is_err(), "{config:?}");
        }
    }
}
