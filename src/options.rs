use serde_derive::Deserialize;

use crate::error::{Error, Result};

/// How selected comments are cut out of the text.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Removal {
    /// Copy everything between the comments' spans in a single pass.
    Offset,
    /// Delete the first occurrence of each comment's text, one comment at a time, from the text
    /// as modified so far. Can hit the wrong occurrence when the same text also appears earlier,
    /// e.g. inside a string literal.
    Literal,
}

impl Default for Removal {
    fn default() -> Self {
        Removal::Offset
    }
}

/// Options for [`strip`](crate::strip::strip) and friends.
///
/// Every field is optional so that two sets of options can be layered with [`Options::merge`].
/// Note that `block` and `line` are *presence* flags: `block: Some(false)` still means "block
/// comments only". Setting `block` keeps line comments, setting `line` keeps block comments, and
/// setting both removes nothing.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Keep comments starting with `!`, like `/*! license */` or `//! note`.
    pub safe: Option<bool>,
    /// If present, only block comments are removed.
    pub block: Option<bool>,
    /// If present, only line comments are removed.
    pub line: Option<bool>,
    /// Return `None` instead of an error when the text can't be scanned.
    pub silent: Option<bool>,
    /// How comments are cut out; defaults to [`Removal::Offset`].
    pub removal: Option<Removal>,
}

impl Options {
    /// The options every call starts from.
    pub fn defaults() -> Options {
        Options {
            safe: Some(false),
            ..Options::default()
        }
    }

    /// Layers `overrides` on top of `self`; a key set in `overrides` wins.
    pub fn merge(self, overrides: Options) -> Options {
        Options {
            safe: overrides.safe.or(self.safe),
            block: overrides.block.or(self.block),
            line: overrides.line.or(self.line),
            silent: overrides.silent.or(self.silent),
            removal: overrides.removal.or(self.removal),
        }
    }

    pub fn from_toml(src: &str) -> Result<Options> {
        toml::from_str(src).map_err(Error::OptionsParseToml)
    }

    pub fn is_safe(&self) -> bool {
        self.safe.unwrap_or(false)
    }

    pub fn is_silent(&self) -> bool {
        self.silent.unwrap_or(false)
    }

    pub fn removes_line_comments(&self) -> bool {
        self.block.is_none()
    }

    pub fn removes_block_comments(&self) -> bool {
        self.line.is_none()
    }

    pub fn removal(&self) -> Removal {
        self.removal.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_not_safe() {
        let opts = Options::defaults();
        assert_eq!(Some(false), opts.safe);
        assert!(!opts.is_safe());
        assert!(opts.removes_line_comments());
        assert!(opts.removes_block_comments());
        assert_eq!(Removal::Offset, opts.removal());
    }

    #[test]
    fn merge_overrides_win() {
        let base = Options {
            safe: Some(false),
            silent: Some(true),
            ..Options::default()
        };
        let merged = base.merge(Options {
            safe: Some(true),
            line: Some(true),
            ..Options::default()
        });
        assert_eq!(
            Options {
                safe: Some(true),
                block: None,
                line: Some(true),
                silent: Some(true),
                removal: None,
            },
            merged
        );
    }

    #[test]
    fn block_and_line_are_presence_flags() {
        let opts = Options {
            block: Some(false),
            ..Options::default()
        };
        // `Some(false)` still counts as set.
        assert!(!opts.removes_line_comments());
        assert!(opts.removes_block_comments());
    }

    #[test]
    fn parse_toml() {
        let opts = Options::from_toml(indoc!(
            r#"
            safe = true
            line = true
            removal = "literal"
            "#
        ))
        .unwrap();
        assert_eq!(
            Options {
                safe: Some(true),
                line: Some(true),
                removal: Some(Removal::Literal),
                ..Options::default()
            },
            opts
        );
    }

    #[test]
    fn parse_toml_rejects_unknown_keys() {
        match Options::from_toml("unsafe = true") {
            Err(Error::OptionsParseToml(_)) => {}
            other => panic!("expected a TOML error, got {:?}", other),
        }
    }
}
