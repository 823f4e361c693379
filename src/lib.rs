//! Strip `// line` and `/* block */` comments from source text.
//!
//! Comments are found by a [`Scanner`] (by default [`JsScanner`]) and cut out of the text.
//! With `safe` set, comments starting with `!` (`/*! license */`, `//! note`) are kept.

pub mod error;
pub mod lex;
pub mod options;
pub mod strip;
pub mod util;

pub use crate::error::{Error, Result, ScanError, ScanErrorKind};
pub use crate::lex::{Comment, CommentKind, JsScanner, Scanner, Span};
pub use crate::options::{Options, Removal};
pub use crate::strip::{strip, strip_block, strip_line, CommentStripper};
