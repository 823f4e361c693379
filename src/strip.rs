use itertools::Itertools;
use log::{debug, error};

use crate::error::Result;
use crate::lex::{Comment, CommentKind, JsScanner, Scanner, Span};
use crate::options::{Options, Removal};

/// Removes comments found by a [`Scanner`] from text.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommentStripper<S = JsScanner> {
    scanner: S,
}

impl<S: Scanner> CommentStripper<S> {
    pub fn new(scanner: S) -> Self {
        CommentStripper { scanner }
    }

    /// Strips line and block comments from `text`, as selected by `options`.
    ///
    /// Returns `Ok(None)` only when the text couldn't be scanned and `options.silent` is set.
    pub fn strip(&self, text: &str, options: &Options) -> Result<Option<String>> {
        if text.is_empty() {
            return Ok(Some(String::new()));
        }

        let opts = Options::defaults().merge(options.clone());
        let comments = match self.scanner.extract_comments(text) {
            Ok(comments) => comments,
            Err(err) if opts.is_silent() => {
                debug!("Ignoring scan error: {}", err);
                return Ok(None);
            }
            Err(err) => {
                error!("Failed to scan comments: {}", err);
                return Err(err.into());
            }
        };

        let doomed: Vec<&Comment<'_>> = comments
            .iter()
            .filter(|comment| should_remove(comment, &opts))
            .collect();
        debug!(
            "Removing {} of {} comments ({:?} removal)",
            doomed.len(),
            comments.len(),
            opts.removal()
        );

        Ok(Some(match opts.removal() {
            Removal::Offset => remove_spans(text, doomed.iter().map(|c| c.span)),
            Removal::Literal => remove_literal(text, &doomed),
        }))
    }

    /// Strips only block comments, keeping line comments. Forces [`Options::block`].
    pub fn strip_block(&self, text: &str, options: &Options) -> Result<Option<String>> {
        let forced = Options {
            block: Some(true),
            ..Options::default()
        };
        self.strip(text, &options.clone().merge(forced))
    }

    /// Strips only line comments, keeping block comments. Forces [`Options::line`].
    pub fn strip_line(&self, text: &str, options: &Options) -> Result<Option<String>> {
        let forced = Options {
            line: Some(true),
            ..Options::default()
        };
        self.strip(text, &options.clone().merge(forced))
    }
}

fn should_remove(comment: &Comment<'_>, opts: &Options) -> bool {
    let selected = match comment.kind {
        CommentKind::Line => opts.removes_line_comments(),
        CommentKind::Block => opts.removes_block_comments(),
    };
    selected && !(opts.is_safe() && comment.is_preserved())
}

/// Copies the text around `spans`. Repeated or overlapping spans are merged and spans running
/// past the end of the text are clamped to it.
fn remove_spans(text: &str, spans: impl Iterator<Item = Span>) -> String {
    let mut ret = String::with_capacity(text.len());
    let mut pos = 0;
    for span in spans.sorted_by(|a, b| a.start.cmp(&b.start)) {
        let start = span.start.min(text.len());
        if start > pos {
            if let Some(kept) = text.get(pos..start) {
                ret.push_str(kept);
            }
        }
        pos = pos.max(span.end.min(text.len()));
    }
    if let Some(kept) = text.get(pos..) {
        ret.push_str(kept);
    }
    ret
}

/// Deletes the first occurrence of each comment's token from the text as it stands after the
/// previous deletions.
fn remove_literal(text: &str, comments: &[&Comment<'_>]) -> String {
    comments
        .iter()
        .fold(text.to_string(), |acc, comment| {
            acc.replacen(&comment.token(), "", 1)
        })
}

/// Strips line and block comments with the default scanner. See [`CommentStripper::strip`].
///
/// ```
/// # use strip_comments::{strip, Options};
/// assert_eq!(
///     Some("abc \n".to_string()),
///     strip("abc // foo bar baz\n/* quux fez */", &Options::default()).unwrap()
/// );
/// ```
pub fn strip(text: &str, options: &Options) -> Result<Option<String>> {
    CommentStripper::<JsScanner>::default().strip(text, options)
}

/// Removes block comments and keeps line comments.
///
/// ```
/// # use strip_comments::{strip_block, Options};
/// assert_eq!(
///     Some("abc // foo bar baz\n".to_string()),
///     strip_block("abc // foo bar baz\n/* quux fez */", &Options::default()).unwrap()
/// );
/// ```
pub fn strip_block(text: &str, options: &Options) -> Result<Option<String>> {
    CommentStripper::<JsScanner>::default().strip_block(text, options)
}

/// Removes line comments and keeps block comments.
///
/// ```
/// # use strip_comments::{strip_line, Options};
/// assert_eq!(
///     Some("abc \n/* quux fez */".to_string()),
///     strip_line("abc // foo bar baz\n/* quux fez */", &Options::default()).unwrap()
/// );
/// ```
pub fn strip_line(text: &str, options: &Options) -> Result<Option<String>> {
    CommentStripper::<JsScanner>::default().strip_line(text, options)
}
