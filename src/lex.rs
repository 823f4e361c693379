use std::fmt;
use std::fmt::{Display, Formatter};

use nom::error::ErrorKind;
use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, tag, take_till, take_until, take_while},
    character::complete,
    character::complete::{anychar, one_of},
    combinator::{map, not, opt},
    sequence::{preceded, terminated},
    IResult, Offset,
};

use crate::error::{ScanError, ScanErrorKind};

const LINE_COMMENT_TAG: &str = "//";
const BLOCK_COMMENT_OPEN: &str = "/*";
const BLOCK_COMMENT_CLOSE: &str = "*/";

/// Anything that can find the comments in a piece of text.
///
/// Implementations must return comments in a stable order (the default scanner uses source
/// order) and must not report nested or overlapping comments.
pub trait Scanner {
    fn extract_comments<'a>(&self, text: &'a str) -> Result<Vec<Comment<'a>>, ScanError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...` up to the end of the line.
    Line,
    /// `/* ... */`, possibly spanning lines.
    Block,
}

/// A byte range `start..end` in the scanned text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comment<'a> {
    /// Position in the scanner's result set.
    pub id: usize,
    pub kind: CommentKind,
    /// The comment text without its delimiters.
    pub value: &'a str,
    /// Where the whole token, delimiters included, sits in the scanned text.
    pub span: Span,
}

impl<'a> Comment<'a> {
    /// Rebuilds the comment exactly as it appears in the source.
    pub fn token(&self) -> String {
        match self.kind {
            CommentKind::Line => format!("{}{}", LINE_COMMENT_TAG, self.value),
            CommentKind::Block => format!(
                "{}{}{}",
                BLOCK_COMMENT_OPEN, self.value, BLOCK_COMMENT_CLOSE
            ),
        }
    }

    /// Preserved comments start with `!`, e.g. `/*! license */`.
    pub fn is_preserved(&self) -> bool {
        self.value.starts_with('!')
    }
}

impl<'a> Display for Comment<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(&self.token())
    }
}

/// The default scanner, for JavaScript and the rest of the C comment family.
///
/// Quoted strings, template literals and regular expression literals are skipped so that
/// `"http://..."` or `/\/*/` is not mistaken for a comment.
///
/// A `/` starts a regex only when the last code before it is an operator or an opening bracket,
/// e.g. `x = /re/` or `f(/re/)`. After a keyword (`return /re/`) it is read as division, so a
/// regex there that contains a quote, `//` or `/*` is misread: the scan either fails or silently
/// cuts code out as a comment.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsScanner;

impl Scanner for JsScanner {
    fn extract_comments<'a>(&self, text: &'a str) -> Result<Vec<Comment<'a>>, ScanError> {
        let chunks = match lex(text) {
            Ok(("", chunks)) => chunks,
            Ok((rest, _)) => {
                return Err(ScanError::at(
                    text,
                    text.offset(rest),
                    ScanErrorKind::Unrecognized,
                ))
            }
            Err(nom::Err::Error((rest, kind))) | Err(nom::Err::Failure((rest, kind))) => {
                return Err(ScanError::at(text, text.offset(rest), error_kind(kind)))
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(ScanError::at(text, text.len(), ScanErrorKind::Unrecognized))
            }
        };

        Ok(chunks
            .into_iter()
            .filter_map(|chunk| match chunk {
                Chunk::Comment { kind, value, raw } => Some((kind, value, raw)),
                Chunk::Source(_) => None,
            })
            .enumerate()
            .map(|(id, (kind, value, raw))| {
                let start = text.offset(raw);
                Comment {
                    id,
                    kind,
                    value,
                    span: Span {
                        start,
                        end: start + raw.len(),
                    },
                }
            })
            .collect())
    }
}

/// Maps the error kinds our own parsers fail with onto scan errors.
fn error_kind(kind: ErrorKind) -> ScanErrorKind {
    match kind {
        ErrorKind::TakeUntil => ScanErrorKind::UnterminatedComment,
        ErrorKind::Char | ErrorKind::Escaped => ScanErrorKind::UnterminatedString,
        ErrorKind::Verify => ScanErrorKind::UnterminatedRegex,
        _ => ScanErrorKind::Unrecognized,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Chunk<'a> {
    /// `raw` is the full token; `value` is the part between the delimiters.
    Comment {
        kind: CommentKind,
        value: &'a str,
        raw: &'a str,
    },
    /// Code, including string literals.
    Source(&'a str),
}

fn is_line_terminator(c: char) -> bool {
    c == '\n' || c == '\r' || c == '\u{2028}' || c == '\u{2029}'
}

fn line_comment(input: &str) -> IResult<&str, (CommentKind, &str)> {
    map(
        preceded(tag(LINE_COMMENT_TAG), take_till(is_line_terminator)),
        |value| (CommentKind::Line, value),
    )(input)
}

/// Block comments don't nest: the first `*/` closes the comment.
fn block_comment(input: &str) -> IResult<&str, (CommentKind, &str)> {
    let (body, _) = tag(BLOCK_COMMENT_OPEN)(input)?;
    let closed: IResult<&str, &str> =
        terminated(take_until(BLOCK_COMMENT_CLOSE), tag(BLOCK_COMMENT_CLOSE))(body);
    match closed {
        Ok((rest, value)) => Ok((rest, (CommentKind::Block, value))),
        // Report the error at the opening delimiter rather than wherever the search gave up.
        Err(_) => Err(nom::Err::Failure((input, ErrorKind::TakeUntil))),
    }
}

fn comment_chunk(input: &str) -> IResult<&str, Chunk<'_>> {
    let (rest, (kind, value)) = alt((line_comment, block_comment))(input)?;
    let raw = &input[..input.offset(rest)];
    Ok((rest, Chunk::Comment { kind, value, raw }))
}

/// A quoted literal: `quote`, then escapes or anything but `forbidden`, then `quote` again.
/// Once the opening quote is seen, failing to find the closing one is fatal.
fn quoted<'a>(
    quote: char,
    forbidden: &'static str,
) -> impl Fn(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (body, _) = complete::char(quote)(input)?;
        let closed: IResult<&str, Option<&str>> = terminated(
            opt(escaped(is_not(forbidden), '\\', anychar)),
            complete::char(quote),
        )(body);
        match closed {
            Ok((rest, _)) => Ok((rest, &input[..input.offset(rest)])),
            Err(_) => Err(nom::Err::Failure((input, ErrorKind::Char))),
        }
    }
}

/// `'...'` and `"..."` may not contain raw line breaks; template literals may.
fn string_literal(input: &str) -> IResult<&str, &str> {
    alt((
        quoted('\'', "'\\\r\n"),
        quoted('"', "\"\\\r\n"),
        quoted('`', "`\\"),
    ))(input)
}

/// A lone `/` that doesn't start a comment, e.g. division.
fn slash(input: &str) -> IResult<&str, &str> {
    terminated(tag("/"), not(one_of("/*")))(input)
}

/// `/body/flags`. Inside the body, escapes and `[...]` classes may contain `/`; a line break
/// before the closing slash is fatal.
fn regex_literal(input: &str) -> IResult<&str, &str> {
    let (body, _) = slash(input)?;
    let mut in_class = false;
    let mut escaping = false;
    for (i, c) in body.char_indices() {
        if is_line_terminator(c) {
            break;
        }
        match c {
            _ if escaping => escaping = false,
            '\\' => escaping = true,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                let (rest, _) = take_while(|c: char| c.is_alphanumeric())(&body[i + 1..])?;
                return Ok((rest, &input[..input.offset(rest)]));
            }
            _ => {}
        }
    }
    Err(nom::Err::Failure((input, ErrorKind::Verify)))
}

/// Whether a `/` after `prev`, the last non-space character of code, begins a regex rather than
/// a division.
fn regex_allowed(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => "(,=:[!&|?{};+-*%<>~^".contains(c),
    }
}

/// One piece of code: a run without slashes or quotes, a division slash, or a string literal.
fn source_piece(input: &str) -> IResult<&str, Chunk<'_>> {
    map(alt((is_not("/'\"`"), slash, string_literal)), Chunk::Source)(input)
}

/// Splits `input` into comments and everything else. Adjacent pieces of code are joined into a
/// single `Chunk::Source`.
pub fn lex(input: &str) -> IResult<&str, Vec<Chunk<'_>>> {
    let mut chunks = Vec::new();
    let mut rest = input;
    let mut source_start = None;
    let mut prev = None;

    while !rest.is_empty() {
        let (next, chunk) = if regex_allowed(prev) {
            alt((
                comment_chunk,
                map(regex_literal, Chunk::Source),
                source_piece,
            ))(rest)?
        } else {
            alt((comment_chunk, source_piece))(rest)?
        };
        match chunk {
            Chunk::Source(code) => {
                source_start.get_or_insert(input.offset(code));
                if let Some(c) = code.chars().rev().find(|c| !c.is_whitespace()) {
                    prev = Some(c);
                }
            }
            comment => {
                if let Some(start) = source_start.take() {
                    chunks.push(Chunk::Source(&input[start..input.offset(rest)]));
                }
                chunks.push(comment);
            }
        }
        rest = next;
    }
    if let Some(start) = source_start {
        chunks.push(Chunk::Source(&input[start..]));
    }

    Ok((rest, chunks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn scan(text: &str) -> Vec<Comment<'_>> {
        JsScanner.extract_comments(text).unwrap()
    }

    #[test]
    fn lex_empty() {
        assert_eq!(Ok(("", vec![])), lex(""));
    }

    #[test]
    fn lex_source_simple() {
        assert_eq!(
            Ok(("", vec![Chunk::Source("var a = b / c;")])),
            lex("var a = b / c;")
        );
    }

    #[test]
    fn lex_line_comment() {
        assert_eq!(
            Ok((
                "",
                vec![
                    Chunk::Source("abc "),
                    Chunk::Comment {
                        kind: CommentKind::Line,
                        value: " foo bar baz",
                        raw: "// foo bar baz",
                    },
                    Chunk::Source("\n"),
                ]
            )),
            lex("abc // foo bar baz\n")
        );
    }

    #[test]
    fn scan_both_kinds() {
        let text = "abc // foo bar baz\n/* quux fez */";
        assert_eq!(
            vec![
                Comment {
                    id: 0,
                    kind: CommentKind::Line,
                    value: " foo bar baz",
                    span: Span { start: 4, end: 18 },
                },
                Comment {
                    id: 1,
                    kind: CommentKind::Block,
                    value: " quux fez ",
                    span: Span { start: 19, end: 33 },
                },
            ],
            scan(text)
        );
    }

    #[test]
    fn spans_rebuild_tokens() {
        let text = indoc!(
            r#"
            /*!
             * banner
             */
            'use strict'; // mode
            var x = 1 /* one */ + 2; //! keep
            //
            /**/
            "#
        );
        let comments = scan(text);
        assert_eq!(6, comments.len());
        for comment in comments {
            assert_eq!(&text[comment.span.start..comment.span.end], comment.token());
        }
    }

    #[test]
    fn line_comment_excludes_terminator() {
        let comments = scan("a // one\r\nb // two\rc");
        assert_eq!(
            vec![" one", " two"],
            comments.iter().map(|c| c.value).collect::<Vec<_>>()
        );
    }

    #[test]
    fn block_comments_do_not_nest() {
        let comments = scan("/* a /* b */ c */");
        assert_eq!(1, comments.len());
        assert_eq!(" a /* b ", comments[0].value);
    }

    #[test]
    fn strings_hide_comment_markers() {
        let text = indoc!(
            r#"
            var url = "http://example.com/*";
            var s = '// not a comment', t = 'it\'s';
            var tpl = `line one
            /* still a string */`;
            "#
        );
        assert_eq!(Vec::<Comment<'_>>::new(), scan(text));
    }

    #[test]
    fn division_is_source() {
        let comments = scan("x = a / b; y = c /d // half");
        assert_eq!(1, comments.len());
        assert_eq!(" half", comments[0].value);
    }

    #[test]
    fn preserved_comments() {
        let comments = scan("//! a\n/*! b */\n// c");
        assert_eq!(
            vec![true, true, false],
            comments.iter().map(Comment::is_preserved).collect::<Vec<_>>()
        );
    }

    #[test]
    fn unterminated_block_comment() {
        let err = JsScanner.extract_comments("a;\n  /* open").unwrap_err();
        assert_eq!(
            ScanError {
                kind: ScanErrorKind::UnterminatedComment,
                offset: 5,
                line: 2,
                column: 3,
            },
            err
        );
    }

    #[test]
    fn unterminated_strings() {
        for text in &["'abc", "\"abc\ndef\"", "`abc"] {
            let err = JsScanner.extract_comments(text).unwrap_err();
            assert_eq!(ScanErrorKind::UnterminatedString, err.kind);
            assert_eq!(0, err.offset);
        }
    }

    #[test]
    fn regex_literals_hide_comment_markers() {
        let text = "a = /\\/*/; b(); /* c */";
        let comments = scan(text);
        assert_eq!(1, comments.len());
        assert_eq!(" c ", comments[0].value);

        assert_eq!(
            Vec::<Comment<'_>>::new(),
            scan("x = y.replace(/\"/g, '').split(/[/*]/); z = f(/'/i)")
        );
    }

    #[test]
    fn slash_after_code_is_division() {
        let comments = scan("n = (a + b) / 2 /* avg */; m = x[1] / y // ratio");
        assert_eq!(
            vec![" avg ", " ratio"],
            comments.iter().map(|c| c.value).collect::<Vec<_>>()
        );
    }

    #[test]
    fn comments_between_code_and_regex() {
        let comments = scan("x = /* pattern */ /a*b/g.test(s); // done");
        assert_eq!(
            vec![" pattern ", " done"],
            comments.iter().map(|c| c.value).collect::<Vec<_>>()
        );
    }

    #[test]
    fn unterminated_regex() {
        let err = JsScanner.extract_comments("ok();\nx = /abc\n").unwrap_err();
        assert_eq!(ScanErrorKind::UnterminatedRegex, err.kind);
        assert_eq!((2, 5), (err.line, err.column));
    }

    #[test]
    fn empty_strings() {
        assert_eq!(
            Ok(("", vec![Chunk::Source("a = '' + \"\" + ``;")])),
            lex("a = '' + \"\" + ``;")
        );
    }
}
