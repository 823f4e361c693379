use std::error;
use std::fmt;
use std::io;

use thiserror::Error;
use toml::de::Error as TomlError;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Failed to scan comments: {0}")]
    Scan(#[from] ScanError),

    #[error("Failed to parse options as TOML: {0}")]
    OptionsParseToml(#[from] TomlError),

    #[error("Failed to open file: {0}")]
    FileOpen(#[source] Box<IoError>),

    #[error("Failed to read input: {0}")]
    Read(#[source] Box<IoError>),

    #[error("Failed to write output: {0}")]
    Write(#[source] Box<IoError>),
}

impl Error {
    pub fn file_open(err: io::Error) -> Error {
        Error::FileOpen(Box::new(IoError(err)))
    }

    pub fn read(err: io::Error) -> Error {
        Error::Read(Box::new(IoError(err)))
    }

    pub fn write(err: io::Error) -> Error {
        Error::Write(Box::new(IoError(err)))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The scanner could not tokenize its input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column}")]
pub struct ScanError {
    pub kind: ScanErrorKind,
    /// Byte offset of the construct that failed to scan.
    pub offset: usize,
    /// 1-based line of `offset`.
    pub line: usize,
    /// 1-based column of `offset`, counted in chars.
    pub column: usize,
}

impl ScanError {
    /// Builds an error at `offset` in `input`, resolving its line and column.
    pub fn at(input: &str, offset: usize, kind: ScanErrorKind) -> ScanError {
        let before = input.get(..offset).unwrap_or(input);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(i) => before[i + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        ScanError {
            kind,
            offset,
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// A `/*` with no closing `*/`.
    UnterminatedComment,
    /// A string or template literal with no closing quote.
    UnterminatedString,
    /// A regular expression literal with no closing `/` on its line.
    UnterminatedRegex,
    /// Input the scanner had no rule for.
    Unrecognized,
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScanErrorKind::UnterminatedComment => "unterminated block comment",
            ScanErrorKind::UnterminatedString => "unterminated string literal",
            ScanErrorKind::UnterminatedRegex => "unterminated regular expression literal",
            ScanErrorKind::Unrecognized => "unrecognized input",
        })
    }
}

#[derive(Debug)]
pub struct IoError(io::Error);

impl IoError {
    fn kind(&self) -> io::ErrorKind {
        self.0.kind()
    }
}

impl PartialEq for IoError {
    fn eq(&self, rhs: &Self) -> bool {
        self.kind() == rhs.kind()
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl error::Error for IoError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.0)
    }
}
