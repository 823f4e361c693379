use std::fs::File;
use std::io;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::options::Options;

/// Either a File or Stdout; both impl Write.
pub enum Writer {
    File(File),
    Stdout(io::Stdout),
}

impl Writer {
    /// Creates (or truncates) `path`, or falls back to stdout.
    pub fn create(path: Option<&Path>) -> Result<Writer> {
        match path {
            Some(path) => File::create(path)
                .map(Writer::File)
                .map_err(Error::file_open),
            None => Ok(Writer::Stdout(io::stdout())),
        }
    }
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Writer::File(f) => f.write(buf),
            Writer::Stdout(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::File(f) => f.flush(),
            Writer::Stdout(s) => s.flush(),
        }
    }
}

/// Reads all of `path`, or stdin if there's no path.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    let mut text = String::new();
    match path {
        Some(path) => File::open(path)
            .map_err(Error::file_open)?
            .read_to_string(&mut text)
            .map_err(Error::read)?,
        None => io::stdin().read_to_string(&mut text).map_err(Error::read)?,
    };
    Ok(text)
}

pub fn read_options(path: &Path) -> Result<Options> {
    Options::from_toml(&read_input(Some(path))?)
}
