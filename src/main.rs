use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::AppSettings;
use log::info;
use structopt::StructOpt;

use strip_comments::util::{read_input, read_options, Writer};
use strip_comments::{strip, Error, Options, Removal, Result};

/// Strip line and block comments from JavaScript-like source.
#[derive(StructOpt, Debug)]
#[structopt(name = "strip-comments", setting = AppSettings::ColoredHelp)]
struct Opt {
    /// File to strip of comments. Defaults to STDIN.
    #[structopt(parse(from_os_str))]
    input: Option<PathBuf>,

    /// File for output. Defaults to STDOUT.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// TOML file with options; flags given here override it.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Keep comments starting with '!', like /*! license */.
    #[structopt(long)]
    safe: bool,

    /// Only remove block comments.
    #[structopt(long, conflicts_with = "line")]
    block: bool,

    /// Only remove line comments.
    #[structopt(long)]
    line: bool,

    /// Print nothing and exit successfully if the input can't be scanned.
    #[structopt(long)]
    silent: bool,

    /// Remove comments by searching for their text instead of by position.
    #[structopt(long)]
    literal: bool,
}

impl Opt {
    /// Only flags that were actually given are set, so they layer over a config file.
    fn options(&self) -> Options {
        let flag = |set: bool| if set { Some(true) } else { None };
        Options {
            safe: flag(self.safe),
            block: flag(self.block),
            line: flag(self.line),
            silent: flag(self.silent),
            removal: if self.literal {
                Some(Removal::Literal)
            } else {
                None
            },
        }
    }
}

fn run(opt: Opt) -> Result<()> {
    let options = match &opt.config {
        Some(path) => read_options(path)?.merge(opt.options()),
        None => opt.options(),
    };
    info!("Using {:?}", options);

    let text = read_input(opt.input.as_deref())?;
    let stripped = match strip(&text, &options)? {
        Some(stripped) => stripped,
        None => return Ok(()),
    };

    let mut output = Writer::create(opt.output.as_deref())?;
    output
        .write_all(stripped.as_bytes())
        .and_then(|_| output.flush())
        .map_err(Error::write)
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Opt::from_args()) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
