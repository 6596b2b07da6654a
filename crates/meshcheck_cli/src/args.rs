use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use meshcheck::TableKind;
use tracing::Level;

pub const USAGE: &str = "\
Usage: meshcheck [DIR] [OPTIONS]

Check the Cell0Ds.csv, Cell1Ds.csv and Cell2Ds.csv tables in DIR
(default: the current directory) and print every defect on stderr.

Options:
  -c, --config FILE   read settings from a JSON file
      --json          print the full report as JSON on stdout
      --dump TABLE    print a table (cell0d, cell1d, cell2d) as it was loaded
  -v, --verbose       log debug information
  -q, --quiet         no logging, defects are still printed
  -h, --help          show this message";

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub dir: PathBuf,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub dump: Option<TableKind>,
    // `None` turns logging off
    pub log_level: Option<Level>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            config: None,
            json: false,
            dump: None,
            log_level: Some(Level::WARN),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Args),
    Help,
}

/// Parse the arguments after the program name.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command> {
    let mut parsed = Args::default();
    let mut dir: Option<PathBuf> = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        // accept both `--flag value` and `--flag=value`
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| anyhow!("`{name}` needs a value"))
        };

        match flag.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-v" | "--verbose" => parsed.log_level = Some(Level::DEBUG),
            "-q" | "--quiet" => parsed.log_level = None,
            "--json" => parsed.json = true,
            "-c" | "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--dump" => parsed.dump = Some(TableKind::from_string(&value("--dump")?)?),
            _ if flag.starts_with('-') && flag.len() > 1 => bail!("unknown option `{flag}`"),
            _ => {
                if let Some(first) = &dir {
                    bail!(
                        "only one mesh directory can be checked, got `{}` and `{arg}`",
                        first.display()
                    );
                }
                dir = Some(PathBuf::from(&arg));
            }
        }
    }

    if let Some(dir) = dir {
        parsed.dir = dir;
    }
    Ok(Command::Run(parsed))
}
