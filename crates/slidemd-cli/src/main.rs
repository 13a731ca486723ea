use anyhow::{Context, Result};
use log::{debug, info};
use slidemd_config::Config;
use slidemd_syntax::{ParseOptions, format_tree, tokenize};
use std::{
    env,
    io::{self, Read},
    path::PathBuf,
    process,
};

const USAGE: &str = "Usage: slidemd-cli [--events | --tree] [--config <path>] <file | ->";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Events,
    Tree,
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    mode: Mode,
    config: Option<PathBuf>,
    input: Input,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut mode = Mode::Events;
    let mut config = None;
    let mut input = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--events" => mode = Mode::Events,
            "--tree" => mode = Mode::Tree,
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "-" if input.is_none() => input = Some(Input::Stdin),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path if input.is_none() => input = Some(Input::File(PathBuf::from(path))),
            extra => return Err(format!("unexpected argument {extra}")),
        }
    }

    Ok(Args {
        mode,
        config,
        input: input.ok_or("no input file given")?,
    })
}

/// Extensions from `--config`, the default config file, or the defaults.
fn load_options(config: Option<&PathBuf>) -> Result<ParseOptions> {
    let loaded = match config {
        Some(path) => {
            let path = Config::expand_path(path).unwrap_or_else(|| path.clone());
            let loaded = Config::load_from_path(&path)?;
            if loaded.is_none() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            loaded
        }
        None => Config::load()?,
    };

    match loaded {
        Some(config) => {
            debug!("using extensions {:?}", config.extensions);
            Ok(config.extensions)
        }
        None => {
            info!(
                "no config file at {}, enabling every extension",
                Config::config_path().display()
            );
            Ok(ParseOptions::default())
        }
    }
}

fn read_input(input: &Input) -> Result<String> {
    match input {
        Input::Stdin => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read standard input")?;
            Ok(source)
        }
        Input::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn render(source: &str, mode: Mode, options: &ParseOptions) -> Result<String> {
    let doc = tokenize(source, options);
    match mode {
        Mode::Events => Ok(doc.debug_events()),
        Mode::Tree => {
            let tree = doc.to_tree().context("Failed to build the syntax tree")?;
            Ok(format_tree(&tree))
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let options = load_options(args.config.as_ref())?;
    let source = read_input(&args.input)?;
    print!("{}", render(&source, args.mode, &options)?);

    Ok(())
}
