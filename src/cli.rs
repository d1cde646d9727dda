use crate::config::KeywordConfig;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kwscript")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interpreter for a small scripting language with configurable keywords", long_about = None)]
pub struct Args {
    /// Script to run; read from stdin when omitted
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Run CODE instead of reading a file
    #[arg(short = 'e', long = "eval", value_name = "CODE", conflicts_with = "file")]
    pub eval: Option<String>,

    /// JSON file with keyword spellings, e.g. {"letKeyword": "var"}
    #[arg(long = "keywords", value_name = "FILE.json")]
    pub keywords: Option<PathBuf>,

    /// Override one keyword, e.g. `-k let=var`; applied after --keywords
    #[arg(short = 'k', long = "keyword", value_name = "ROLE=SPELLING")]
    pub keyword_overrides: Vec<String>,

    /// Print the final global scope as JSON
    #[arg(long = "globals")]
    pub globals: bool,

    #[arg(long = "compact")]
    pub compact: bool,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a shell completion script
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}

pub struct AppConfig {
    pub color_enabled: bool,
    pub compact: bool,
    pub verbose: bool,
    pub print_globals: bool,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr) && atty::is(atty::Stream::Stdout),
        };

        AppConfig {
            color_enabled,
            compact: args.compact,
            verbose: args.verbose,
            print_globals: args.globals,
        }
    }
}

/// Builds the keyword configuration: `--keywords` file first, then each `-k`.
pub fn keyword_config_from_args(args: &Args) -> Result<KeywordConfig, String> {
    let mut config = match &args.keywords {
        Some(path) => KeywordConfig::from_json_file(path)?,
        None => KeywordConfig::default(),
    };
    for assignment in &args.keyword_overrides {
        config.apply_override(assignment)?;
    }
    Ok(config)
}

/// Line-oriented output. The first write failure is kept and later lines are dropped.
pub struct LineSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        LineSink { writer, error: None }
    }

    pub fn write_line(&mut self, line: impl fmt::Display) {
        if self.error.is_some() {
            return;
        }
        let written = writeln!(self.writer, "{}", line).and_then(|()| self.writer.flush());
        if let Err(e) = written {
            tracing::debug!(error = %e, "output write failed, dropping further lines");
            self.error = Some(e);
        }
    }

    pub fn finish(self) -> io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
