use clap::Parser;
use kwscript::cli::{self, AppConfig, Args, Commands, LineSink};
use kwscript::config::KeywordTable;
use kwscript::diagnostic::{render_diagnostics, Diagnostic, DiagnosticRenderer};
use kwscript::format::globals_to_json_string;
use kwscript::interpreter;
use kwscript::Value;
use owo_colors::OwoColorize;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        cli::generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    init_tracing(&config);

    let keywords = match cli::keyword_config_from_args(&args) {
        Ok(keywords) => keywords,
        Err(e) => {
            error_message(&config, &e);
            std::process::exit(1);
        }
    };
    let table = KeywordTable::new(&keywords);
    report_unreachable_keywords(&table, &config);

    let (source, file_name) = match read_source(&args, &config) {
        Ok(input) => input,
        Err(e) => {
            error_message(&config, &e);
            std::process::exit(1);
        }
    };

    tracing::debug!(bytes = source.len(), file = %file_name, "read source");
    if !run_source(&source, &file_name, &table, &config) {
        std::process::exit(1);
    }
}

fn init_tracing(config: &AppConfig) {
    let default_level = if config.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(config.color_enabled)
        .with_target(false)
        .compact()
        .init();
}

fn report_unreachable_keywords(table: &KeywordTable, config: &AppConfig) {
    let renderer = DiagnosticRenderer::new("", "keywords", config.color_enabled);
    for (role, spelling) in table.unreachable() {
        let warning = Diagnostic::warning(format!(
            "spelling `{}` for the {} keyword can never be lexed",
            spelling, role
        ))
        .with_note("keywords must be spelled like identifiers")
        .with_help(format!("choose another spelling for `{}`", role.config_key()));
        eprint!("{}", renderer.render(&warning));
    }
}

fn read_source(args: &Args, config: &AppConfig) -> Result<(String, String), String> {
    if let Some(code) = &args.eval {
        tracing::debug!("using source from --eval");
        return Ok((code.clone(), "<eval>".to_string()));
    }
    if let Some(file) = &args.file {
        tracing::debug!(path = %file.display(), "reading script file");
        return Ok((read_file(file)?, file.display().to_string()));
    }
    if atty::is(atty::Stream::Stdin) {
        return Ok((read_interactive(config)?, "<stdin>".to_string()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Failed to read from stdin: {}", e))?;
    Ok((buffer, "<stdin>".to_string()))
}

/// Collects lines until EOF or a line reading `exit`, then runs them as one program.
fn read_interactive(config: &AppConfig) -> Result<String, String> {
    if !config.verbose {
        println!("kwscript interactive mode");
        println!("Type your program (multi-line supported). Finish with Ctrl+D or type 'exit' on a new line.");
        println!();
    }

    let mut program = String::new();
    loop {
        print!("kw> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                if line.trim() == "exit" {
                    break;
                }
                program.push_str(&line);
            }
            Err(e) => return Err(format!("Error reading input: {}", e)),
        }
    }
    println!();
    Ok(program)
}

fn run_source(source: &str, file_name: &str, table: &KeywordTable, config: &AppConfig) -> bool {
    let stdout = io::stdout();
    let mut sink = LineSink::new(stdout.lock());

    let succeeded = match interpreter::parse_and_run_with_diagnostics(source, table, |value: &Value| {
        sink.write_line(value)
    }) {
        Ok(outcome) => {
            tracing::debug!(value = %outcome.value, "run succeeded");
            if config.print_globals {
                sink.write_line(globals_to_json_string(&outcome.globals, config.compact));
            }
            true
        }
        Err(diagnostics) => {
            let rendered = render_diagnostics(source, file_name, &diagnostics, config.color_enabled);
            eprint!("{}", rendered);
            false
        }
    };

    match sink.finish() {
        Ok(()) => succeeded,
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => false,
        Err(e) => {
            error_message(config, &format!("Failed to write output: {}", e));
            false
        }
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
