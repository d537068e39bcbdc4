use clap::{Parser, Subcommand};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tern_lang::{
    diagnostics,
    language::{errors::SyntaxErrors, lexer::tokenize},
    runtime::interpreter::{InterpreterConfig, DEFAULT_MAX_CALL_DEPTH},
    session::{self, Session},
};

#[derive(Parser)]
#[command(name = "tern", version, about = "Interpreter for the tern scripting language", long_about = None)]
struct Cli {
    /// Nested function calls allowed before evaluation fails
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a source file
    Run { path: PathBuf },
    /// Start an interactive session (the default)
    Repl,
    /// Print the token stream of a source file
    Tokens { path: PathBuf },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = InterpreterConfig {
        max_call_depth: cli.max_call_depth,
    };

    match cli.command.unwrap_or(Command::Repl) {
        Command::Run { path } => run(&path, config),
        Command::Repl => repl(config),
        Command::Tokens { path } => tokens(&path),
    }
}

/// Installs a subscriber only when `RUST_LOG` is set; otherwise tracing
/// stays silent.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run(path: &Path, config: InterpreterConfig) -> ExitCode {
    let name = path.display().to_string();
    let source = match session::load_source(path) {
        Ok(source) => source,
        Err(err) => {
            diagnostics::report_exec_error(&name, "", &err);
            return ExitCode::FAILURE;
        }
    };

    match Session::new(config).and_then(|mut session| session.eval_source(&source)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            diagnostics::report_exec_error(&name, &source, &err);
            ExitCode::FAILURE
        }
    }
}

fn repl(config: InterpreterConfig) -> ExitCode {
    let mut session = match Session::new(config) {
        Ok(session) => session,
        Err(err) => {
            diagnostics::report_exec_error("<repl>", "", &err);
            return ExitCode::FAILURE;
        }
    };
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Failed to start line editor: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("tern v{} (empty line or `exit` to quit)", env!("CARGO_PKG_VERSION"));
    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() || session::requests_exit(&line) {
                    break;
                }
                if let Err(err) = editor.add_history_entry(line.as_str()) {
                    debug!(%err, "failed to record history entry");
                }
                match session.eval_source(&line) {
                    Ok(value) => println!("{value}"),
                    Err(err) => diagnostics::report_exec_error("<repl>", &line, &err),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Failed to read input: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn tokens(path: &Path) -> ExitCode {
    let name = path.display().to_string();
    let source = match session::load_source(path) {
        Ok(source) => source,
        Err(err) => {
            diagnostics::report_exec_error(&name, "", &err);
            return ExitCode::FAILURE;
        }
    };

    match tokenize(&source) {
        Ok(tokens) => {
            for token in tokens {
                println!("{:?} {}", token.kind, token.value);
            }
            ExitCode::SUCCESS
        }
        Err(errors) => {
            diagnostics::emit_syntax_errors(&name, &source, &SyntaxErrors::from(errors));
            ExitCode::FAILURE
        }
    }
}
