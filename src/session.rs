use crate::language::{errors::SyntaxErrors, lexer::tokenize, parser::parse_program, token::TokenKind};
use crate::runtime::{
    builtins::{create_global_env, stdout_sink, OutputSink},
    environment::Environment,
    error::RuntimeError,
    interpreter::{Interpreter, InterpreterConfig},
    value::Value,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}")]
    Syntax(SyntaxErrors),
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<SyntaxErrors> for ExecError {
    fn from(errors: SyntaxErrors) -> Self {
        ExecError::Syntax(errors)
    }
}

/// One evaluator plus the global scope it runs against. Bindings persist
/// across `eval_source` calls, including calls that fail partway.
pub struct Session {
    interpreter: Interpreter,
    globals: Environment,
}

impl Session {
    pub fn new(config: InterpreterConfig) -> Result<Self, ExecError> {
        Self::with_output(config, stdout_sink())
    }

    pub fn with_output(config: InterpreterConfig, output: OutputSink) -> Result<Self, ExecError> {
        Ok(Self {
            interpreter: Interpreter::new(config),
            globals: create_global_env(output)?,
        })
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn eval_source(&mut self, source: &str) -> Result<Value, ExecError> {
        debug!(bytes = source.len(), "evaluating source");
        let program = parse_program(source)?;
        let value = self.interpreter.evaluate_program(&program, &self.globals)?;
        Ok(value)
    }
}

pub fn load_source(path: &Path) -> Result<String, ExecError> {
    fs::read_to_string(path).map_err(|source| ExecError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Evaluates a file in a fresh session that prints to stdout.
pub fn run_file(path: &Path, config: InterpreterConfig) -> Result<Value, ExecError> {
    let source = load_source(path)?;
    Session::new(config)?.eval_source(&source)
}

/// True when `line` contains an `exit` identifier, which ends an
/// interactive session. Lines that do not lex never request exit.
pub fn requests_exit(line: &str) -> bool {
    tokenize(line)
        .map(|tokens| {
            tokens
                .iter()
                .any(|token| token.kind == TokenKind::Identifier && token.value == "exit")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn captured_session() -> (Session, Rc<RefCell<Vec<u8>>>) {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        let session =
            Session::with_output(InterpreterConfig::default(), buffer.clone()).expect("session");
        (session, buffer)
    }

    #[test]
    fn bindings_persist_between_sources() {
        let (mut session, _) = captured_session();
        session.eval_source("let x = 20;").expect("declare");
        session.eval_source("func double(n) { n * 2 }").expect("declare");
        assert_eq!(
            session.eval_source("double(x) + 2").expect("eval"),
            Value::Number(42.0)
        );
    }

    #[test]
    fn syntax_errors_leave_session_usable() {
        let (mut session, _) = captured_session();
        let err = session.eval_source("let = 1").expect_err("should fail");
        assert!(matches!(err, ExecError::Syntax(_)));
        assert_eq!(
            session.eval_source("1 + 1").expect("eval"),
            Value::Number(2.0)
        );
    }

    #[test]
    fn runtime_errors_keep_prior_effects() {
        let (mut session, buffer) = captured_session();
        let err = session
            .eval_source("print(\"before\"); let x = 1; missing()")
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Runtime error: Cannot resolve `missing`: it does not exist");
        assert_eq!(String::from_utf8_lossy(&buffer.borrow()), "before\n");
        assert!(session.globals().lookup("x").is_ok());
    }

    #[test]
    fn lex_errors_are_reported_not_fatal() {
        let (mut session, _) = captured_session();
        let err = session.eval_source("let a = 1 @ 2").expect_err("should fail");
        assert!(matches!(err, ExecError::Syntax(errors) if errors.len() == 1));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = Path::new("definitely/not/here.tern");
        let err = run_file(path, InterpreterConfig::default()).expect_err("should fail");
        assert!(matches!(err, ExecError::Io { .. }));
        assert!(err.to_string().starts_with("Failed to access definitely/not/here.tern"));
    }

    #[test]
    fn run_file_evaluates_contents() {
        let path = std::env::temp_dir().join(format!("tern-session-{}.tern", std::process::id()));
        fs::write(&path, "let a = [1, 2]; a[1] *= 5; a[1]").expect("write script");
        let result = run_file(&path, InterpreterConfig::default());
        let _ = fs::remove_file(&path);
        assert_eq!(result.expect("run"), Value::Number(10.0));
    }

    #[test]
    fn exit_is_recognized_as_an_identifier_token() {
        assert!(requests_exit("exit"));
        assert!(requests_exit("  exit  "));
        assert!(!requests_exit("exiting"));
        assert!(!requests_exit("\"exit\""));
        assert!(!requests_exit("# exit"));
    }
}
