use crate::{
    language::errors::{SyntaxError, SyntaxErrors},
    runtime::error::RuntimeError,
    session::ExecError,
};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic, Clone)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
    label: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource<String>, err: SyntaxError) -> Self {
        Self {
            src,
            span: err.to_source_span(),
            help: err.help,
            message: err.message,
            label: err.label,
        }
    }
}

pub fn emit_syntax_errors(name: &str, source: &str, errors: &SyntaxErrors) {
    let src = NamedSource::new(name, source.to_string());
    for err in errors.iter() {
        let diagnostic = SyntaxDiagnostic::from_error(src.clone(), err.clone());
        eprintln!("{:?}", Report::new(diagnostic));
    }
}

pub fn report_runtime_error(error: &RuntimeError) {
    eprintln!("Runtime error: {}", error);
}

pub fn report_io_error(path: &Path, error: &std::io::Error) {
    eprintln!("Failed to access {}: {}", path.display(), error);
}

/// Prints any execution failure to stderr. `name` and `source` label syntax
/// diagnostics.
pub fn report_exec_error(name: &str, source: &str, error: &ExecError) {
    match error {
        ExecError::Syntax(errors) => emit_syntax_errors(name, source, errors),
        ExecError::Runtime(err) => report_runtime_error(err),
        ExecError::Io { path, source } => report_io_error(path, source),
    }
}
