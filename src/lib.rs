pub mod diagnostics;
pub mod language;
pub mod runtime;
pub mod session;
pub mod stack;
