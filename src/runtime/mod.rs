pub mod builtins;
pub mod environment;
pub mod error;
pub mod interpreter;
mod member;
pub mod operators;
pub mod value;

pub use environment::Environment;
pub use error::{RuntimeError, RuntimeResult};
pub use interpreter::{Interpreter, InterpreterConfig};
pub use value::Value;
