use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Cannot declare `{name}`: it is already defined in this scope")]
    DuplicateDeclaration { name: String },
    #[error("Cannot assign to constant `{name}`")]
    ConstantAssignment { name: String },
    #[error("Cannot resolve `{name}`: it does not exist")]
    UnresolvedName { name: String },
    #[error("Invalid assignment target: cannot assign to a {target}")]
    InvalidAssignmentTarget { target: String },
    #[error("Cannot index into a value of type {type_name}")]
    NotIndexable { type_name: &'static str },
    #[error("Array index must be a number, found {type_name}")]
    NonNumericIndex { type_name: &'static str },
    #[error("Value of type {type_name} is not callable")]
    NotCallable { type_name: &'static str },
    #[error("Object key must be a string or number, found {type_name}")]
    InvalidPropertyKey { type_name: &'static str },
    #[error("Index {index} is out of range for array of length {len}")]
    IndexOutOfRange { index: f64, len: usize },
    #[error("Maximum call depth of {limit} exceeded")]
    RecursionLimit { limit: usize },
    #[error("Failed to write output: {message}")]
    Output { message: String },
}
