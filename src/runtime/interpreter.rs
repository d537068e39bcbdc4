use crate::language::ast::*;
use crate::runtime::{
    environment::Environment,
    error::{RuntimeError, RuntimeResult},
    operators::apply_binary,
    value::{ArrayValue, FunctionValue, ObjectValue, Value},
};
use crate::stack::ensure_sufficient_stack;
use std::rc::Rc;
use tracing::trace;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Number of nested user-function calls allowed before evaluation fails.
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Tree-walking evaluator. Holds no bindings of its own; every evaluation
/// runs against the environment it is handed.
#[derive(Debug)]
pub struct Interpreter {
    config: InterpreterConfig,
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(InterpreterConfig::default())
    }
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config, depth: 0 }
    }

    pub fn evaluate_program(&mut self, program: &Program, env: &Environment) -> RuntimeResult<Value> {
        self.evaluate_body(&program.body, env)
    }

    fn evaluate_body(&mut self, body: &[Stmt], env: &Environment) -> RuntimeResult<Value> {
        let mut last = Value::Null;
        for stmt in body {
            last = self.evaluate(stmt, env)?;
        }
        Ok(last)
    }

    pub fn evaluate(&mut self, stmt: &Stmt, env: &Environment) -> RuntimeResult<Value> {
        match stmt {
            Stmt::VarDeclaration(decl) => {
                let value = match &decl.value {
                    Some(expr) => self.evaluate_expression(expr, env)?,
                    None => Value::Null,
                };
                env.declare(&decl.identifier, value, decl.constant)
            }
            Stmt::FuncDeclaration(decl) => {
                let function = FunctionValue::new(Rc::clone(decl), env.clone());
                env.declare(&decl.name, Value::Function(function), true)
            }
            Stmt::Expr(expr) => self.evaluate_expression(expr, env),
        }
    }

    pub fn evaluate_expression(&mut self, expr: &Expr, env: &Environment) -> RuntimeResult<Value> {
        ensure_sufficient_stack(|| self.eval_expression(expr, env))
    }

    fn eval_expression(&mut self, expr: &Expr, env: &Environment) -> RuntimeResult<Value> {
        match expr {
            Expr::NumericLiteral(value) => Ok(Value::Number(*value)),
            Expr::StringLiteral(value) => Ok(Value::String(value.clone())),
            Expr::Identifier(ident) => env.lookup(&ident.symbol),
            Expr::Binary(binary) => {
                let lhs = self.evaluate_expression(&binary.left, env)?;
                let rhs = self.evaluate_expression(&binary.right, env)?;
                Ok(apply_binary(binary.op, &lhs, &rhs))
            }
            Expr::Assignment(assignment) => self.eval_assignment(assignment, env),
            Expr::Object(object) => self.eval_object(object, env),
            Expr::Array(array) => {
                let items = array
                    .elements
                    .iter()
                    .map(|element| self.evaluate_expression(element, env))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::Array(ArrayValue::new(items)))
            }
            Expr::Member(member) => self.resolve_member_path(member, env, None, None),
            Expr::Call(call) => {
                // Arguments run before the callee is resolved.
                let args = call
                    .arguments
                    .iter()
                    .map(|arg| self.evaluate_expression(arg, env))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                let callee = self.evaluate_expression(&call.callee, env)?;
                self.call_value(&callee, &args, env)
            }
        }
    }

    fn eval_assignment(&mut self, assignment: &AssignmentExpr, env: &Environment) -> RuntimeResult<Value> {
        match assignment.assignee.as_ref() {
            Expr::Identifier(ident) => {
                let value = self.evaluate_expression(&assignment.value, env)?;
                env.assign(&ident.symbol, value)
            }
            Expr::Member(member) => {
                let value = self.evaluate_expression(&assignment.value, env)?;
                self.resolve_member_path(member, env, Some(value), None)
            }
            other => Err(RuntimeError::InvalidAssignmentTarget {
                target: other.kind_name().to_string(),
            }),
        }
    }

    fn eval_object(&mut self, literal: &ObjectLiteral, env: &Environment) -> RuntimeResult<Value> {
        let object = ObjectValue::new();
        for property in &literal.properties {
            let value = match &property.value {
                Some(expr) => self.evaluate_expression(expr, env)?,
                None => env.lookup(&property.key)?,
            };
            object.insert(property.key.clone(), value);
        }
        Ok(Value::Object(object))
    }

    /// Invokes `callee` with already-evaluated arguments. Native functions see
    /// the caller's environment; user functions run in a fresh scope chained
    /// to the one they were declared in.
    pub fn call_value(&mut self, callee: &Value, args: &[Value], env: &Environment) -> RuntimeResult<Value> {
        match callee {
            Value::Internal(native) => {
                trace!(function = native.name(), "native call");
                native.call(args, env)
            }
            Value::Function(function) => self.call_function(function, args),
            other => Err(RuntimeError::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }

    fn call_function(&mut self, function: &FunctionValue, args: &[Value]) -> RuntimeResult<Value> {
        if self.depth >= self.config.max_call_depth {
            return Err(RuntimeError::RecursionLimit {
                limit: self.config.max_call_depth,
            });
        }

        let scope = Environment::with_parent(function.captured_env());
        for (idx, parameter) in function.parameters().iter().enumerate() {
            let value = args.get(idx).cloned().unwrap_or(Value::Null);
            scope.declare(parameter, value, false)?;
        }

        self.depth += 1;
        trace!(function = function.name(), depth = self.depth, "call");
        let result = self.evaluate_body(function.body(), &scope);
        self.depth -= 1;
        result
    }
}
