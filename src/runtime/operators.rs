use crate::language::ast::BinaryOp;
use crate::runtime::value::Value;

/// Applies `op` to two evaluated operands. Only numbers participate;
/// any other operand produces `null`.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Number(lhs), Value::Number(rhs)) => apply_numeric(op, *lhs, *rhs),
        _ => Value::Null,
    }
}

fn apply_numeric(op: BinaryOp, lhs: f64, rhs: f64) -> Value {
    match op {
        BinaryOp::Add => Value::Number(lhs + rhs),
        BinaryOp::Sub => Value::Number(lhs - rhs),
        BinaryOp::Mul => Value::Number(lhs * rhs),
        BinaryOp::Div => Value::Number(lhs / rhs),
        BinaryOp::Rem => Value::Number(lhs % rhs),
        BinaryOp::Greater => Value::Boolean(lhs > rhs),
        BinaryOp::GreaterEq => Value::Boolean(lhs >= rhs),
        BinaryOp::Less => Value::Boolean(lhs < rhs),
        BinaryOp::LessEq => Value::Boolean(lhs <= rhs),
        BinaryOp::Eq => Value::Boolean(lhs == rhs),
        BinaryOp::NotEq => Value::Boolean(lhs != rhs),
    }
}
