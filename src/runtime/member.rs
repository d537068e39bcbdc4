//! Member access and mutation (`a.b`, `a[i]`, `a.b[0] = v`).

use crate::language::ast::{Expr, MemberExpr};
use crate::runtime::{
    environment::Environment,
    error::{RuntimeError, RuntimeResult},
    interpreter::Interpreter,
    value::{format_number, ArrayValue, ObjectValue, Value},
};

enum Container {
    Object(ObjectValue),
    Array(ArrayValue),
}

enum Key {
    Name(String),
    Index(f64),
}

impl Interpreter {
    /// Walks `member` down to its last link, then reads it or, when
    /// `new_value` is given, writes it there and returns the written value.
    /// `key_override` replaces the final key when the last container is an
    /// object.
    pub fn resolve_member_path(
        &mut self,
        member: &MemberExpr,
        env: &Environment,
        new_value: Option<Value>,
        key_override: Option<&str>,
    ) -> RuntimeResult<Value> {
        let container = match self.evaluate_expression(&member.object, env)? {
            Value::Object(object) => Container::Object(object),
            Value::Array(array) => Container::Array(array),
            other => {
                return Err(RuntimeError::NotIndexable {
                    type_name: other.type_name(),
                })
            }
        };

        let key = match (&container, key_override) {
            (Container::Object(_), Some(name)) => Key::Name(name.to_string()),
            _ => self.member_key(member, &container, env)?,
        };

        match new_value {
            None => Ok(read(&container, &key)),
            Some(value) => write(&container, key, value),
        }
    }

    fn member_key(
        &mut self,
        member: &MemberExpr,
        container: &Container,
        env: &Environment,
    ) -> RuntimeResult<Key> {
        let key = match (member.computed, member.property.as_ref()) {
            (false, Expr::Identifier(ident)) => Value::String(ident.symbol.clone()),
            (_, expr) => self.evaluate_expression(expr, env)?,
        };

        match (container, key) {
            (Container::Object(_), Value::String(name)) => Ok(Key::Name(name)),
            (Container::Object(_), Value::Number(n)) => Ok(Key::Name(format_number(n))),
            (Container::Object(_), other) => Err(RuntimeError::InvalidPropertyKey {
                type_name: other.type_name(),
            }),
            (Container::Array(_), Value::Number(n)) => Ok(Key::Index(n.trunc())),
            (Container::Array(_), other) => Err(RuntimeError::NonNumericIndex {
                type_name: other.type_name(),
            }),
        }
    }
}

fn read(container: &Container, key: &Key) -> Value {
    let found = match (container, key) {
        (Container::Object(object), Key::Name(name)) => object.get(name),
        (Container::Array(array), Key::Index(index)) if *index >= 0.0 => {
            array.get(*index as usize)
        }
        _ => None,
    };
    found.unwrap_or(Value::Null)
}

fn write(container: &Container, key: Key, value: Value) -> RuntimeResult<Value> {
    match (container, key) {
        (Container::Object(object), Key::Name(name)) => {
            object.insert(name, value.clone());
            Ok(value)
        }
        (Container::Array(array), Key::Index(index)) => {
            let stored = index >= 0.0 && array.store(index as usize, value.clone());
            if stored {
                Ok(value)
            } else {
                Err(RuntimeError::IndexOutOfRange {
                    index,
                    len: array.len(),
                })
            }
        }
        // `member_key` only pairs names with objects and indices with arrays.
        (Container::Object(_), Key::Index(index)) => {
            write(container, Key::Name(format_number(index)), value)
        }
        (Container::Array(_), Key::Name(_)) => Err(RuntimeError::NonNumericIndex {
            type_name: "string",
        }),
    }
}
