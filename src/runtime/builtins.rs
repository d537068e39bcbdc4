use crate::runtime::{
    environment::Environment,
    error::{RuntimeError, RuntimeResult},
    value::Value,
};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where `print` writes. Shared so callers can keep a handle to inspect or
/// flush it.
pub type OutputSink = Rc<RefCell<dyn Write>>;

pub fn stdout_sink() -> OutputSink {
    Rc::new(RefCell::new(std::io::stdout()))
}

/// Builds the root scope: `true`, `false`, `null`, `print` and `time`, all
/// constant.
pub fn create_global_env(output: OutputSink) -> RuntimeResult<Environment> {
    let env = Environment::new();
    env.declare("true", Value::Boolean(true), true)?;
    env.declare("false", Value::Boolean(false), true)?;
    env.declare("null", Value::Null, true)?;
    env.declare(
        "print",
        Value::native("print", move |args, _| print(&output, args)),
        true,
    )?;
    env.declare("time", Value::native("time", |_, _| Ok(now_millis())), true)?;
    Ok(env)
}

fn print(output: &OutputSink, args: &[Value]) -> RuntimeResult<Value> {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    let mut sink = output.borrow_mut();
    writeln!(sink, "{line}")
        .and_then(|_| sink.flush())
        .map_err(|err| RuntimeError::Output {
            message: err.to_string(),
        })?;
    Ok(Value::Null)
}

fn now_millis() -> Value {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as f64)
        .unwrap_or(0.0);
    Value::Number(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured() -> (Rc<RefCell<Vec<u8>>>, Environment) {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        let env = create_global_env(buffer.clone()).expect("globals");
        (buffer, env)
    }

    fn call(env: &Environment, name: &str, args: &[Value]) -> Value {
        match env.lookup(name).expect("builtin") {
            Value::Internal(native) => native.call(args, env).expect("call"),
            other => panic!("expected native function, got {other:?}"),
        }
    }

    #[test]
    fn print_joins_arguments_with_spaces() {
        let (buffer, env) = captured();
        let result = call(
            &env,
            "print",
            &[Value::string("sum:"), Value::Number(5.0), Value::Boolean(true)],
        );
        assert_eq!(result, Value::Null);
        assert_eq!(String::from_utf8_lossy(&buffer.borrow()), "sum: 5 true\n");
    }

    #[test]
    fn print_without_arguments_emits_blank_line() {
        let (buffer, env) = captured();
        call(&env, "print", &[]);
        assert_eq!(buffer.borrow().as_slice(), b"\n");
    }

    #[test]
    fn time_is_milliseconds_since_epoch() {
        let (_, env) = captured();
        let Value::Number(millis) = call(&env, "time", &[]) else {
            panic!("time should return a number");
        };
        // 2020-01-01T00:00:00Z
        assert!(millis > 1_577_836_800_000.0);
        assert_eq!(millis.fract(), 0.0);
    }

    #[test]
    fn globals_are_constant() {
        let (_, env) = captured();
        for name in ["true", "false", "null", "print", "time"] {
            assert!(matches!(
                env.assign(name, Value::Null),
                Err(RuntimeError::ConstantAssignment { .. })
            ));
        }
    }
}
