use crate::language::ast::{FuncDeclaration, Stmt};
use crate::runtime::{environment::Environment, error::RuntimeResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Number(f64),
    String(String),
    Boolean(bool),
    Array(ArrayValue),
    Object(ObjectValue),
    Internal(NativeFunction),
    Function(FunctionValue),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(ArrayValue::new(items))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(ObjectValue::from_entries(entries))
    }

    pub fn native(
        name: &str,
        call: impl Fn(&[Value], &Environment) -> RuntimeResult<Value> + 'static,
    ) -> Self {
        Value::Internal(NativeFunction::new(name, call))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Internal(_) => "internal",
            Value::Function(_) => "function",
        }
    }

}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other, &mut Vec::new())
    }
}

/// Structural comparison. A container pair already under comparison counts
/// as equal, so cyclic containers terminate.
fn equal(a: &Value, b: &Value, open: &mut Vec<(*const (), *const ())>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            let pair = (a.as_ptr(), b.as_ptr());
            if a.ptr_eq(b) || open.contains(&pair) {
                return true;
            }
            let (lhs, rhs) = (a.to_vec(), b.to_vec());
            if lhs.len() != rhs.len() {
                return false;
            }
            open.push(pair);
            let same = lhs.iter().zip(&rhs).all(|(x, y)| equal(x, y, open));
            open.pop();
            same
        }
        (Value::Object(a), Value::Object(b)) => {
            let pair = (a.as_ptr(), b.as_ptr());
            if a.ptr_eq(b) || open.contains(&pair) {
                return true;
            }
            let (lhs, rhs) = (a.entries(), b.entries());
            if lhs.len() != rhs.len() {
                return false;
            }
            open.push(pair);
            let same = lhs
                .iter()
                .zip(&rhs)
                .all(|((ka, va), (kb, vb))| ka == kb && equal(va, vb, open));
            open.pop();
            same
        }
        (Value::Internal(a), Value::Internal(b)) => Rc::ptr_eq(&a.call, &b.call),
        (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
        _ => false,
    }
}

/// Renders numbers the way `print` shows them: integral values without a
/// fractional part, infinities spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f, &mut Vec::new(), false)
    }
}

fn render(
    value: &Value,
    f: &mut fmt::Formatter<'_>,
    open: &mut Vec<*const ()>,
    nested: bool,
) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Number(n) => f.write_str(&format_number(*n)),
        Value::String(s) if nested => write!(f, "{s:?}"),
        Value::String(s) => f.write_str(s),
        Value::Boolean(b) => write!(f, "{b}"),
        Value::Array(array) => {
            let ptr = array.as_ptr();
            if open.contains(&ptr) {
                return f.write_str("[...]");
            }
            open.push(ptr);
            write!(f, "[")?;
            for (idx, item) in array.to_vec().iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                render(item, f, open, true)?;
            }
            open.pop();
            write!(f, "]")
        }
        Value::Object(object) => {
            let ptr = object.as_ptr();
            if open.contains(&ptr) {
                return f.write_str("{...}");
            }
            let entries = object.entries();
            if entries.is_empty() {
                return f.write_str("{}");
            }
            open.push(ptr);
            write!(f, "{{ ")?;
            for (idx, (key, item)) in entries.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: ")?;
                render(item, f, open, true)?;
            }
            open.pop();
            write!(f, " }}")
        }
        Value::Internal(native) => write!(f, "<native {}>", native.name()),
        Value::Function(function) => write!(f, "<func {}>", function.name()),
    }
}

/// Shared, index-mutable sequence. Clones alias the same storage.
#[derive(Clone, Default)]
pub struct ArrayValue {
    items: Rc<RefCell<Vec<Value>>>,
}

impl ArrayValue {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// Replaces the item at `index`, or appends when `index == len`.
    /// Returns `false` when `index` lies past the end.
    pub fn store(&self, index: usize, value: Value) -> bool {
        let mut items = self.items.borrow_mut();
        if index < items.len() {
            items[index] = value;
            true
        } else if index == items.len() {
            items.push(value);
            true
        } else {
            false
        }
    }

    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &ArrayValue) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }

    fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.items).cast()
    }
}

/// Shared string-keyed mapping. Clones alias the same storage.
#[derive(Clone, Default)]
pub struct ObjectValue {
    properties: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl ObjectValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let properties = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        Self {
            properties: Rc::new(RefCell::new(properties)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.properties.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.properties.borrow_mut().insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.properties.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.borrow().is_empty()
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.properties
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &ObjectValue) -> bool {
        Rc::ptr_eq(&self.properties, &other.properties)
    }

    fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.properties).cast()
    }
}

// Containers may be cyclic, so Debug goes through the cycle-aware renderer.
impl fmt::Debug for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array({})", Value::Array(self.clone()))
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", Value::Object(self.clone()))
    }
}

pub type NativeFn = dyn Fn(&[Value], &Environment) -> RuntimeResult<Value>;

/// A host function. Receives the evaluated arguments and the caller's scope.
#[derive(Clone)]
pub struct NativeFunction {
    name: Rc<str>,
    call: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: &str,
        call: impl Fn(&[Value], &Environment) -> RuntimeResult<Value> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name),
            call: Rc::new(call),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value], env: &Environment) -> RuntimeResult<Value> {
        (self.call)(args, env)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A user-defined function closed over the scope it was declared in.
#[derive(Clone)]
pub struct FunctionValue {
    declaration: Rc<FuncDeclaration>,
    captured: Environment,
}

impl FunctionValue {
    pub fn new(declaration: Rc<FuncDeclaration>, captured: Environment) -> Self {
        Self {
            declaration,
            captured,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.declaration.parameters
    }

    pub fn body(&self) -> &[Stmt] {
        &self.declaration.body
    }

    pub fn captured_env(&self) -> &Environment {
        &self.captured
    }

    pub fn ptr_eq(&self, other: &FunctionValue) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && self.captured.ptr_eq(&other.captured)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.declaration.name)
            .field("parameters", &self.declaration.parameters)
            .finish_non_exhaustive()
    }
}
