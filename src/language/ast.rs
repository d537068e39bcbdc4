use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    VarDeclaration(VarDeclaration),
    FuncDeclaration(Rc<FuncDeclaration>),
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclaration {
    pub constant: bool,
    pub identifier: String,
    pub value: Option<Expr>,
}

/// Shared with every function value created from it, so the body is
/// never copied when a closure is made.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDeclaration {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    NumericLiteral(f64),
    StringLiteral(String),
    Identifier(Identifier),
    Binary(BinaryExpr),
    Assignment(AssignmentExpr),
    Object(ObjectLiteral),
    Array(ArrayLiteral),
    Member(MemberExpr),
    Call(CallExpr),
}

impl Expr {
    pub fn identifier(symbol: impl Into<String>) -> Self {
        Expr::Identifier(Identifier {
            symbol: symbol.into(),
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::NumericLiteral(_) => "numeric literal",
            Expr::StringLiteral(_) => "string literal",
            Expr::Identifier(_) => "identifier",
            Expr::Binary(_) => "binary expression",
            Expr::Assignment(_) => "assignment",
            Expr::Object(_) => "object literal",
            Expr::Array(_) => "array literal",
            Expr::Member(_) => "member expression",
            Expr::Call(_) => "call expression",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub symbol: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinaryOp,
    pub right: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentExpr {
    pub assignee: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectLiteral {
    pub properties: Vec<Property>,
}

/// `{ key }` has no value and reads the variable named `key`.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expr>,
}

/// `object.property` when `computed` is false, `object[property]` otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: Box<Expr>,
    pub computed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Eq,
    NotEq,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            ">" => BinaryOp::Greater,
            ">=" => BinaryOp::GreaterEq,
            "<" => BinaryOp::Less,
            "<=" => BinaryOp::LessEq,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
