//! Abstract syntax tree consumed by the evaluator
//!
//! The node set is closed: the evaluator matches every variant exhaustively,
//! so a parser can never hand it a node kind it does not understand. Trees
//! are immutable once built; function literals share their bodies through
//! `Arc` so closures created from the same literal never copy the AST.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// A line/column pair, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Programs, blocks and statements
// ═══════════════════════════════════════════════════════════════════════

/// A parsed source file: statements in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// A `{ ... }` sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub pos: Position,
}

impl Block {
    pub fn new(statements: Vec<Statement>, pos: Position) -> Self {
        Self { statements, pos }
    }
}

/// A statement with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StmtKind,
    pub pos: Position,
}

impl Statement {
    pub fn new(kind: StmtKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `var name = value`
    Var { name: String, value: Expression },

    /// `const name = value`
    Const { name: String, value: Expression },

    /// `name := value`, `name = value`, `name += value`, ...
    Assign {
        name: String,
        op: AssignOp,
        value: Expression,
    },

    /// `name++` / `name--`
    Postfix { name: String, op: PostfixOp },

    /// `target[index] = value`
    SetItem {
        target: Expression,
        index: Expression,
        value: Expression,
    },

    /// `return` or `return value`
    Return(Option<Expression>),

    Break,

    Continue,

    /// `import name`
    Import { name: String },

    /// `func name(...) { ... }` declared as a statement
    Function(Arc<FunctionLiteral>),

    /// An expression evaluated for its value
    Expression(Expression),
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `:=` declares in the current scope
    Declare,
    /// `=` updates an existing binding
    Assign,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mul,
    /// `/=`
    Div,
}

impl AssignOp {
    /// The binary operator applied by a compound assignment.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Declare | AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AssignOp::Declare => ":=",
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

/// An expression with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub pos: Position,
}

impl Expression {
    pub fn new(kind: ExprKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Expression>),
    /// Key/value pairs in source order
    Map(Vec<(Expression, Expression)>),
    Ident(String),
    Prefix {
        op: PrefixOp,
        right: Box<Expression>,
    },
    Infix {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If(Box<IfExpr>),
    /// `condition ? consequence : alternative`
    Ternary {
        condition: Box<Expression>,
        consequence: Box<Expression>,
        alternative: Box<Expression>,
    },
    For(Box<ForLoop>),
    Switch(Box<SwitchExpr>),
    /// `a | b | c`; always at least two stages when built by the parser
    Pipe(Vec<Expression>),
    Function(Arc<FunctionLiteral>),
    Call {
        function: Box<Expression>,
        args: Vec<Expression>,
    },
    MethodCall {
        object: Box<Expression>,
        method: String,
        args: Vec<Expression>,
    },
    GetAttr {
        object: Box<Expression>,
        name: String,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

impl PrefixOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            PrefixOp::Neg => "-",
            PrefixOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `=~`
    Match,
    /// `!~`
    NotMatch,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Match => "=~",
            BinaryOp::NotMatch => "!~",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// `if condition { ... } else { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Expression,
    pub consequence: Block,
    /// An `else if` chain is a block holding a single nested `if`
    pub alternative: Option<Block>,
}

/// Every `for` form.
///
/// A loop with `each` set iterates a collection. Otherwise a loop with
/// neither condition nor post statement is the simple form, and anything
/// else is the conditional form, where a missing condition is treated as
/// always true.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub init: Option<Statement>,
    pub condition: Option<Expression>,
    pub post: Option<Statement>,
    pub each: Option<ForEach>,
    pub body: Block,
}

impl ForLoop {
    pub fn is_simple(&self) -> bool {
        self.each.is_none() && self.condition.is_none() && self.post.is_none()
    }
}

/// Header of `for name, index in iterable { ... }`.
///
/// Lists and strings bind each element and its position; maps bind each
/// key and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct ForEach {
    pub name: String,
    pub index: Option<String>,
    pub iterable: Expression,
}

/// `switch subject { case a, b: ... default: ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchExpr {
    pub subject: Expression,
    pub cases: Vec<Case>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Comparison expressions; empty for `default`
    pub exprs: Vec<Expression>,
    pub body: Block,
    pub is_default: bool,
    pub pos: Position,
}

/// A function literal or declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    /// Set for `func name(...)` forms; used for declaration and display
    pub name: Option<String>,
    /// Parameter names in declaration order
    pub parameters: Vec<String>,
    /// Default expressions keyed by parameter name, in declaration order
    pub defaults: IndexMap<String, Expression>,
    pub body: Block,
    pub pos: Position,
}

impl FunctionLiteral {
    pub fn has_defaults(&self) -> bool {
        !self.defaults.is_empty()
    }
}
