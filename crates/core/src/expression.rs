//! Predicate expressions
//!
//! A deliberately small expression tree: comparisons of a named field against a
//! value, combined with boolean operators. Request processors only accept
//! equality comparisons joined with AND (see [`crate::parameters`]), but the
//! tree can represent the other shapes so they can be rejected with a precise
//! error instead of being silently misread.
//!
//! ```rust,ignore
//! use twquery_core::expression::field;
//! use twquery_core::twitter::status::StatusType;
//!
//! let expr = field("type")
//!     .eq(StatusType::Show)
//!     .and(field("id").eq("123"));
//! ```

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use std::fmt;

use crate::error::Result;

/// A closed set of resource kinds selectable through the `type` field
pub trait Variant: Copy + Sized {
    /// Canonical name carried in parameter maps
    fn name(self) -> &'static str;

    /// Inverse of [`Variant::name`]
    fn from_name(name: &str) -> Option<Self>;
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Unsigned(u64),
    Integer(i64),
    Bool(bool),
    Date(DateTime<Utc>),
    Variant(&'static str),
}

impl Value {
    /// Canonical string form stored in a parameter map
    ///
    /// Dates are normalised to UTC and rendered as RFC 3339 with second
    /// precision so that processors can re-parse them without ambiguity.
    pub fn canonical(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Unsigned(n) => n.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Date(d) => d.to_rfc3339_opts(SecondsFormat::Secs, true),
            Value::Variant(name) => (*name).to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Unsigned(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Unsigned(u64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::Date(value.with_timezone(&Utc))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s:?}"),
            other => write!(f, "{}", other.canonical()),
        }
    }
}

/// Predicate expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare { field: String, op: Op, value: Value },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// Dispatch to the matching visitor method
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<()> {
        match self {
            Expr::Compare { field, op, value } => visitor.visit_compare(field, *op, value),
            Expr::And(left, right) => visitor.visit_and(left, right),
            Expr::Or(left, right) => visitor.visit_or(left, right),
            Expr::Not(inner) => visitor.visit_not(inner),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare { field, op, value } => write!(f, "{field} {} {value}", op.symbol()),
            Expr::And(left, right) => write!(f, "({left} && {right})"),
            Expr::Or(left, right) => write!(f, "({left} || {right})"),
            Expr::Not(inner) => write!(f, "!({inner})"),
        }
    }
}

/// Walks an [`Expr`]
///
/// `visit_and` recurses into both sides by default; every other shape must be
/// handled by the implementor.
pub trait Visitor: Sized {
    fn visit_compare(&mut self, field: &str, op: Op, value: &Value) -> Result<()>;

    fn visit_and(&mut self, left: &Expr, right: &Expr) -> Result<()> {
        left.accept(self)?;
        right.accept(self)
    }

    fn visit_or(&mut self, left: &Expr, right: &Expr) -> Result<()>;

    fn visit_not(&mut self, inner: &Expr) -> Result<()>;
}

/// Left-hand side of a comparison, created with [`field`]
#[derive(Debug, Clone)]
pub struct Field(String);

/// Start a comparison on the named field
pub fn field(name: &str) -> Field {
    Field(name.to_string())
}

impl Field {
    fn compare(self, op: Op, value: impl Into<Value>) -> Expr {
        Expr::Compare {
            field: self.0,
            op,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.compare(Op::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Expr {
        self.compare(Op::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.compare(Op::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Expr {
        self.compare(Op::Le, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.compare(Op::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Expr {
        self.compare(Op::Ge, value)
    }
}

/// Join a sequence of expressions with AND
///
/// Returns `None` for an empty sequence.
pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    exprs.into_iter().reduce(Expr::and)
}
