// Copyright (c) confluxdb.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt;
use std::fmt::{Display, Formatter};

use conflux_core::interface::{ColumnDef, RoutineDef, TableId};
use conflux_core::{Fragment, Type};

/// Which side of the driving join a column reference belongs to. References
/// start out `Unknown` and are resolved by probing the source and target
/// namespaces in turn; a reference found in neither stays `Unknown` and is
/// left for a later validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrigin {
    Source,
    Target,
    Unknown,
}

/// Filled in when a column reference is resolved against a namespace. The
/// column descriptor is absent for synthesized columns, which never carry
/// privilege requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBinding {
    pub origin: ColumnOrigin,
    pub table: Option<TableId>,
    pub column: Option<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(ConstantExpression),

    Column(ColumnExpression),

    Add(AddExpression),

    Subtract(SubtractExpression),

    Multiply(MultiplyExpression),

    Divide(DivideExpression),

    Compare(CompareExpression),

    And(AndExpression),

    Or(OrExpression),

    Not(NotExpression),

    Call(CallExpression),

    Cast(CastExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantExpression {
    Null(Fragment),
    Bool(Fragment),
    // any number
    Number(Fragment),
    // any textual representation
    Text(Fragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpression {
    pub table: Option<Fragment>,
    pub name: Fragment,
    pub binding: Option<ColumnBinding>,
}

impl ColumnExpression {
    pub fn new(table: Option<Fragment>, name: Fragment) -> Self {
        Self { table, name, binding: None }
    }

    pub fn origin(&self) -> ColumnOrigin {
        self.binding.as_ref().map(|binding| binding.origin).unwrap_or(ColumnOrigin::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddExpression {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtractExpression {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiplyExpression {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivideExpression {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => f.write_str("="),
            CompareOp::NotEq => f.write_str("<>"),
            CompareOp::Lt => f.write_str("<"),
            CompareOp::LtEq => f.write_str("<="),
            CompareOp::Gt => f.write_str(">"),
            CompareOp::GtEq => f.write_str(">="),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareExpression {
    pub op: CompareOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AndExpression {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrExpression {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotExpression {
    pub expression: Box<Expression>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub name: Fragment,
    pub args: Vec<Expression>,
    pub binding: Option<RoutineDef>,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpression {
    pub expression: Box<Expression>,
    pub to: Type,
    pub fragment: Fragment,
}

impl Expression {
    /// Pre-order walk over the whole tree.
    pub fn for_each<'a>(&'a self, f: &mut impl FnMut(&'a Expression)) {
        f(self);
        match self {
            Expression::Constant(_) | Expression::Column(_) => {}
            Expression::Add(AddExpression { left, right, .. })
            | Expression::Subtract(SubtractExpression { left, right, .. })
            | Expression::Multiply(MultiplyExpression { left, right, .. })
            | Expression::Divide(DivideExpression { left, right, .. })
            | Expression::Compare(CompareExpression { left, right, .. })
            | Expression::And(AndExpression { left, right, .. })
            | Expression::Or(OrExpression { left, right, .. }) => {
                left.for_each(f);
                right.for_each(f);
            }
            Expression::Not(NotExpression { expression, .. })
            | Expression::Cast(CastExpression { expression, .. }) => expression.for_each(f),
            Expression::Call(CallExpression { args, .. }) => {
                for arg in args {
                    arg.for_each(f);
                }
            }
        }
    }

    /// All column references in the tree, in source order.
    pub fn columns(&self) -> Vec<&ColumnExpression> {
        let mut result = Vec::new();
        self.for_each(&mut |node| {
            if let Expression::Column(column) = node {
                result.push(column);
            }
        });
        result
    }

    /// All routine calls in the tree, in source order.
    pub fn routine_calls(&self) -> Vec<&CallExpression> {
        let mut result = Vec::new();
        self.for_each(&mut |node| {
            if let Expression::Call(call) = node {
                result.push(call);
            }
        });
        result
    }

    /// All user-defined types the tree references, through casts or through
    /// bound columns of user-defined type.
    pub fn user_defined_types(&self) -> Vec<&Type> {
        let mut result = Vec::new();
        self.for_each(&mut |node| match node {
            Expression::Cast(CastExpression { to, .. }) if to.is_user_defined() => result.push(to),
            Expression::Column(column) => {
                if let Some(def) = column.binding.as_ref().and_then(|binding| binding.column.as_ref())
                {
                    if def.ty.is_user_defined() {
                        result.push(&def.ty);
                    }
                }
            }
            _ => {}
        });
        result
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(constant) => write!(f, "{}", constant),
            Expression::Column(column) => write!(f, "{}", column),
            Expression::Add(AddExpression { left, right, .. }) => {
                write!(f, "({} + {})", left, right)
            }
            Expression::Subtract(SubtractExpression { left, right, .. }) => {
                write!(f, "({} - {})", left, right)
            }
            Expression::Multiply(MultiplyExpression { left, right, .. }) => {
                write!(f, "({} * {})", left, right)
            }
            Expression::Divide(DivideExpression { left, right, .. }) => {
                write!(f, "({} / {})", left, right)
            }
            Expression::Compare(CompareExpression { op, left, right, .. }) => {
                write!(f, "({} {} {})", left, op, right)
            }
            Expression::And(AndExpression { left, right, .. }) => {
                write!(f, "({} AND {})", left, right)
            }
            Expression::Or(OrExpression { left, right, .. }) => {
                write!(f, "({} OR {})", left, right)
            }
            Expression::Not(NotExpression { expression, .. }) => write!(f, "(NOT {})", expression),
            Expression::Call(call) => write!(f, "{}", call),
            Expression::Cast(CastExpression { expression, to, .. }) => {
                write!(f, "CAST({} AS {})", expression, to)
            }
        }
    }
}

impl Display for ConstantExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConstantExpression::Null(_) => write!(f, "NULL"),
            ConstantExpression::Bool(fragment) => write!(f, "{}", fragment),
            ConstantExpression::Number(fragment) => write!(f, "{}", fragment),
            ConstantExpression::Text(fragment) => write!(f, "'{}'", fragment),
        }
    }
}

impl Display for ColumnExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let args = self.args.iter().map(|arg| format!("{}", arg)).collect::<Vec<_>>().join(", ");
        write!(f, "{}({})", self.name, args)
    }
}
