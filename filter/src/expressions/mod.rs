//! Definitions and functions to create and manipulate pruning predicates.
//!
//! Predicates built here are *unbound*: they reference columns by name and
//! carry typed literals, but know nothing about any schema. Binding against a
//! logical schema and a physical file schema happens inside
//! [`DictionaryRowGroupFilter::should_read`].
//!
//! [`DictionaryRowGroupFilter::should_read`]: crate::DictionaryRowGroupFilter::should_read

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::error::require;
use crate::{Error, FilterResult};

pub use self::scalars::{DecimalData, Scalar};

pub(crate) mod bound;
mod scalars;

/// A comparison between a column and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryPredicateOp {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
}

impl BinaryPredicateOp {
    /// Returns the operator accepting exactly the rows this one rejects.
    pub(crate) fn invert(&self) -> Self {
        use BinaryPredicateOp::*;
        match self {
            LessThan => GreaterThanOrEqual,
            LessThanOrEqual => GreaterThan,
            GreaterThan => LessThanOrEqual,
            GreaterThanOrEqual => LessThan,
            Equal => NotEqual,
            NotEqual => Equal,
        }
    }
}

/// A null check on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryPredicateOp {
    IsNull,
    IsNotNull,
}

impl UnaryPredicateOp {
    pub(crate) fn invert(&self) -> Self {
        match self {
            Self::IsNull => Self::IsNotNull,
            Self::IsNotNull => Self::IsNull,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionOp {
    /// Conjunction
    And,
    /// Disjunction
    Or,
}

impl JunctionOp {
    pub(crate) fn invert(&self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryPredicate {
    /// The operator.
    pub op: BinaryPredicateOp,
    /// The referenced column, by name.
    pub column: String,
    /// The literal the column is compared against. Never null.
    pub value: Scalar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryPredicate {
    /// The operator.
    pub op: UnaryPredicateOp,
    /// The referenced column, by name.
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JunctionPredicate {
    /// The operator.
    pub op: JunctionOp,
    /// The child predicates.
    pub preds: Vec<Predicate>,
}

/// An unbound predicate over columns of a logical schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A comparison between a column and a literal.
    Binary(BinaryPredicate),
    /// A null check on a column.
    Unary(UnaryPredicate),
    /// A junction (AND/OR) of child predicates.
    Junction(JunctionPredicate),
    /// Logical negation of a predicate. Eliminated during binding.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Creates a comparison predicate `column OP value`.
    ///
    /// Fails with [`Error::InvalidLiteral`] for null literals: `NULL` compares
    /// equal to nothing, so a comparison against it could never prune and
    /// almost certainly indicates caller error. Use [`Predicate::is_null`] or
    /// [`Predicate::is_not_null`] instead.
    pub fn binary(
        op: BinaryPredicateOp,
        column: impl Into<String>,
        value: impl Into<Scalar>,
    ) -> FilterResult<Self> {
        let column = column.into();
        let value = value.into();
        require!(
            !value.is_null(),
            Error::invalid_literal(format!(
                "cannot compare column '{column}' to a null literal"
            ))
        );
        Ok(Self::Binary(BinaryPredicate { op, column, value }))
    }

    /// Creates a new predicate `column < value`.
    pub fn lt(column: impl Into<String>, value: impl Into<Scalar>) -> FilterResult<Self> {
        Self::binary(BinaryPredicateOp::LessThan, column, value)
    }

    /// Creates a new predicate `column <= value`.
    pub fn le(column: impl Into<String>, value: impl Into<Scalar>) -> FilterResult<Self> {
        Self::binary(BinaryPredicateOp::LessThanOrEqual, column, value)
    }

    /// Creates a new predicate `column > value`.
    pub fn gt(column: impl Into<String>, value: impl Into<Scalar>) -> FilterResult<Self> {
        Self::binary(BinaryPredicateOp::GreaterThan, column, value)
    }

    /// Creates a new predicate `column >= value`.
    pub fn ge(column: impl Into<String>, value: impl Into<Scalar>) -> FilterResult<Self> {
        Self::binary(BinaryPredicateOp::GreaterThanOrEqual, column, value)
    }

    /// Creates a new predicate `column = value`.
    pub fn eq(column: impl Into<String>, value: impl Into<Scalar>) -> FilterResult<Self> {
        Self::binary(BinaryPredicateOp::Equal, column, value)
    }

    /// Creates a new predicate `column != value`.
    pub fn ne(column: impl Into<String>, value: impl Into<Scalar>) -> FilterResult<Self> {
        Self::binary(BinaryPredicateOp::NotEqual, column, value)
    }

    /// Creates a new predicate `column IS NULL`.
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::Unary(UnaryPredicate {
            op: UnaryPredicateOp::IsNull,
            column: column.into(),
        })
    }

    /// Creates a new predicate `column IS NOT NULL`.
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::Unary(UnaryPredicate {
            op: UnaryPredicateOp::IsNotNull,
            column: column.into(),
        })
    }

    /// Creates a new predicate `NOT pred`.
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    /// Creates a new predicate `a AND b`.
    pub fn and(a: Self, b: Self) -> Self {
        Self::and_from([a, b])
    }

    /// Creates a new predicate `a OR b`.
    pub fn or(a: Self, b: Self) -> Self {
        Self::or_from([a, b])
    }

    /// Creates a new predicate `AND(preds...)`.
    pub fn and_from(preds: impl IntoIterator<Item = Self>) -> Self {
        Self::junction(JunctionOp::And, preds)
    }

    /// Creates a new predicate `OR(preds...)`.
    pub fn or_from(preds: impl IntoIterator<Item = Self>) -> Self {
        Self::junction(JunctionOp::Or, preds)
    }

    /// Creates a new junction predicate `OP(preds...)`.
    pub fn junction(op: JunctionOp, preds: impl IntoIterator<Item = Self>) -> Self {
        let preds = preds.into_iter().collect();
        Self::Junction(JunctionPredicate { op, preds })
    }
}

impl Display for BinaryPredicateOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use BinaryPredicateOp::*;
        match self {
            LessThan => write!(f, "<"),
            LessThanOrEqual => write!(f, "<="),
            GreaterThan => write!(f, ">"),
            GreaterThanOrEqual => write!(f, ">="),
            Equal => write!(f, "="),
            NotEqual => write!(f, "!="),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary(BinaryPredicate { op, column, value }) => {
                write!(f, "{column} {op} {value}")
            }
            Self::Unary(UnaryPredicate { op, column }) => match op {
                UnaryPredicateOp::IsNull => write!(f, "{column} IS NULL"),
                UnaryPredicateOp::IsNotNull => write!(f, "{column} IS NOT NULL"),
            },
            Self::Junction(JunctionPredicate { op, preds }) => {
                let preds = preds.iter().map(|pred| format!("{pred}")).join(", ");
                let op = match op {
                    JunctionOp::And => "AND",
                    JunctionOp::Or => "OR",
                };
                write!(f, "{op}({preds})")
            }
            Self::Not(pred) => write!(f, "NOT {pred}"),
        }
    }
}
