//! Binding of unbound predicates against a logical schema and the physical
//! schema of one parquet file.
//!
//! Binding resolves each column reference to its logical field and, when
//! present, to the leaf column of the physical schema whose dotted path equals
//! the field name (the caller arranges physical names to line up with logical
//! ones). It also eliminates every `NOT`: a negation flag is pushed down the
//! tree, inverting junctions per De Morgan and replacing each leaf operator
//! with its complement, so the bound tree contains no negation nodes at all.

use itertools::Itertools;
use parquet::schema::types::SchemaDescriptor;
use tracing::debug;

use super::{
    BinaryPredicate, BinaryPredicateOp, JunctionOp, JunctionPredicate, Predicate, Scalar,
    UnaryPredicate, UnaryPredicateOp,
};
use crate::schema::{FieldRef, Schema};
use crate::{Error, FilterResult};

/// A column reference resolved against both schemas.
#[derive(Debug, Clone)]
pub(crate) struct BoundReference {
    pub(crate) field: FieldRef,
    /// Index of the leaf column in the physical schema, or `None` when the
    /// column does not exist in the file.
    pub(crate) column: Option<usize>,
}

/// A predicate whose references are resolved and whose negations are gone.
/// Lives for a single `should_read` call.
#[derive(Debug)]
pub(crate) enum BoundPredicate {
    Binary {
        op: BinaryPredicateOp,
        reference: BoundReference,
        value: Scalar,
    },
    Unary {
        op: UnaryPredicateOp,
        reference: BoundReference,
    },
    Junction {
        op: JunctionOp,
        preds: Vec<BoundPredicate>,
    },
}

pub(crate) fn bind(
    predicate: &Predicate,
    schema: &Schema,
    parquet_schema: &SchemaDescriptor,
) -> FilterResult<BoundPredicate> {
    let binder = Binder {
        schema,
        parquet_schema,
    };
    binder.bind(predicate, false)
}

struct Binder<'a> {
    schema: &'a Schema,
    parquet_schema: &'a SchemaDescriptor,
}

impl Binder<'_> {
    fn bind(&self, predicate: &Predicate, inverted: bool) -> FilterResult<BoundPredicate> {
        match predicate {
            Predicate::Not(pred) => self.bind(pred, !inverted),
            Predicate::Junction(JunctionPredicate { op, preds }) => {
                let preds: Vec<_> = preds
                    .iter()
                    .map(|pred| self.bind(pred, inverted))
                    .try_collect()?;
                let op = if inverted { op.invert() } else { *op };
                Ok(BoundPredicate::Junction { op, preds })
            }
            Predicate::Binary(BinaryPredicate { op, column, value }) => {
                let reference = self.resolve(column)?;
                let value = value.coerce_to(&reference.field.data_type).ok_or_else(|| {
                    Error::type_mismatch(format!(
                        "cannot compare column '{column}' of type {} to a {} literal",
                        reference.field.data_type,
                        value.data_type()
                    ))
                })?;
                let op = if inverted { op.invert() } else { *op };
                Ok(BoundPredicate::Binary {
                    op,
                    reference,
                    value,
                })
            }
            Predicate::Unary(UnaryPredicate { op, column }) => {
                let reference = self.resolve(column)?;
                let op = if inverted { op.invert() } else { *op };
                Ok(BoundPredicate::Unary { op, reference })
            }
        }
    }

    fn resolve(&self, name: &str) -> FilterResult<BoundReference> {
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| Error::missing_field(name))?
            .clone();
        let column = self
            .parquet_schema
            .columns()
            .iter()
            .position(|column| column.path().string() == field.name);
        if column.is_none() {
            debug!("column '{}' is not present in the file", field.name);
        }
        Ok(BoundReference { field, column })
    }
}
