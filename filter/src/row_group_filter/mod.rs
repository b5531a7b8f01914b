//! The dictionary-based row group filter.
//!
//! For each row group of a parquet file, [`DictionaryRowGroupFilter`] answers
//! one question: could any row in this group possibly satisfy the predicate?
//! `false` is authoritative (the group is provably empty under the predicate
//! and can be skipped); `true` is conservative (the group must be scanned).
//!
//! Evaluation is three-valued. A leaf over a column with a complete dictionary
//! produces a definite answer by scanning the candidate values; a leaf over a
//! column with fallback encoding, no dictionary, or no presence in the file
//! produces *unknown*. Junctions combine children with Kleene logic, and an
//! unknown root keeps the group: the filter never skips on the basis of
//! incomplete information.

use std::cmp::Ordering;

use parquet::file::metadata::RowGroupMetaData;
use parquet::schema::types::SchemaDescriptor;
use tracing::debug;

use crate::dictionary::{ColumnStatus, DictionaryStore, RowGroupDictionaries};
use crate::expressions::bound::{bind, BoundPredicate, BoundReference};
use crate::expressions::{BinaryPredicateOp, JunctionOp, Predicate, Scalar, UnaryPredicateOp};
use crate::schema::SchemaRef;
use crate::FilterResult;


/// Some row in the group may satisfy the predicate: the group must be scanned.
const ROWS_MIGHT_MATCH: Option<bool> = Some(true);
/// No row in the group can satisfy the predicate: the group is skippable.
const ROWS_CANNOT_MATCH: Option<bool> = Some(false);
/// The dictionary gives no information for this predicate.
const UNKNOWN: Option<bool> = None;

/// Governs `!=` over an optional column whose dictionary holds exactly the
/// compared value. The dictionary cannot tell whether such a group also holds
/// nulls, and engines disagree on whether a null row satisfies `c != v`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotEqSemantics {
    /// Keep the group whenever nulls may be present, for engines that let
    /// null rows satisfy `c != v`.
    #[default]
    NullsMightMatch,
    /// SQL three-valued semantics: `null != v` is itself null, never true, so
    /// such a group is provably empty and skippable.
    SqlThreeValued,
}

/// Prunes row groups using dictionary pages as a per-group value index.
///
/// Constructed once per scan from the logical schema and the (unbound)
/// predicate; [`Self::should_read`] may then be invoked for every row group of
/// every file in the scan. The predicate is re-bound against each supplied
/// physical schema and no state is retained between calls, so a single filter
/// is safe to share across threads as long as each call passes its own
/// row-group inputs.
pub struct DictionaryRowGroupFilter {
    schema: SchemaRef,
    predicate: Predicate,
    not_eq_semantics: NotEqSemantics,
}

impl DictionaryRowGroupFilter {
    pub fn new(schema: impl Into<SchemaRef>, predicate: Predicate) -> Self {
        Self {
            schema: schema.into(),
            predicate,
            not_eq_semantics: NotEqSemantics::default(),
        }
    }

    /// Selects the behavior of `!=` when a dictionary collapses to exactly the
    /// compared value. See [`NotEqSemantics`].
    pub fn with_not_eq_semantics(mut self, semantics: NotEqSemantics) -> Self {
        self.not_eq_semantics = semantics;
        self
    }

    /// Decides whether `row_group` must be scanned.
    ///
    /// Binds the predicate against `parquet_schema`, then walks the bound
    /// tree; each leaf lazily materializes the dictionary of the column it
    /// references through `store`. Binding failures ([`Error::MissingField`],
    /// [`Error::TypeMismatch`]) and store I/O errors propagate to the caller;
    /// missing *information* never fails and instead keeps the group.
    ///
    /// [`Error::MissingField`]: crate::Error::MissingField
    /// [`Error::TypeMismatch`]: crate::Error::TypeMismatch
    pub fn should_read(
        &self,
        parquet_schema: &SchemaDescriptor,
        row_group: &RowGroupMetaData,
        store: &dyn DictionaryStore,
    ) -> FilterResult<bool> {
        let bound = bind(&self.predicate, &self.schema, parquet_schema)?;
        let mut evaluator = RowGroupEvaluator {
            dictionaries: RowGroupDictionaries::new(row_group, store),
            not_eq_semantics: self.not_eq_semantics,
        };
        let result = evaluator.eval(&bound)?;
        debug!("predicate [{}] evaluated to {result:?}", self.predicate);
        Ok(result != ROWS_CANNOT_MATCH)
    }
}

struct RowGroupEvaluator<'a> {
    dictionaries: RowGroupDictionaries<'a>,
    not_eq_semantics: NotEqSemantics,
}

impl RowGroupEvaluator<'_> {
    fn eval(&mut self, predicate: &BoundPredicate) -> FilterResult<Option<bool>> {
        match predicate {
            BoundPredicate::Junction { op, preds } => self.eval_junction(*op, preds),
            BoundPredicate::Unary { op, reference } => self.eval_null_check(*op, reference),
            BoundPredicate::Binary {
                op,
                reference,
                value,
            } => self.eval_comparison(*op, reference, value),
        }
    }

    /// Kleene AND (OR): any FALSE (TRUE) child dominates and short-circuits.
    /// Without a dominant child, any unknown child forces an unknown result.
    fn eval_junction(
        &mut self,
        op: JunctionOp,
        preds: &[BoundPredicate],
    ) -> FilterResult<Option<bool>> {
        let dominator = matches!(op, JunctionOp::Or);
        let mut found_unknown = false;
        for pred in preds {
            match self.eval(pred)? {
                Some(value) if value == dominator => return Ok(Some(dominator)),
                None => found_unknown = true,
                Some(_) => (),
            }
        }
        Ok((!found_unknown).then_some(!dominator))
    }

    /// The dictionary never records nulls, so null checks can only use the
    /// field's required flag: a required column cannot satisfy `IS NULL` and
    /// always satisfies `IS NOT NULL`; for optional columns the answer is
    /// unknown either way.
    fn eval_null_check(
        &mut self,
        op: UnaryPredicateOp,
        reference: &BoundReference,
    ) -> FilterResult<Option<bool>> {
        match self.dictionaries.status(reference)? {
            ColumnStatus::NotDictionary | ColumnStatus::Absent => Ok(UNKNOWN),
            ColumnStatus::Dictionary(_) if !reference.field.required => Ok(UNKNOWN),
            ColumnStatus::Dictionary(_) => match op {
                UnaryPredicateOp::IsNull => Ok(ROWS_CANNOT_MATCH),
                UnaryPredicateOp::IsNotNull => Ok(ROWS_MIGHT_MATCH),
            },
        }
    }

    fn eval_comparison(
        &mut self,
        op: BinaryPredicateOp,
        reference: &BoundReference,
        value: &Scalar,
    ) -> FilterResult<Option<bool>> {
        let nulls_possible = self.dictionaries.may_contain_nulls(reference);
        let ColumnStatus::Dictionary(values) = self.dictionaries.status(reference)? else {
            return Ok(UNKNOWN);
        };
        match op {
            BinaryPredicateOp::NotEqual => {
                if values.iter().any(|entry| entry != value) {
                    return Ok(ROWS_MIGHT_MATCH);
                }
                // Every non-null value in the group equals the literal. A row
                // can still pass only if nulls may occur and the configured
                // semantics let a null row satisfy `c != v`.
                match self.not_eq_semantics {
                    NotEqSemantics::NullsMightMatch if nulls_possible => Ok(ROWS_MIGHT_MATCH),
                    _ => Ok(ROWS_CANNOT_MATCH),
                }
            }
            op => {
                // Entries that compare as unordered against the literal (NaN)
                // satisfy no comparison.
                let matched = values.iter().any(|entry| {
                    entry
                        .partial_cmp(value)
                        .is_some_and(|ordering| ordering_satisfies(op, ordering))
                });
                Ok(Some(matched))
            }
        }
    }
}

fn ordering_satisfies(op: BinaryPredicateOp, ordering: Ordering) -> bool {
    use BinaryPredicateOp::*;
    match op {
        LessThan => ordering == Ordering::Less,
        LessThanOrEqual => ordering != Ordering::Greater,
        GreaterThan => ordering == Ordering::Greater,
        GreaterThanOrEqual => ordering != Ordering::Less,
        Equal => ordering == Ordering::Equal,
        NotEqual => ordering != Ordering::Equal,
    }
}
