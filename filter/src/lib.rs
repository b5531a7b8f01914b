//! Dictionary-based row group pruning for parquet table scans.
//!
//! A dictionary-encoded parquet column carries, per row group, a dictionary
//! page holding every distinct non-null value the column takes in that group.
//! That page is a complete value index: if a predicate cannot be satisfied by
//! any dictionary entry, no row in the group can satisfy it either, and the
//! whole group can be skipped without touching its data pages.
//!
//! [`DictionaryRowGroupFilter`] implements that decision. It is constructed
//! from a logical [`Schema`] and an unbound [`Predicate`]; for each row group
//! it binds the predicate against the file's physical schema, materializes the
//! dictionaries of referenced columns through a [`DictionaryStore`], and
//! evaluates with three-valued logic. A `false` answer is authoritative (skip
//! the group); `true` is conservative (scan it). Columns without a usable
//! dictionary (fallback encodings, absence from the file) always evaluate as
//! unknown and keep the group.
//!
//! ```rust,ignore
//! use parquet_dict_filter::{DataType, DictionaryRowGroupFilter, Field, Predicate, Schema};
//!
//! let schema = Schema::new([
//!     Field::required(1, "id", DataType::Long),
//!     Field::optional(2, "category", DataType::String),
//! ]);
//! let filter = DictionaryRowGroupFilter::new(
//!     schema,
//!     Predicate::and(
//!         Predicate::eq("category", "archived")?,
//!         Predicate::lt("id", 1000i64)?,
//!     ),
//! );
//! for row_group in metadata.row_groups() {
//!     if filter.should_read(parquet_schema, row_group, &store)? {
//!         // scan the group
//!     }
//! }
//! ```
//!
//! Min/max statistics pruning is a separate concern handled elsewhere; this
//! crate consults column statistics only for null counts, which refine the
//! handling of `!=` over optional columns.

pub mod dictionary;
mod error;
pub mod expressions;
mod row_group_filter;
pub mod schema;

pub use crate::dictionary::{DictionaryPage, DictionaryStore};
pub use crate::error::{Error, FilterResult};
pub use crate::expressions::{DecimalData, Predicate, Scalar};
pub use crate::row_group_filter::{DictionaryRowGroupFilter, NotEqSemantics};
pub use crate::schema::{DataType, Field, Schema, SchemaRef};
