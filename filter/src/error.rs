//! Defines [`Error`], the umbrella error type returned by this crate, and the
//! [`FilterResult`] alias used throughout.

/// All errors surfaced by the filter.
///
/// Caller contract violations ([`Error::MissingField`], [`Error::TypeMismatch`],
/// [`Error::InvalidLiteral`]) fail fast. Missing *information* (no dictionary,
/// absent column, truncated statistics) is never an error; it degrades to an
/// unknown result and the row group is kept.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The predicate references a field that does not exist in the logical schema.
    #[error("Cannot find field '{0}' in schema")]
    MissingField(String),

    /// A literal cannot be coerced to the type of the column it is compared
    /// against, or a dictionary's physical type does not match the column's
    /// logical type.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A comparison predicate was constructed with a null literal.
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// A decimal value or type was constructed with out-of-range precision,
    /// scale, or unscaled value.
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    /// A dictionary page held an entry that could not be decoded to the
    /// column's logical type.
    #[error("Failed to decode dictionary entry: {0}")]
    Decode(String),

    /// An error raised by the underlying parquet reader. Propagated unchanged.
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl Error {
    pub(crate) fn missing_field(name: impl ToString) -> Self {
        Self::MissingField(name.to_string())
    }

    pub(crate) fn type_mismatch(msg: impl ToString) -> Self {
        Self::TypeMismatch(msg.to_string())
    }

    pub(crate) fn invalid_literal(msg: impl ToString) -> Self {
        Self::InvalidLiteral(msg.to_string())
    }

    pub(crate) fn invalid_decimal(msg: impl ToString) -> Self {
        Self::InvalidDecimal(msg.to_string())
    }

    pub(crate) fn decode(msg: impl ToString) -> Self {
        Self::Decode(msg.to_string())
    }
}

/// A [`std::result::Result`] with this crate's [`Error`] as the default error type.
pub type FilterResult<T, E = Error> = std::result::Result<T, E>;

/// Convenient way to return an error if a condition isn't true.
macro_rules! require {
    ( $cond:expr, $err:expr ) => {
        if !($cond) {
            return Err($err);
        }
    };
}

pub(crate) use require;
