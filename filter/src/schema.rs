//! The logical table schema that predicates are written against.
//!
//! A [`Schema`] is an ordered sequence of [`Field`]s. Field ids are the sole
//! stable identity of a column; names exist for display and for resolving
//! predicate references. The physical file schema is a separate concern,
//! supplied by the parquet reader at evaluation time.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::error::require;
use crate::{Error, FilterResult};

pub type SchemaRef = Arc<Schema>;
pub type FieldRef = Arc<Field>;

/// Maximum number of significant digits a decimal type can carry (fits in an
/// unscaled `i128`, and matches the widest fixed-len binary layout we decode).
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// The logical type of a field.
///
/// Each type has a total order used by comparison predicates, except that
/// floating point `NaN` compares equal to nothing and orders against nothing.
/// Strings order by the byte order of their UTF-8 encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE-754 floating point.
    Float,
    /// 64-bit IEEE-754 floating point.
    Double,
    String,
    Binary,
    /// Days since the Unix epoch.
    Date,
    /// Microseconds since the Unix epoch.
    Timestamp,
    /// Fixed-point decimal with the given precision and scale.
    Decimal { precision: u8, scale: u8 },
    Uuid,
}

impl DataType {
    /// Creates a decimal type, validating precision and scale bounds.
    pub fn decimal(precision: u8, scale: u8) -> FilterResult<Self> {
        require!(
            (1..=MAX_DECIMAL_PRECISION).contains(&precision),
            Error::invalid_decimal(format!(
                "precision {precision} must be in [1, {MAX_DECIMAL_PRECISION}]"
            ))
        );
        require!(
            scale <= precision,
            Error::invalid_decimal(format!(
                "scale {scale} must not exceed precision {precision}"
            ))
        );
        Ok(Self::Decimal { precision, scale })
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Binary => write!(f, "binary"),
            Self::Date => write!(f, "date"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            Self::Uuid => write!(f, "uuid"),
        }
    }
}

/// One column of the logical schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: i32,
    pub name: String,
    /// Required fields hold no nulls in any row group; optional fields may.
    pub required: bool,
    pub data_type: DataType,
}

impl Field {
    pub fn required(id: i32, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id,
            name: name.into(),
            required: true,
            data_type,
        }
    }

    pub fn optional(id: i32, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id,
            name: name.into(),
            required: false,
            data_type,
        }
    }
}

/// An ordered collection of [`Field`]s with lookup by name.
#[derive(Debug)]
pub struct Schema {
    fields: Vec<FieldRef>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        let fields: Vec<_> = fields.into_iter().map(Arc::new).collect();
        let index = fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name.clone(), position))
            .collect();
        Self { fields, index }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldRef> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldRef> {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let schema = Schema::new([
            Field::required(1, "id", DataType::Long),
            Field::optional(2, "value", DataType::String),
        ]);
        assert_eq!(schema.field("id").unwrap().id, 1);
        assert!(schema.field("id").unwrap().required);
        assert!(!schema.field("value").unwrap().required);
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_decimal_type_bounds() {
        assert!(DataType::decimal(10, 2).is_ok());
        assert!(DataType::decimal(38, 38).is_ok());
        assert!(matches!(
            DataType::decimal(0, 0),
            Err(Error::InvalidDecimal(_))
        ));
        assert!(matches!(
            DataType::decimal(39, 0),
            Err(Error::InvalidDecimal(_))
        ));
        assert!(matches!(
            DataType::decimal(5, 6),
            Err(Error::InvalidDecimal(_))
        ));
    }

    #[test]
    fn test_data_type_format() {
        let cases = [
            (DataType::Integer, "int"),
            (DataType::String, "string"),
            (DataType::decimal(10, 2).unwrap(), "decimal(10,2)"),
        ];
        for (data_type, expected) in cases {
            assert_eq!(data_type.to_string(), expected);
        }
    }
}
