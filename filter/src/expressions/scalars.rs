//! Typed literal values and the per-type partial orders that comparison
//! predicates evaluate with.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use uuid::Uuid;

use crate::error::require;
use crate::schema::DataType;
use crate::{Error, FilterResult};

/// A fixed-point decimal value: `unscaled * 10^(-scale)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalData {
    unscaled: i128,
    precision: u8,
    scale: u8,
}

impl DecimalData {
    /// Creates a decimal, validating that `unscaled` fits in `precision` digits.
    pub fn try_new(unscaled: i128, precision: u8, scale: u8) -> FilterResult<Self> {
        // Validates the precision/scale bounds as a side effect.
        DataType::decimal(precision, scale)?;
        require!(
            unscaled.unsigned_abs() < 10u128.pow(precision as u32),
            Error::invalid_decimal(format!(
                "unscaled value {unscaled} does not fit precision {precision}"
            ))
        );
        Ok(Self {
            unscaled,
            precision,
            scale,
        })
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }
}

/// A literal value of some [`DataType`].
///
/// `Null` carries the type it is a null of. Comparison predicates reject null
/// literals at construction time, so nulls never reach evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    Date(i32),
    Timestamp(i64),
    Decimal(DecimalData),
    Uuid(Uuid),
    Null(DataType),
}

impl Scalar {
    /// Convenience constructor for decimal literals.
    pub fn decimal(unscaled: i128, precision: u8, scale: u8) -> FilterResult<Self> {
        Ok(Self::Decimal(DecimalData::try_new(
            unscaled, precision, scale,
        )?))
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Boolean(_) => DataType::Boolean,
            Self::Integer(_) => DataType::Integer,
            Self::Long(_) => DataType::Long,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
            Self::Binary(_) => DataType::Binary,
            Self::Date(_) => DataType::Date,
            Self::Timestamp(_) => DataType::Timestamp,
            Self::Decimal(data) => DataType::Decimal {
                precision: data.precision(),
                scale: data.scale(),
            },
            Self::Uuid(_) => DataType::Uuid,
            Self::Null(data_type) => data_type.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }

    /// Converts this literal to `data_type` when the conversion cannot lose
    /// information: the identity conversion plus the `int -> long` and
    /// `float -> double` widenings. Returns `None` otherwise.
    pub(crate) fn coerce_to(&self, data_type: &DataType) -> Option<Scalar> {
        match (self, data_type) {
            _ if self.data_type() == *data_type => Some(self.clone()),
            (Self::Integer(value), DataType::Long) => Some(Self::Long((*value).into())),
            (Self::Float(value), DataType::Double) => Some(Self::Double((*value).into())),
            _ => None,
        }
    }
}

/// Values of the same type compare with their type's order; values of
/// different types (and nulls, and any `NaN`) are incomparable.
impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Scalar::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a.partial_cmp(b),
            (Integer(a), Integer(b)) => a.partial_cmp(b),
            (Long(a), Long(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (String(a), String(b)) => a.partial_cmp(b),
            (Binary(a), Binary(b)) => a.partial_cmp(b),
            (Date(a), Date(b)) => a.partial_cmp(b),
            (Timestamp(a), Timestamp(b)) => a.partial_cmp(b),
            (Decimal(a), Decimal(b)) if a.scale() == b.scale() => {
                a.unscaled().partial_cmp(&b.unscaled())
            }
            (Uuid(a), Uuid(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Long(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "'{value}'"),
            Self::Binary(value) => {
                write!(f, "X'")?;
                for byte in value {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, "'")
            }
            Self::Date(value) => write!(f, "date({value})"),
            Self::Timestamp(value) => write!(f, "timestamp({value})"),
            Self::Decimal(data) => {
                let scale = data.scale() as u32;
                if scale == 0 {
                    write!(f, "{}", data.unscaled())
                } else {
                    let factor = 10i128.pow(scale);
                    let whole = data.unscaled() / factor;
                    let fraction = (data.unscaled() % factor).unsigned_abs();
                    let sign = if data.unscaled() < 0 && whole == 0 { "-" } else { "" };
                    write!(f, "{sign}{whole}.{fraction:0width$}", width = scale as usize)
                }
            }
            Self::Uuid(value) => write!(f, "{value}"),
            Self::Null(_) => write!(f, "null"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<Uuid> for Scalar {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<DecimalData> for Scalar {
    fn from(value: DecimalData) -> Self {
        Self::Decimal(value)
    }
}
