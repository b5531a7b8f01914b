//! Per-row-group dictionary materialization.
//!
//! A dictionary page lists every distinct non-null value a column holds within
//! one row group. [`RowGroupDictionaries`] turns that page into a set of typed
//! [`Scalar`]s, but only when the column's encoding metadata proves that
//! *every* data page references the dictionary. A single fallback-encoded page
//! means the dictionary is incomplete as a value index, and the column is
//! reported as [`ColumnStatus::NotDictionary`].
//!
//! Dictionaries never record nulls. Null presence is tracked separately from
//! the column chunk's null-count statistic, see
//! [`RowGroupDictionaries::may_contain_nulls`].

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use parquet::basic::{Encoding, PageType, Type as PhysicalType};
use parquet::file::metadata::{ColumnChunkMetaData, RowGroupMetaData};
use tracing::debug;
use uuid::Uuid;

use crate::expressions::bound::BoundReference;
use crate::expressions::Scalar;
use crate::schema::DataType;
use crate::{Error, FilterResult};

/// Read access to the dictionary pages of one row group, supplied by the
/// parquet reader.
///
/// Implementations return the fully decoded page for a column chunk, or
/// `Ok(None)` when the chunk has no dictionary page at all.
pub trait DictionaryStore {
    fn read_dictionary(
        &self,
        column: &ColumnChunkMetaData,
    ) -> FilterResult<Option<DictionaryPage>>;
}

/// A decoded dictionary page: the distinct non-null values of one column
/// chunk, in their physical representation.
#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryPage {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    ByteArray(Vec<Vec<u8>>),
    FixedLenByteArray(Vec<Vec<u8>>),
}

impl DictionaryPage {
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Self::Boolean(_) => PhysicalType::BOOLEAN,
            Self::Int32(_) => PhysicalType::INT32,
            Self::Int64(_) => PhysicalType::INT64,
            Self::Float(_) => PhysicalType::FLOAT,
            Self::Double(_) => PhysicalType::DOUBLE,
            Self::ByteArray(_) => PhysicalType::BYTE_ARRAY,
            Self::FixedLenByteArray(_) => PhysicalType::FIXED_LEN_BYTE_ARRAY,
        }
    }
}

/// What the dictionary index knows about one referenced column in one row group.
#[derive(Debug)]
pub(crate) enum ColumnStatus {
    /// The column is fully dictionary-encoded; the values are the complete set
    /// of distinct non-null values in the group, converted to the column's
    /// logical type.
    Dictionary(Vec<Scalar>),
    /// The column has fallback or mixed encodings; its dictionary (if any) is
    /// not a complete value index.
    NotDictionary,
    /// The column does not exist in the file.
    Absent,
}

/// Materializes and memoizes column dictionaries for a single evaluation pass
/// over one row group. Dropped when the pass returns.
pub(crate) struct RowGroupDictionaries<'a> {
    row_group: &'a RowGroupMetaData,
    store: &'a dyn DictionaryStore,
    cache: HashMap<usize, ColumnStatus>,
}

impl<'a> RowGroupDictionaries<'a> {
    pub(crate) fn new(row_group: &'a RowGroupMetaData, store: &'a dyn DictionaryStore) -> Self {
        Self {
            row_group,
            store,
            cache: HashMap::new(),
        }
    }

    /// Returns the column's status, reading and decoding its dictionary page
    /// on first use.
    pub(crate) fn status(&mut self, reference: &BoundReference) -> FilterResult<&ColumnStatus> {
        static ABSENT: ColumnStatus = ColumnStatus::Absent;
        let Some(index) = reference.column else {
            return Ok(&ABSENT);
        };
        if !self.cache.contains_key(&index) {
            let status = self.load(index, &reference.field.data_type)?;
            self.cache.insert(index, status);
        }
        Ok(&self.cache[&index])
    }

    fn load(&self, index: usize, data_type: &DataType) -> FilterResult<ColumnStatus> {
        let column = self.row_group.column(index);
        if !has_only_dictionary_pages(column) {
            debug!(
                "column '{}' has non-dictionary data pages",
                column.column_path()
            );
            return Ok(ColumnStatus::NotDictionary);
        }
        let values = match self.store.read_dictionary(column)? {
            Some(page) => decode_dictionary(page, data_type)?,
            // A fully dictionary-encoded column without a dictionary page
            // holds no non-null values at all.
            None => Vec::new(),
        };
        debug!(
            "materialized dictionary for column '{}': {} entries",
            column.column_path(),
            values.len()
        );
        Ok(ColumnStatus::Dictionary(values))
    }

    /// Whether the column could hold nulls in this row group. Required fields
    /// never do; optional fields are null-free only when the chunk statistics
    /// report a null count of zero.
    pub(crate) fn may_contain_nulls(&self, reference: &BoundReference) -> bool {
        if reference.field.required {
            return false;
        }
        let Some(index) = reference.column else {
            return true;
        };
        let null_count = self
            .row_group
            .column(index)
            .statistics()
            .and_then(|statistics| statistics.null_count_opt());
        null_count != Some(0)
    }
}

fn is_dictionary(encoding: Encoding) -> bool {
    matches!(encoding, Encoding::PLAIN_DICTIONARY | Encoding::RLE_DICTIONARY)
}

/// True iff every data page of the chunk references the dictionary.
pub(crate) fn has_only_dictionary_pages(column: &ColumnChunkMetaData) -> bool {
    if let Some(stats) = column.page_encoding_stats() {
        return stats.iter().all(|page| match page.page_type {
            PageType::DATA_PAGE | PageType::DATA_PAGE_V2 => is_dictionary(page.encoding),
            _ => true,
        });
    }
    // Older writers omit per-page encoding stats; fall back to the chunk's
    // encoding list. PLAIN_DICTIONARY must be present, and nothing may remain
    // once the level encodings (RLE, BIT_PACKED) are set aside. A chunk that
    // only advertises RLE_DICTIONARY cannot prove the writer never fell back,
    // so it is treated as mixed.
    let mut encodings: HashSet<Encoding> = column.encodings().iter().copied().collect();
    if !encodings.remove(&Encoding::PLAIN_DICTIONARY) {
        return false;
    }
    encodings.remove(&Encoding::RLE);
    encodings.remove(&Encoding::BIT_PACKED);
    encodings.is_empty()
}

/// Converts decoded physical values to the column's logical type, applying the
/// standard promotions (`int32 -> int64`, `float -> double`, widths of
/// decimals, and so on).
fn decode_dictionary(page: DictionaryPage, data_type: &DataType) -> FilterResult<Vec<Scalar>> {
    use DictionaryPage::*;
    let physical_type = page.physical_type();
    let values = match (page, data_type) {
        (Boolean(values), DataType::Boolean) => {
            values.into_iter().map(Scalar::Boolean).collect()
        }
        (Int32(values), DataType::Integer) => values.into_iter().map(Scalar::Integer).collect(),
        (Int32(values), DataType::Long) => values
            .into_iter()
            .map(|value| Scalar::Long(value.into()))
            .collect(),
        (Int32(values), DataType::Date) => values.into_iter().map(Scalar::Date).collect(),
        (Int32(values), &DataType::Decimal { precision, scale }) => values
            .into_iter()
            .map(|value| Scalar::decimal(value.into(), precision, scale))
            .try_collect()?,
        (Int64(values), DataType::Long) => values.into_iter().map(Scalar::Long).collect(),
        (Int64(values), DataType::Timestamp) => {
            values.into_iter().map(Scalar::Timestamp).collect()
        }
        (Int64(values), &DataType::Decimal { precision, scale }) => values
            .into_iter()
            .map(|value| Scalar::decimal(value.into(), precision, scale))
            .try_collect()?,
        (Float(values), DataType::Float) => values.into_iter().map(Scalar::Float).collect(),
        (Float(values), DataType::Double) => values
            .into_iter()
            .map(|value| Scalar::Double(value.into()))
            .collect(),
        (Double(values), DataType::Double) => values.into_iter().map(Scalar::Double).collect(),
        (ByteArray(values) | FixedLenByteArray(values), DataType::String) => values
            .into_iter()
            .map(|bytes| {
                String::from_utf8(bytes)
                    .map(Scalar::String)
                    .map_err(|_| Error::decode("string dictionary entry is not valid UTF-8"))
            })
            .try_collect()?,
        (ByteArray(values) | FixedLenByteArray(values), DataType::Binary) => {
            values.into_iter().map(Scalar::Binary).collect()
        }
        (FixedLenByteArray(values), DataType::Uuid) => values
            .into_iter()
            .map(|bytes| {
                let bytes: [u8; 16] = bytes
                    .try_into()
                    .map_err(|_| Error::decode("uuid dictionary entry is not 16 bytes"))?;
                Ok::<_, Error>(Scalar::Uuid(Uuid::from_bytes(bytes)))
            })
            .try_collect()?,
        (FixedLenByteArray(values), &DataType::Decimal { precision, scale }) => values
            .into_iter()
            .map(|bytes| {
                let unscaled = i128_from_be_bytes(&bytes).ok_or_else(|| {
                    Error::decode(format!(
                        "decimal dictionary entry is {} bytes, expected at most 16",
                        bytes.len()
                    ))
                })?;
                Scalar::decimal(unscaled, precision, scale)
            })
            .try_collect()?,
        (_, data_type) => {
            return Err(Error::type_mismatch(format!(
                "cannot decode a {physical_type:?} dictionary as {data_type}"
            )));
        }
    };
    Ok(values)
}

/// Reads a big-endian two's-complement integer of up to 16 bytes.
fn i128_from_be_bytes(bytes: &[u8]) -> Option<i128> {
    if bytes.is_empty() || bytes.len() > 16 {
        return None;
    }
    let fill = if bytes[0] & 0x80 != 0 { 0xff } else { 0 };
    let mut buffer = [fill; 16];
    buffer[16 - bytes.len()..].copy_from_slice(bytes);
    Some(i128::from_be_bytes(buffer))
}
