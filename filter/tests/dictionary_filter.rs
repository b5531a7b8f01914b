//! Black-box tests driving [`DictionaryRowGroupFilter`] through its public
//! API, including a soundness check that replays the fixture's rows through a
//! naive SQL evaluator: whenever the filter skips a group, scanning it must
//! yield no matching rows.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parquet::basic::{Compression, Encoding, PageType};
use parquet::data_type::ByteArray;
use parquet::file::metadata::{ColumnChunkMetaData, RowGroupMetaData};
use parquet::file::page_encoding_stats::PageEncodingStats;
use parquet::file::statistics::{Statistics, ValueStatistics};
use parquet::schema::parser::parse_message_type;
use parquet::schema::types::{SchemaDescPtr, SchemaDescriptor};

use parquet_dict_filter::expressions::{
    BinaryPredicate, BinaryPredicateOp, JunctionOp, JunctionPredicate, UnaryPredicate,
    UnaryPredicateOp,
};
use parquet_dict_filter::{
    DataType, DictionaryPage, DictionaryRowGroupFilter, DictionaryStore, Field, FilterResult,
    Predicate, Scalar, Schema,
};

const NUM_ROWS: i64 = 100;

fn table_schema() -> Schema {
    Schema::new([
        Field::required(1, "id", DataType::Integer),
        Field::optional(2, "category", DataType::String),
        Field::optional(3, "label", DataType::String),
        Field::optional(4, "payload", DataType::String),
        Field::optional(5, "archived", DataType::Long),
        Field::optional(6, "score", DataType::Float),
    ])
}

fn parquet_schema() -> SchemaDescPtr {
    let message = parse_message_type(
        "message table {
            required int32 id;
            optional binary category (UTF8);
            optional binary label (UTF8);
            optional binary payload (UTF8);
            optional int64 archived;
        }",
    )
    .unwrap();
    Arc::new(SchemaDescriptor::new(Arc::new(message)))
}

fn dictionary_pages() -> Vec<PageEncodingStats> {
    vec![
        PageEncodingStats {
            page_type: PageType::DICTIONARY_PAGE,
            encoding: Encoding::PLAIN,
            count: 1,
        },
        PageEncodingStats {
            page_type: PageType::DATA_PAGE,
            encoding: Encoding::RLE_DICTIONARY,
            count: 2,
        },
    ]
}

fn plain_pages() -> Vec<PageEncodingStats> {
    vec![PageEncodingStats {
        page_type: PageType::DATA_PAGE,
        encoding: Encoding::PLAIN,
        count: 2,
    }]
}

fn column(
    schema: &SchemaDescPtr,
    index: usize,
    pages: Vec<PageEncodingStats>,
    statistics: Statistics,
) -> ColumnChunkMetaData {
    let encodings = pages.iter().map(|page| page.encoding).collect();
    ColumnChunkMetaData::builder(schema.column(index))
        .set_encodings(encodings)
        .set_compression(Compression::UNCOMPRESSED)
        .set_num_values(NUM_ROWS)
        .set_page_encoding_stats(pages)
        .set_statistics(statistics)
        .build()
        .unwrap()
}

fn int32_statistics(null_count: u64) -> Statistics {
    Statistics::Int32(ValueStatistics::new(None, None, None, Some(null_count), false))
}

fn int64_statistics(null_count: u64) -> Statistics {
    Statistics::Int64(ValueStatistics::new(None, None, None, Some(null_count), false))
}

fn byte_array_statistics(null_count: u64) -> Statistics {
    Statistics::ByteArray(ValueStatistics::<ByteArray>::new(
        None,
        None,
        None,
        Some(null_count),
        false,
    ))
}

fn string_page(values: &[&str]) -> DictionaryPage {
    DictionaryPage::ByteArray(values.iter().map(|value| value.as_bytes().to_vec()).collect())
}

struct TestStore {
    dictionaries: HashMap<String, DictionaryPage>,
}

impl DictionaryStore for TestStore {
    fn read_dictionary(
        &self,
        column: &ColumnChunkMetaData,
    ) -> FilterResult<Option<DictionaryPage>> {
        Ok(self.dictionaries.get(&column.column_path().string()).cloned())
    }
}

/// One row group whose `id` dictionary covers `ids`, with the usual string
/// columns alongside: `category` is "some" or null, `label` is always "",
/// `payload` is not dictionary-encoded, and `archived` holds only nulls.
fn row_group(schema: &SchemaDescPtr, ids: std::ops::RangeInclusive<i32>) -> (RowGroupMetaData, TestStore) {
    let columns = vec![
        column(schema, 0, dictionary_pages(), int32_statistics(0)),
        column(schema, 1, dictionary_pages(), byte_array_statistics(10)),
        column(schema, 2, dictionary_pages(), byte_array_statistics(0)),
        column(schema, 3, plain_pages(), byte_array_statistics(0)),
        column(schema, 4, dictionary_pages(), int64_statistics(NUM_ROWS as u64)),
    ];
    let metadata = RowGroupMetaData::builder(schema.clone())
        .set_num_rows(NUM_ROWS)
        .set_total_byte_size(0)
        .set_column_metadata(columns)
        .build()
        .unwrap();

    let store = TestStore {
        dictionaries: HashMap::from([
            ("id".to_string(), DictionaryPage::Int32(ids.collect())),
            ("category".to_string(), string_page(&["some"])),
            ("label".to_string(), string_page(&[""])),
        ]),
    };
    (metadata, store)
}

type Row = HashMap<&'static str, Option<Scalar>>;

/// The rows that `row_group(schema, 30..=79)` stands for.
fn rows() -> Vec<Row> {
    (0..NUM_ROWS)
        .map(|index| {
            let category = if index % 10 == 0 {
                None
            } else {
                Some(Scalar::from("some"))
            };
            HashMap::from([
                ("id", Some(Scalar::from(30 + (index as i32 % 50)))),
                ("category", category),
                ("label", Some(Scalar::from(""))),
                ("payload", Some(Scalar::from(format!("payload-{index}")))),
                ("archived", None),
                ("score", None),
            ])
        })
        .collect()
}

fn satisfies(op: BinaryPredicateOp, ordering: Option<Ordering>) -> bool {
    use BinaryPredicateOp::*;
    match op {
        LessThan => ordering == Some(Ordering::Less),
        LessThanOrEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        GreaterThan => ordering == Some(Ordering::Greater),
        GreaterThanOrEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        Equal => ordering == Some(Ordering::Equal),
        NotEqual => ordering != Some(Ordering::Equal),
    }
}

/// SQL three-valued evaluation of an unbound predicate against one row.
/// `None` is the SQL `NULL` truth value; only `Some(true)` keeps a row.
fn eval_row(predicate: &Predicate, row: &Row) -> Option<bool> {
    match predicate {
        Predicate::Not(inner) => eval_row(inner, row).map(|value| !value),
        Predicate::Junction(JunctionPredicate { op, preds }) => {
            let dominator = matches!(op, JunctionOp::Or);
            let mut unknown = false;
            for pred in preds {
                match eval_row(pred, row) {
                    Some(value) if value == dominator => return Some(dominator),
                    None => unknown = true,
                    Some(_) => (),
                }
            }
            (!unknown).then_some(!dominator)
        }
        Predicate::Unary(UnaryPredicate { op, column }) => {
            let is_null = row[column.as_str()].is_none();
            Some(match op {
                UnaryPredicateOp::IsNull => is_null,
                UnaryPredicateOp::IsNotNull => !is_null,
            })
        }
        Predicate::Binary(BinaryPredicate { op, column, value }) => {
            let entry = row[column.as_str()].as_ref()?;
            Some(satisfies(*op, entry.partial_cmp(value)))
        }
    }
}

/// A broad catalogue of predicates over the fixture's columns.
fn predicate_catalogue() -> Vec<Predicate> {
    use BinaryPredicateOp::*;
    let ops = [
        LessThan,
        LessThanOrEqual,
        GreaterThan,
        GreaterThanOrEqual,
        Equal,
        NotEqual,
    ];

    let mut predicates = Vec::new();
    for op in ops {
        for literal in [0, 29, 30, 55, 79, 80, 100] {
            predicates.push(Predicate::binary(op, "id", literal).unwrap());
        }
        for literal in ["", "a", "some", "zzz"] {
            for column in ["category", "label", "payload"] {
                predicates.push(Predicate::binary(op, column, literal).unwrap());
            }
        }
        predicates.push(Predicate::binary(op, "archived", 5i64).unwrap());
        predicates.push(Predicate::binary(op, "score", 1.5f32).unwrap());
    }
    for column in ["id", "category", "label", "payload", "archived", "score"] {
        predicates.push(Predicate::is_null(column));
        predicates.push(Predicate::is_not_null(column));
    }

    // a layer of composites over a sample of the leaves
    let sample: Vec<_> = predicates.iter().step_by(7).cloned().collect();
    for (index, p) in sample.iter().enumerate() {
        let q = &sample[(index + 1) % sample.len()];
        predicates.push(Predicate::and(p.clone(), q.clone()));
        predicates.push(Predicate::or(p.clone(), q.clone()));
        predicates.push(Predicate::not(p.clone()));
    }
    predicates
}

// Whenever the filter says skip, a scan of the group must return no rows.
#[test]
fn skipped_groups_are_provably_empty() {
    let schema = parquet_schema();
    let (metadata, store) = row_group(&schema, 30..=79);
    let rows = rows();

    let mut skipped = 0;
    for predicate in predicate_catalogue() {
        let filter = DictionaryRowGroupFilter::new(table_schema(), predicate.clone());
        if filter.should_read(&schema, &metadata, &store).unwrap() {
            continue;
        }
        skipped += 1;
        let matching = rows
            .iter()
            .filter(|row| eval_row(&predicate, row) == Some(true))
            .count();
        assert_eq!(matching, 0, "filter skipped a non-empty group: {predicate}");
    }
    // the catalogue must actually exercise the skipping paths
    assert!(skipped > 10, "only {skipped} predicates were skippable");
}

// One filter instance serves many row groups and many files.
#[test]
fn filter_is_reusable_across_row_groups() {
    let schema = parquet_schema();
    let (first, first_store) = row_group(&schema, 30..=79);
    let (second, second_store) = row_group(&schema, 0..=9);

    let filter =
        DictionaryRowGroupFilter::new(table_schema(), Predicate::lt("id", 5).unwrap());
    assert!(!filter.should_read(&schema, &first, &first_store).unwrap());
    assert!(filter.should_read(&schema, &second, &second_store).unwrap());

    let filter =
        DictionaryRowGroupFilter::new(table_schema(), Predicate::ge("id", 40).unwrap());
    assert!(filter.should_read(&schema, &first, &first_store).unwrap());
    assert!(!filter.should_read(&schema, &second, &second_store).unwrap());
}

// A physical schema that spells column names differently simply binds the
// renamed columns as absent: the filter keeps reading instead of failing.
#[test]
fn unmatched_physical_names_degrade_to_reads() {
    let message = parse_message_type("message table { required int32 renamed_id; }").unwrap();
    let renamed = Arc::new(SchemaDescriptor::new(Arc::new(message)));
    let metadata = RowGroupMetaData::builder(renamed.clone())
        .set_num_rows(NUM_ROWS)
        .set_total_byte_size(0)
        .set_column_metadata(vec![column(
            &renamed,
            0,
            dictionary_pages(),
            int32_statistics(0),
        )])
        .build()
        .unwrap();
    let store = TestStore {
        dictionaries: HashMap::new(),
    };

    let filter = DictionaryRowGroupFilter::new(table_schema(), Predicate::lt("id", 5).unwrap());
    assert!(filter.should_read(&renamed, &metadata, &store).unwrap());
}
