//! Paging over a source result bounded by `max_rows`.

use rowset::schema::MetaDataBuilder;
use rowset::{
    CachedRowSet, Compatibility, DataType, MemorySource, Query, RowSet, RowSetProperties, Value,
};

fn create_source(count: i64) -> MemorySource {
    let meta = MetaDataBuilder::anonymous()
        .add_column("n", DataType::Int64)
        .unwrap()
        .build()
        .unwrap();
    let mut source = MemorySource::new();
    source.create_table("numbers", meta, &["n"]).unwrap();
    for i in 1..=count {
        source.insert("numbers", vec![Value::Int64(i)]).unwrap();
    }
    source
}

fn paged(compatibility: Compatibility) -> CachedRowSet {
    let properties = RowSetProperties::builder()
        .command(Query::table("numbers"))
        .page_size(3)
        .max_rows(5)
        .compatibility(compatibility)
        .build()
        .unwrap();
    CachedRowSet::with_properties(properties)
}

/// Walks the visible rows of the current page.
fn page_values(rs: &mut CachedRowSet) -> Vec<i64> {
    let mut values = Vec::new();
    rs.before_first().unwrap();
    while rs.next().unwrap() {
        values.extend(rs.get_i64(1).unwrap());
    }
    values
}

#[test]
fn test_pages_stop_at_max_rows() {
    let mut source = create_source(10);
    let mut rs = paged(Compatibility::Strict);
    rs.execute(&mut source).unwrap();

    let mut pages = Vec::new();
    while rs.next_page().unwrap() {
        pages.push(page_values(&mut rs));
    }

    assert_eq!(pages, vec![vec![1, 2, 3], vec![4, 5]]);
    assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 5);
    assert!(!rs.next_page().unwrap());
}

#[test]
fn test_lenient_loop_skips_loaded_page() {
    let mut source = create_source(10);
    let mut rs = paged(Compatibility::Lenient);
    rs.execute(&mut source).unwrap();

    let first = page_values(&mut rs);
    assert_eq!(first, vec![1, 2, 3]);
    assert!(rs.next_page().unwrap());
    assert_eq!(page_values(&mut rs), vec![4, 5]);
    assert!(!rs.next_page().unwrap());
}

#[test]
fn test_paging_back_and_forth() {
    let mut source = create_source(10);
    let mut rs = paged(Compatibility::Lenient);
    rs.execute(&mut source).unwrap();

    assert!(rs.next_page().unwrap());
    assert_eq!(rs.page_offset(), 3);
    assert!(rs.previous_page().unwrap());
    assert_eq!(rs.page_offset(), 0);
    assert_eq!(page_values(&mut rs), vec![1, 2, 3]);
}

#[test]
fn test_page_switch_refused_with_local_changes() {
    let mut source = create_source(10);
    let mut rs = paged(Compatibility::Lenient);
    rs.execute(&mut source).unwrap();

    rs.first().unwrap();
    rs.update(1, Value::Int64(100)).unwrap();
    rs.update_row().unwrap();

    let err = rs.next_page().unwrap_err();
    assert!(matches!(err, rowset::Error::InvalidOperation { .. }));
    assert_eq!(rs.page_offset(), 0);
    assert!(rs.has_changes());
    assert_eq!(rs.rows()[0].current()[0], Value::Int64(100));

    rs.first().unwrap();
    rs.undo_update().unwrap();
    assert!(rs.next_page().unwrap());
    assert_eq!(rs.page_offset(), 3);

    rs.first().unwrap();
    rs.delete_row().unwrap();
    assert!(rs.previous_page().is_err());
    assert_eq!(rs.page_offset(), 3);

    rs.accept_changes(&mut source).unwrap();
    assert!(rs.previous_page().unwrap());
    assert_eq!(page_values(&mut rs), vec![1, 2, 3]);
}

#[test]
fn test_invalid_page_configuration() {
    assert!(RowSetProperties::builder()
        .page_size(10)
        .max_rows(5)
        .build()
        .is_err());

    let mut rs = paged(Compatibility::Strict);
    assert!(rs.set_page_size(6).is_err());
    assert!(rs.set_max_rows(2).is_err());
    assert!(rs.set_max_rows(0).is_ok());
    assert!(rs.set_page_size(6).is_ok());
}
