use rwgt_events::{read_weight_table, write_weight_table, WeightRecord};
use tempfile::tempdir;

#[test]
fn weight_table_has_expected_header_and_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weights.csv");
    let records = vec![
        WeightRecord { event_id: 7, weight: 1.25 },
        WeightRecord { event_id: -3, weight: 3.0e-9 },
    ];
    write_weight_table(&path, &records).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some("event_id,weight"));
    assert_eq!(read_weight_table(&path).unwrap(), records);
}

#[test]
fn externally_written_tables_are_accepted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("external.csv");
    std::fs::write(&path, "event_id,weight\n 2 , 0.5\n1,1e3\n").unwrap();
    let records = read_weight_table(&path).unwrap();
    assert_eq!(records[0], WeightRecord { event_id: 2, weight: 0.5 });
    assert_eq!(records[1].weight, 1000.0);
}

#[test]
fn malformed_rows_name_the_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    std::fs::write(&path, "event_id,weight\n1,0.5\nx,2\n").unwrap();
    let err = read_weight_table(&path).unwrap_err();
    assert_eq!(err.code(), "weight-table-row");
    assert_eq!(err.info().context.get("row").map(String::as_str), Some("2"));
}

#[test]
fn missing_table_is_an_error() {
    let dir = tempdir().unwrap();
    let err = read_weight_table(&dir.path().join("absent.csv")).unwrap_err();
    assert_eq!(err.code(), "weight-table-open");
}
