//! Unit tests for waitval-rdbc types module

use std::sync::Arc;
use waitval_rdbc::types::{Row, Value};

#[test]
fn test_value_categories() {
    assert_eq!(Value::Null.kind(), "null");
    assert_eq!(Value::Int(1).kind(), "int");
    assert_eq!(Value::Float(1.0).kind(), "float");
    assert_eq!(Value::Bool(false).kind(), "bool");
    assert_eq!(Value::Text(String::new()).kind(), "text");
    assert_eq!(Value::Bytes(Vec::new()).kind(), "bytes");
}

#[test]
fn test_unsupported_keeps_type_name() {
    assert_eq!(
        Value::unsupported("VECTOR"),
        Value::Unsupported {
            type_name: "VECTOR".into()
        }
    );
}

#[test]
fn test_rows_share_column_names() {
    let columns: Arc<[String]> = vec!["id".to_string(), "state".to_string()].into();

    let first = Row::new(Arc::clone(&columns), vec![Value::Int(1), Value::Null]);
    let second = Row::new(Arc::clone(&columns), vec![Value::Int(2), Value::Text("ok".into())]);

    let names = |row: &Row| row.iter().map(|(c, _)| c.to_owned()).collect::<Vec<_>>();
    assert_eq!(names(&first), names(&second));
    assert_eq!(second.iter().nth(1), Some(("state", &Value::Text("ok".into()))));
    assert_eq!(second.iter().nth(2), None);
}

#[test]
fn test_empty_row() {
    let row = Row::new(Vec::<String>::new().into(), Vec::new());
    assert_eq!(row.iter().count(), 0);
}
