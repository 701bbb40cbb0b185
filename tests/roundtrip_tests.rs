//! Round-trip tests for documents built through the API rather than
//! parsed from text, plus format-knob behavior.

use uxf::{
    from_str, to_string, to_string_with_format, Field, Format, Key, List, Map, Table, TClass,
    Uxf, Value,
};

fn reload(doc: &Uxf) -> Uxf {
    from_str(&to_string(doc).unwrap()).unwrap()
}

fn price_list() -> Uxf {
    let tclass = TClass::new(
        "PriceList",
        vec![
            Field::new("Date", Some("date")).unwrap(),
            Field::new("Price", Some("real")).unwrap(),
            Field::new("Quantity", Some("int")).unwrap(),
            Field::new("ID", Some("str")).unwrap(),
        ],
        None,
    )
    .unwrap();
    let mut table = Table::new(tclass.clone(), None);
    table
        .push_record(vec![
            Value::Date(chrono::NaiveDate::from_ymd_opt(2022, 9, 21).unwrap()),
            Value::Real(3.99),
            Value::Int(2),
            Value::Str("CH1-A2".to_string()),
        ])
        .unwrap();
    table
        .push_record(vec![
            Value::Date(chrono::NaiveDate::from_ymd_opt(2022, 9, 22).unwrap()),
            Value::Real(12.5),
            Value::Int(1),
            Value::Null,
        ])
        .unwrap();
    let mut doc = Uxf::new("Price List", None);
    doc.add_tclass(tclass).unwrap();
    doc.set_value(Value::Table(table)).unwrap();
    doc
}

#[test]
fn api_built_table_roundtrips() {
    let doc = price_list();
    assert_eq!(reload(&doc), doc);
}

#[test]
fn api_built_typed_containers_roundtrip() {
    let mut list = List::with_vtype(Some("int"), Some("counts")).unwrap();
    for i in [1i64, -2, 300] {
        list.push(Value::from(i));
    }
    let mut doc = Uxf::default();
    doc.set_value(Value::List(list)).unwrap();
    assert_eq!(reload(&doc), doc);

    let mut map = Map::with_types(Some("str"), Some("real"), Some("prices")).unwrap();
    map.insert(Key::from("chisel"), Value::Real(3.99));
    map.insert(Key::from("hammer"), Value::Real(12.5));
    let mut doc = Uxf::default();
    doc.set_value(Value::Map(map)).unwrap();
    assert_eq!(reload(&doc), doc);
}

#[test]
fn datetimes_roundtrip_with_seconds() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let mut list = List::default();
    list.push(Value::DateTime(date.and_hms_opt(23, 59, 59).unwrap()));
    list.push(Value::DateTime(date.and_hms_opt(0, 0, 0).unwrap()));
    let mut doc = Uxf::default();
    doc.set_value(Value::List(list)).unwrap();
    let text = to_string(&doc).unwrap();
    assert_eq!(
        text,
        "uxf 1.0\n[2024-03-01T23:59:59 2024-03-01T00:00:00]\n"
    );
    assert_eq!(reload(&doc), doc);
}

#[test]
fn realdp_fixes_precision() {
    let doc = from_str("uxf 1.0\n[1.23456 2.0]\n").unwrap();
    let text = to_string_with_format(&doc, &Format::default().with_realdp(2)).unwrap();
    assert_eq!(text, "uxf 1.0\n[1.23 2.00]\n");
}

#[test]
fn zero_max_short_len_forces_block_layout() {
    let doc = from_str("uxf 1.0\n[1 2]\n").unwrap();
    let text =
        to_string_with_format(&doc, &Format::default().with_max_short_len(0)).unwrap();
    assert_eq!(text, "uxf 1.0\n[\n  1\n  2\n]\n");
    // Block layout parses back to the same tree.
    assert_eq!(from_str(&text).unwrap(), doc);
}

#[test]
fn non_finite_reals_cannot_be_written() {
    let mut list = List::default();
    list.push(Value::Real(f64::NAN));
    let mut doc = Uxf::default();
    doc.set_value(Value::List(list)).unwrap();
    assert!(to_string(&doc).is_err());
}

#[test]
fn empty_containers_roundtrip() {
    for text in [
        "uxf 1.0\n[]\n",
        "uxf 1.0\n{}\n",
        "uxf 1.0\n=Sealed\n(Sealed)\n",
        "uxf 1.0\n=Pair a b\n(Pair)\n",
    ] {
        let doc = from_str(text).unwrap();
        assert_eq!(to_string(&doc).unwrap(), text, "{text}");
    }
}

#[test]
fn fieldless_table_roundtrips_as_a_tag() {
    let tag = TClass::new_fieldless("Confirmed", None).unwrap();
    let mut doc = Uxf::default();
    doc.add_tclass(tag.clone()).unwrap();
    let mut list = List::default();
    list.push(Value::Table(Table::new(tag, None)));
    doc.set_value(Value::List(list)).unwrap();
    assert_eq!(reload(&doc), doc);
}

#[test]
fn mixed_nesting_roundtrips() {
    let mut inner_map = Map::new();
    inner_map.insert(Key::from(1i64), Value::from("one"));
    inner_map.insert(
        Key::Bytes(vec![0xCA, 0xFE]),
        Value::Bytes(vec![0xBA, 0xBE]),
    );
    let mut inner_list = List::default();
    inner_list.push(Value::Map(inner_map));
    inner_list.push(Value::Null);
    let mut outer = Map::new();
    outer.insert(Key::from("payload"), Value::List(inner_list));
    let mut doc = Uxf::new("nested", Some("a file comment"));
    doc.set_value(Value::Map(outer)).unwrap();
    assert_eq!(reload(&doc), doc);
}

#[test]
fn multiline_string_content_is_preserved_exactly() {
    let mut list = List::default();
    list.push(Value::from("line one\nline two\n  indented"));
    let mut doc = Uxf::default();
    doc.set_value(Value::List(list)).unwrap();
    let again = reload(&doc);
    assert_eq!(
        again.value().as_list().unwrap().get(0).and_then(Value::as_str),
        Some("line one\nline two\n  indented")
    );
}
