//! End-to-end tests over the public API: parse, inspect, write, reload.

use uxf::{from_str, lint, to_string, Error, Key, ParseOptions, Value, RESERVED_WORDS};

fn code_of(err: Error) -> &'static str {
    err.code().expect("expected a diagnostic-backed error")
}

#[test]
fn minimal_empty_document_roundtrips_exactly() {
    let text = "uxf 1.0\n[]\n";
    let doc = from_str(text).unwrap();
    assert!(doc.value().as_list().unwrap().is_empty());
    assert!(doc.tclasses().is_empty());
    assert_eq!(doc.custom(), "");
    assert_eq!(doc.comment(), None);
    assert_eq!(to_string(&doc).unwrap(), text);
}

#[test]
fn typed_price_list() {
    let doc = from_str(
        "uxf 1.0 Price List\n\
         =PriceList Date:date Price:real Quantity:int ID:str Description:str\n\
         (PriceList 2022-09-21 3.99 2 <CH1-A2> <Chisels (pair), 1in &amp; 1\u{BC}in>)\n",
    )
    .unwrap();
    assert_eq!(doc.custom(), "Price List");
    let tclass = doc.tclass("PriceList").unwrap();
    assert_eq!(tclass.len(), 5);
    assert_eq!(tclass.fields()[0].vtype(), Some("date"));
    assert_eq!(tclass.fields()[4].vtype(), Some("str"));
    let table = doc.value().as_table().unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.get(0, 0).unwrap().is_date());
    assert_eq!(table.get(0, 1), Some(&Value::Real(3.99)));
    assert_eq!(table.get(0, 2), Some(&Value::Int(2)));
    assert_eq!(table.get(0, 3), Some(&Value::Str("CH1-A2".to_string())));
    assert_eq!(
        table.get(0, 4),
        Some(&Value::Str("Chisels (pair), 1in & 1\u{BC}in".to_string()))
    );

    // Reload the canonical dump and compare trees.
    let text = to_string(&doc).unwrap();
    let again = from_str(&text).unwrap();
    assert_eq!(doc, again);
}

#[test]
fn null_in_typed_slot_survives_roundtrip() {
    let doc = from_str("uxf 1.0\n=Cust CID:int Addr:str\n(Cust 19 ?)\n").unwrap();
    let table = doc.value().as_table().unwrap();
    assert_eq!(table.get(0, 1), Some(&Value::Null));
    let text = to_string(&doc).unwrap();
    assert!(text.contains('?'), "{text}");
    assert_eq!(from_str(&text).unwrap(), doc);
}

#[test]
fn strict_mode_rejects_type_mismatch() {
    let err = from_str("uxf 1.0\n=T x:int\n(T 3.14)\n").unwrap_err();
    assert_eq!(code_of(err), "E-TYPE-MISMATCH");
    // The diagnostic points at the value's line.
    let events = lint("uxf 1.0\n=T x:int\n(T 3.14)\n", "-", &ParseOptions::default());
    let fatal = events.iter().find(|e| e.fatal).unwrap();
    assert_eq!(fatal.line, 3);
}

#[test]
fn record_length_mismatch_is_fatal() {
    let err = from_str("uxf 1.0\n=Pair a b\n(Pair 1 2 3)\n").unwrap_err();
    assert_eq!(code_of(err), "E-PARSE-TABLE-LEN");
}

#[test]
fn every_reserved_word_is_rejected_as_a_name() {
    for word in RESERVED_WORDS {
        let as_ttype = format!("uxf 1.0\n={word} x\n[]\n");
        let err = from_str(&as_ttype).unwrap_err();
        assert_eq!(code_of(err), "E-TYPE-RESERVED", "ttype {word}");

        let as_field = format!("uxf 1.0\n=T {word}\n[]\n");
        let err = from_str(&as_field).unwrap_err();
        assert_eq!(code_of(err), "E-TYPE-RESERVED", "field {word}");
    }
}

#[test]
fn map_iteration_order_follows_the_source() {
    let doc = from_str(
        "uxf 1.0\n{<kilo> 1 2022-01-01 2 (:AB:) 3 42 4 <alpha> 5}\n",
    )
    .unwrap();
    let map = doc.value().as_map().unwrap();
    let kinds: Vec<&str> = map.keys().map(Key::type_name).collect();
    assert_eq!(kinds, vec!["str", "date", "bytes", "int", "str"]);
    assert_eq!(
        map.values().cloned().collect::<Vec<_>>(),
        (1..=5).map(Value::from).collect::<Vec<_>>()
    );
    // Order survives a write/read cycle.
    let again = from_str(&to_string(&doc).unwrap()).unwrap();
    assert_eq!(doc, again);
}

#[test]
fn idempotent_dump() {
    let sources = [
        "uxf 1.0\n[]\n",
        "uxf 1.0 stuff\n#<top>\n{int str 1 <one> 2 <two>}\n",
        "uxf 1.0\n=Point x:real y:real\n[Point (Point 0.0 0.0) (Point 1.5 -2.5)]\n",
        "uxf 1.0\n[[1 2] {<k> ?} (:DE AD BE EF:) <s> 2024-02-29]\n",
    ];
    for source in sources {
        let first = to_string(&from_str(source).unwrap()).unwrap();
        let second = to_string(&from_str(&first).unwrap()).unwrap();
        assert_eq!(first, second, "{source}");
    }
}

#[test]
fn booleans_accept_both_vocabularies_on_input() {
    let doc = from_str("uxf 1.0\n[true false yes no]\n").unwrap();
    let list = doc.value().as_list().unwrap();
    let values: Vec<Option<bool>> = list.iter().map(Value::as_bool).collect();
    assert_eq!(
        values,
        vec![Some(true), Some(false), Some(true), Some(false)]
    );
    // Canonical output uses yes/no.
    assert_eq!(to_string(&doc).unwrap(), "uxf 1.0\n[yes no yes no]\n");
}

#[test]
fn datetime_offset_sets_the_imprecise_flag() {
    let events = lint(
        "uxf 1.0\n[2024-06-01T12:00:00+02:00]\n",
        "-",
        &ParseOptions::default(),
    );
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].code, "W-DATETIME-IMPRECISE");
    assert!(!events[0].fatal);

    let doc = from_str("uxf 1.0\n[2024-06-01T12:00:00+02:00]\n").unwrap();
    let list = doc.value().as_list().unwrap();
    let dt = list.get(0).unwrap().as_datetime().unwrap();
    assert_eq!(dt.to_string(), "2024-06-01 10:00:00");
}

#[test]
fn fix_types_mode_converts_and_warns() {
    let options = ParseOptions {
        fix_types: true,
        ..ParseOptions::default()
    };
    let text = "uxf 1.0\n=T n:int flag:bool when:date\n(T <42> <no> <2022-01-31>)\n";
    let events = lint(text, "-", &options);
    assert!(events.iter().all(|e| e.code == "W-TYPE-COERCED"));
    assert_eq!(events.len(), 3);

    let doc =
        uxf::from_str_with_options(text, "-", &options, &mut uxf::event::ignore).unwrap();
    let table = doc.value().as_table().unwrap();
    assert_eq!(table.get(0, 0), Some(&Value::Int(42)));
    assert_eq!(table.get(0, 1), Some(&Value::Bool(false)));
    assert!(table.get(0, 2).unwrap().is_date());
}

#[test]
fn fix_types_does_not_invent_values() {
    let options = ParseOptions {
        fix_types: true,
        ..ParseOptions::default()
    };
    let err = uxf::from_str_with_options(
        "uxf 1.0\n=T n:int\n(T <not a number>)\n",
        "-",
        &options,
        &mut uxf::event::ignore,
    )
    .unwrap_err();
    assert_eq!(code_of(err), "E-TYPE-MISMATCH");
}

#[test]
fn deep_nesting_roundtrips() {
    let text = "uxf 1.0\n\
                =Tree label:str kids:list\n\
                [(Tree <root> [(Tree <leaf> [])])]\n";
    let doc = from_str(text).unwrap();
    let outer = doc.value().as_list().unwrap();
    let root = outer.get(0).unwrap().as_table().unwrap();
    assert_eq!(root.get(0, 0), Some(&Value::Str("root".to_string())));
    let kids = root.get(0, 1).unwrap().as_list().unwrap();
    assert!(kids.get(0).unwrap().is_table());
    assert_eq!(from_str(&to_string(&doc).unwrap()).unwrap(), doc);
}

#[test]
fn comments_survive_roundtrip() {
    let text = "uxf 1.0\n\
                #<file note>\n\
                =#<schema note> P x:int\n\
                [#<list note> (#<table note> P 1) {#<map note> <k> 1}]\n";
    let doc = from_str(text).unwrap();
    assert_eq!(doc.comment(), Some("file note"));
    assert_eq!(doc.tclass("P").unwrap().comment(), Some("schema note"));
    let list = doc.value().as_list().unwrap();
    assert_eq!(list.comment(), Some("list note"));
    assert_eq!(
        list.get(0).unwrap().as_table().unwrap().comment(),
        Some("table note")
    );
    assert_eq!(
        list.get(1).unwrap().as_map().unwrap().comment(),
        Some("map note")
    );
    assert_eq!(from_str(&to_string(&doc).unwrap()).unwrap(), doc);
}

#[test]
fn gzip_file_roundtrip() {
    let dir = std::env::temp_dir().join(format!("uxf-gz-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("data.uxf.gz");
    let doc = from_str("uxf 1.0\n[1 2 3]\n").unwrap();
    uxf::to_path(&path, &doc, &uxf::Format::default(), false).unwrap();
    // The .gz suffix implies compression; the raw bytes must be gzip.
    let raw = std::fs::read(&path).unwrap();
    assert_eq!(&raw[..2], &[0x1F, 0x8B]);
    let again = uxf::from_path(&path).unwrap();
    // Filenames differ but content-bearing fields must match.
    assert_eq!(again.value(), doc.value());
    assert_eq!(again.custom(), doc.custom());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn serialize_interop_with_json() {
    let doc = from_str(
        "uxf 1.0\n=Point x:real y:real\n{<origin> (Point 0.0 0.0) <label> <here>}\n",
    )
    .unwrap();
    let json = serde_json::to_value(doc.value()).unwrap();
    assert_eq!(json["label"], "here");
    assert_eq!(json["origin"][0]["x"], 0.0);
}
