//! Property-based tests: generated documents must survive a write/read
//! cycle unchanged.

use proptest::prelude::*;
use uxf::{from_str_with_options, to_string, Key, List, Map, ParseOptions, Uxf, Value};

fn reload(doc: &Uxf) -> Uxf {
    let text = to_string(doc).expect("dump failed");
    from_str_with_options(
        &text,
        "-",
        &ParseOptions::default(),
        &mut uxf::event::ignore,
    )
    .unwrap_or_else(|err| panic!("reload failed: {err}\n{text}"))
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite reals only", |r| r.is_finite())
            .prop_map(Value::from),
        "[ -~]{0,24}".prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::from),
        (1i32..=9999, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
            Value::Date(chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap())
        }),
    ]
}

fn key() -> impl Strategy<Value = Key> {
    prop_oneof![
        any::<i64>().prop_map(Key::Int),
        "[ -~]{0,16}".prop_map(Key::Str),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Key::Bytes),
    ]
}

proptest! {
    #[test]
    fn scalar_lists_roundtrip(values in prop::collection::vec(scalar(), 0..24)) {
        let mut doc = Uxf::default();
        doc.set_value(Value::List(values.into_iter().collect::<List>())).unwrap();
        prop_assert_eq!(reload(&doc), doc);
    }

    #[test]
    fn maps_roundtrip(entries in prop::collection::vec((key(), scalar()), 0..16)) {
        let mut map = Map::new();
        for (k, v) in entries {
            map.insert(k, v);
        }
        let mut doc = Uxf::default();
        doc.set_value(Value::Map(map)).unwrap();
        prop_assert_eq!(reload(&doc), doc);
    }

    #[test]
    fn nested_lists_roundtrip(
        rows in prop::collection::vec(prop::collection::vec(scalar(), 0..6), 0..8)
    ) {
        let mut outer = List::default();
        for row in rows {
            outer.push(Value::List(row.into_iter().collect::<List>()));
        }
        let mut doc = Uxf::default();
        doc.set_value(Value::List(outer)).unwrap();
        prop_assert_eq!(reload(&doc), doc);
    }

    #[test]
    fn custom_header_text_roundtrips(custom in "[ -~]{0,30}") {
        // Header custom text is free-form up to the newline.
        let custom = custom.trim().to_string();
        let doc = Uxf::new(&custom, None);
        let reloaded = reload(&doc);
        prop_assert_eq!(reloaded.custom(), custom);
    }

    #[test]
    fn ints_roundtrip_exactly(i in any::<i64>()) {
        let text = format!("uxf 1.0\n[{i}]\n");
        let doc = from_str_with_options(
            &text, "-", &ParseOptions::default(), &mut uxf::event::ignore,
        ).unwrap();
        prop_assert_eq!(doc.value().as_list().unwrap().get(0), Some(&Value::Int(i)));
        prop_assert_eq!(to_string(&doc).unwrap(), text);
    }
}
