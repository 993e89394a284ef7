use jsoncsv::{
    CsvCodec, FieldValue, Fields, JsonCodec, RecordCodec, RecordSet, infer::infer, verify,
};
use proptest::prelude::*;

fn string_record_set(columns: Vec<String>, rows: Vec<(String, Vec<String>)>) -> RecordSet {
    let mut records = RecordSet::new();
    for (id, values) in rows {
        let fields: Fields = columns
            .iter()
            .cloned()
            .zip(values.into_iter().map(FieldValue::String))
            .collect();
        records.add_or_replace(id, fields);
    }
    records
}

fn string_table() -> impl Strategy<Value = RecordSet> {
    (1usize..5)
        .prop_flat_map(|width| {
            let columns = prop::collection::hash_set("[a-z][a-z0-9_]{0,6}", width)
                .prop_filter("id is reserved", |names| !names.contains("id"))
                .prop_map(|names| names.into_iter().collect::<Vec<_>>());
            let rows = prop::collection::vec(
                (
                    "[A-Za-z0-9-]{1,8}",
                    prop::collection::vec("[ -~\n\u{e9}]{0,12}", width),
                ),
                1..8,
            );
            (columns, rows)
        })
        .prop_map(|(columns, rows)| string_record_set(columns, rows))
}

proptest! {
    #[test]
    fn string_only_record_sets_survive_csv_unchanged(records in string_table()) {
        let codec = CsvCodec::default();
        let text = codec.serialize(&records).expect("serialize");
        let parsed = codec.parse(&text).expect("parse");
        prop_assert_eq!(parsed, records);
    }

    #[test]
    fn non_string_values_always_fail_without_inference(
        value in prop_oneof![
            any::<i64>().prop_map(FieldValue::Integer),
            any::<bool>().prop_map(FieldValue::Boolean),
            (-1.0e12f64..1.0e12).prop_map(FieldValue::Float),
        ]
    ) {
        let mut records = RecordSet::new();
        let fields: Fields = [("name", FieldValue::from("x")), ("value", value)]
            .into_iter()
            .collect();
        records.add_or_replace("1", fields);
        let text = JsonCodec::default().serialize(&records).expect("serialize");

        let result = verify(&text, false).expect("verify");
        prop_assert!(!result.passed);
    }

    #[test]
    fn typed_scalars_survive_with_inference(
        integer in any::<i64>(),
        float in -1.0e12f64..1.0e12,
        flag in any::<bool>(),
    ) {
        let mut records = RecordSet::new();
        let fields: Fields = [
            ("integer", FieldValue::Integer(integer)),
            ("float", FieldValue::Float(float)),
            ("flag", FieldValue::Boolean(flag)),
        ]
        .into_iter()
        .collect();
        records.add_or_replace("r1", fields);
        let text = JsonCodec::default().serialize(&records).expect("serialize");

        let result = verify(&text, true).expect("verify");
        prop_assert!(result.passed, "{:?}", result.mismatches);
    }

    #[test]
    fn leading_zero_numbers_are_never_inferred(digits in "0[0-9]{1,10}") {
        prop_assert_eq!(infer(&digits), FieldValue::String(digits.clone()));
    }
}

#[test]
fn json_to_csv_to_json_keeps_record_order() {
    let json = JsonCodec::default();
    let csv = CsvCodec::new(true);
    let original = json
        .parse(r#"{"z":{"n":1},"a":{"n":2},"m":{"n":3}}"#)
        .unwrap();
    let back = csv.parse(&csv.serialize(&original).unwrap()).unwrap();
    assert_eq!(back.ids().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    assert_eq!(back, original);
}
