//! End-to-end encode/decode scenarios (S1-S9 from the design notes),
//! comparing against literal wire hex and Extended-JSON text.

use pretty_assertions::assert_eq;

use bson_query::{
    binary::{Binary, BinarySubtype},
    build_document,
    document::reader::DocumentReader,
    types::Timestamp,
};

fn hex_of(bytes: &bson_query::Bytes) -> String {
    hex::encode(bytes.as_slice())
}

fn extjson(doc: &DocumentReader) -> String {
    bson_query::extjson::render_document(doc).unwrap()
}

#[test]
fn s1_boolean_round_trip() {
    let bytes = build_document(|w| {
        w.write_boolean("b", true);
        Ok(())
    })
    .unwrap();
    assert_eq!(hex_of(&bytes), "090000000862000100");

    let doc = DocumentReader::from_full_bytes(bytes);
    assert_eq!(extjson(&doc), r#"{"b": true}"#);
    assert!(doc.read("b").unwrap().unwrap().read_boolean().unwrap());
}

#[test]
fn s2_empty_subdocument() {
    let bytes = build_document(|w| w.write_document("x", |_| Ok(()))).unwrap();
    assert_eq!(hex_of(&bytes), "0d000000037800050000000000");
    let doc = DocumentReader::from_full_bytes(bytes);
    assert_eq!(extjson(&doc), r#"{"x": {}}"#);
}

#[test]
fn s3_nested_subdocument_with_dollar_key() {
    let bytes = build_document(|w| {
        w.write_document("x", |inner| {
            inner.write_string("$a", "b");
            Ok(())
        })
    })
    .unwrap();
    assert_eq!(hex_of(&bytes), "170000000378000f000000022461000200000062000000");
}

#[test]
fn s4_array_with_single_int() {
    let doc = build_document(|w| {
        w.write_array("a", |a| {
            a.write_int32(10);
            Ok(())
        })
    })
    .unwrap();
    assert_eq!(hex_of(&doc), "140000000461000c0000001030000a0000000000");

    // the standalone array, built directly, is that same sub-document.
    let array = bson_query::build_array(|a| {
        a.write_int32(10);
        Ok(())
    })
    .unwrap();
    assert_eq!(array.len(), 12);
}

#[test]
fn s5_array_with_empty_encoded_key() {
    let hex = "130000000461000b00000010000a0000000000";
    let bytes = bson_query::Bytes::new(hex::decode(hex).unwrap());
    let doc = DocumentReader::from_full_bytes(bytes);
    assert_eq!(extjson(&doc), r#"{"a": [10]}"#);
    let array = doc.read("a").unwrap().unwrap().read_array().unwrap();
    assert_eq!(array.read(0).unwrap().unwrap().read_int32().unwrap(), 10);
}

#[test]
fn s6_datetime_epoch() {
    let bytes = build_document(|w| {
        w.write_datetime("a", 0);
        Ok(())
    })
    .unwrap();
    assert_eq!(hex_of(&bytes), "10000000096100000000000000000000");
    let doc = DocumentReader::from_full_bytes(bytes);
    assert_eq!(
        extjson(&doc),
        r#"{"a": {"$date": "1970-01-01T00:00:00Z"}}"#
    );
}

#[test]
fn s7_double_nan() {
    let bytes = build_document(|w| {
        w.write_double("d", f64::NAN);
        Ok(())
    })
    .unwrap();
    assert_eq!(hex_of(&bytes), "10000000016400000000000000f87f00");
    let doc = DocumentReader::from_full_bytes(bytes);
    assert_eq!(
        extjson(&doc),
        r#"{"d": {"$numberDouble": "NaN"}}"#
    );
}

#[test]
fn s8_binary_subtype_0x02_has_doubled_length() {
    let bytes = build_document(|w| {
        w.write_binary_data(
            "x",
            &Binary {
                subtype: BinarySubtype::BinaryOld,
                bytes: vec![0xFF, 0xFF],
            },
        );
        Ok(())
    })
    .unwrap();
    assert_eq!(hex_of(&bytes), "13000000057800060000000202000000ffff00");
}

#[test]
fn s9_timestamp_extremes() {
    let bytes = build_document(|w| {
        w.write_timestamp("a", Timestamp::new(u32::MAX, u32::MAX));
        Ok(())
    })
    .unwrap();
    assert_eq!(hex_of(&bytes), "10000000116100ffffffffffffffff00");
}

#[test]
fn decode_then_encode_preserves_field_order() {
    let original = build_document(|w| {
        w.write_int32("z", 1);
        w.write_int32("a", 2);
        w.write_int32("m", 3);
        Ok(())
    })
    .unwrap();

    let doc = DocumentReader::from_full_bytes(original.clone());
    let entries = doc.entries().unwrap();
    let reencoded = build_document(|w| {
        for (name, value) in &entries {
            w.write_int32(name, value.read_int32().unwrap());
        }
        Ok(())
    })
    .unwrap();

    assert_eq!(original, reencoded);
}
