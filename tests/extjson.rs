//! Extended-JSON rendering coverage beyond the S1/S2/S6/S7 scenarios
//! already covered inline in `src/extjson.rs`.

use pretty_assertions::assert_eq;

use bson_query::{
    binary::{Binary, BinarySubtype},
    build_document,
    document::reader::DocumentReader,
    extjson::render_document,
    types::{ObjectId, Timestamp},
};

fn rendered(block: impl FnOnce(&mut bson_query::builder::FieldWriter) -> bson_query::Result<()>) -> String {
    let bytes = build_document(block).unwrap();
    render_document(&DocumentReader::from_full_bytes(bytes)).unwrap()
}

#[test]
fn object_id_renders_as_oid_document() {
    let id = ObjectId::parse_str("53e37d08776f724e42000000").unwrap();
    assert_eq!(
        rendered(|w| {
            w.write_object_id("_id", id);
            Ok(())
        }),
        r#"{"_id": {"$oid": "53e37d08776f724e42000000"}}"#
    );
}

#[test]
fn timestamp_renders_seconds_and_counter() {
    assert_eq!(
        rendered(|w| {
            w.write_timestamp("ts", Timestamp::new(5, 9));
            Ok(())
        }),
        r#"{"ts": {"$timestamp": {"t": 5, "i": 9}}}"#
    );
}

#[test]
fn binary_renders_base64_and_subtype() {
    assert_eq!(
        rendered(|w| {
            w.write_binary_data(
                "b",
                &Binary { subtype: BinarySubtype::Md5, bytes: vec![0xDE, 0xAD, 0xBE, 0xEF] },
            );
            Ok(())
        }),
        r#"{"b": {"$binary": {"base64": "3q2+7w==", "subType": "05"}}}"#
    );
}

#[test]
fn regexp_renders_with_escaped_pattern() {
    assert_eq!(
        rendered(|w| {
            w.write_regexp("r", "a\"b", "ix");
            Ok(())
        }),
        r#"{"r": {"$regularExpression": {"pattern": "a\"b", "options": "ix"}}}"#
    );
}

#[test]
fn min_and_max_key_render_as_fixed_documents() {
    assert_eq!(
        rendered(|w| {
            w.write_min_key("lo");
            w.write_max_key("hi");
            Ok(())
        }),
        r#"{"lo": {"$minKey": 1}, "hi": {"$maxKey": 1}}"#
    );
}

#[test]
fn datetime_past_the_iso_range_renders_as_number_long() {
    assert_eq!(
        rendered(|w| {
            w.write_datetime("a", 253_402_300_800_000);
            Ok(())
        }),
        r#"{"a": {"$date": {"$numberLong": "253402300800000"}}}"#
    );
}

#[test]
fn nested_array_and_document_render_recursively() {
    assert_eq!(
        rendered(|w| {
            w.write_array("items", |a| {
                a.open_document(|d| {
                    d.write_int32("n", 1);
                    Ok(())
                })?;
                a.write_string("tail");
                Ok(())
            })
        }),
        r#"{"items": [{"n": 1}, "tail"]}"#
    );
}

#[test]
fn undefined_and_null_render() {
    assert_eq!(
        rendered(|w| {
            w.write_undefined("u");
            w.write_null("n");
            Ok(())
        }),
        r#"{"u": {"$undefined": true}, "n": null}"#
    );
}
