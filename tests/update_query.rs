//! End-to-end update DSL emission, including the S11 scenario and the
//! "no two children share an operator subtype after simplify" invariant.

use bson_query::{
    build_document,
    document::reader::DocumentReader,
    expr::BsonNode,
    extjson::render_document,
    path::Path,
    query::{CurrentDateKind, Operator, UpdateQuery},
};

fn rendered(query: UpdateQuery) -> String {
    let boxed: Box<dyn BsonNode> = Box::new(query);
    let simplified = boxed.simplify().expect("non-empty update");
    let bytes = build_document(|w| simplified.write(w)).unwrap();
    render_document(&DocumentReader::from_full_bytes(bytes)).unwrap()
}

#[test]
fn s11_coalesces_set_and_keeps_inc_separate() {
    let mut query = UpdateQuery::new();
    query.add(Operator::set().add(Path::field("a"), 1i32)).unwrap();
    query.add(Operator::set().add(Path::field("b"), 2i32)).unwrap();
    query.add(Operator::inc().add(Path::field("c"), 1i32)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"$set": {"a": 1, "b": 2}, "$inc": {"c": 1}}"#
    );
}

#[test]
fn set_on_insert_and_set_remain_distinct_operators() {
    let mut query = UpdateQuery::new();
    query.add(Operator::set().add(Path::field("seen"), true)).unwrap();
    query
        .add(Operator::set_on_insert().add(Path::field("createdAt"), 0i64))
        .unwrap();

    assert_eq!(
        rendered(query),
        r#"{"$set": {"seen": true}, "$setOnInsert": {"createdAt": 0}}"#
    );
}

#[test]
fn mul_min_max_each_render_their_own_document() {
    let mut query = UpdateQuery::new();
    query.add(Operator::mul().add(Path::field("score"), 2i32)).unwrap();
    query.add(Operator::min().add(Path::field("score"), 0i32)).unwrap();
    query.add(Operator::max().add(Path::field("score"), 100i32)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"$mul": {"score": 2}, "$min": {"score": 0}, "$max": {"score": 100}}"#
    );
}

#[test]
fn positional_marker_is_part_of_the_rename_path() {
    let mut query = UpdateQuery::new();
    let from = Path::field("tags").selected();
    query
        .add(Operator::rename().add_rename(from, Path::field("labels").selected()))
        .unwrap();

    assert_eq!(rendered(query), r#"{"$rename": {"tags.$": "labels.$"}}"#);
}

#[test]
fn current_date_distinguishes_datetime_from_timestamp() {
    let mut query = UpdateQuery::new();
    query
        .add(
            Operator::current_date()
                .add_current_date(Path::field("updatedAt"), CurrentDateKind::Datetime)
                .add_current_date(Path::field("lastOp"), CurrentDateKind::Timestamp),
        )
        .unwrap();

    assert_eq!(
        rendered(query),
        r#"{"$currentDate": {"updatedAt": true, "lastOp": {"$type": "timestamp"}}}"#
    );
}

#[test]
fn simplify_collapses_duplicate_operator_kinds_from_separate_builders() {
    // two independently-built $set operators merge into exactly one
    // $set document, satisfying the "no two children share a kind after
    // simplify" invariant even when callers never coalesce by hand.
    let mut query = UpdateQuery::new();
    for i in 0..5 {
        query
            .add(Operator::set().add(Path::field(format!("f{i}")), i as i32))
            .unwrap();
    }

    let text = rendered(query);
    assert_eq!(text.matches("\"$set\"").count(), 1);
    for i in 0..5 {
        assert!(text.contains(&format!("\"f{i}\": {i}")));
    }
}

#[test]
fn add_to_set_single_value_skips_the_each_wrapper() {
    let mut query = UpdateQuery::new();
    query.add(Operator::add_to_set().add(Path::field("tags"), "rust")).unwrap();

    assert_eq!(rendered(query), r#"{"$addToSet": {"tags": "rust"}}"#);
}

#[test]
fn empty_update_query_simplifies_away() {
    let query = UpdateQuery::new();
    let boxed: Box<dyn BsonNode> = Box::new(query);
    assert!(boxed.simplify().is_none());
}
