//! End-to-end filter DSL emission, including the S10/S12 scenarios.

use bson_query::{
    build_document,
    builder::BsonContext,
    document::reader::DocumentReader,
    expr::BsonNode,
    extjson::render_document,
    path::Path,
    query::{
        BitsAllSet, ElemMatch, Eq, Exists, FilterQuery, Gt, In, Logical, Mask, MatchesRegex, Not,
        Predicate, RegexOptions,
    },
};

fn rendered(query: FilterQuery) -> String {
    let boxed: Box<dyn BsonNode> = Box::new(query);
    let simplified = boxed.simplify().expect("non-empty query");
    let bytes = build_document(|w| simplified.write(w)).unwrap();
    render_document(&DocumentReader::from_full_bytes(bytes)).unwrap()
}

#[test]
fn s10_and_of_two_equality_predicates() {
    let mut query = FilterQuery::new(BsonContext::new());
    let mut and = Logical::and();

    let mut name = Predicate::new(Path::field("name"));
    name.add(Box::new(Eq::new("foo"))).unwrap();
    and.add(Box::new(name)).unwrap();

    let mut age = Predicate::new(Path::field("age"));
    age.add(Box::new(Eq::new(18i32))).unwrap();
    and.add(Box::new(age)).unwrap();

    query.add(Box::new(and)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"$and": [{"name": {"$eq": "foo"}}, {"age": {"$eq": 18}}]}"#
    );
}

#[test]
fn s12_regexp_option_sorting() {
    let mut query = FilterQuery::new(BsonContext::new());
    let mut name = Predicate::new(Path::field("name"));
    name.add(Box::new(MatchesRegex::new(
        "^a",
        RegexOptions { case_insensitive: true, extended: true, ..Default::default() },
    )))
    .unwrap();
    query.add(Box::new(name)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"name": {"$regex": {"$regularExpression": {"pattern": "^a", "options": "ix"}}}}"#
    );
}

#[test]
fn exists_and_gt_share_one_predicate_body() {
    let mut query = FilterQuery::new(BsonContext::new());
    let mut age = Predicate::new(Path::field("age"));
    age.add(Box::new(Exists::new(true))).unwrap();
    age.add(Box::new(Gt::new(21i32))).unwrap();
    query.add(Box::new(age)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"age": {"$exists": true, "$gt": 21}}"#
    );
}

#[test]
fn not_wraps_a_predicate_body() {
    let mut query = FilterQuery::new(BsonContext::new());
    let mut name = Predicate::new(Path::field("name"));
    let mut not = Not::new();
    not.add(Box::new(Eq::new("forbidden"))).unwrap();
    name.add(Box::new(not)).unwrap();
    query.add(Box::new(name)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"name": {"$not": {"$eq": "forbidden"}}}"#
    );
}

#[test]
fn elem_match_nests_a_sub_predicate() {
    let mut query = FilterQuery::new(BsonContext::new());
    let mut tags = Predicate::new(Path::field("tags"));
    let mut elem_match = ElemMatch::new();
    elem_match.add(Box::new(Eq::new("rust"))).unwrap();
    tags.add(Box::new(elem_match)).unwrap();
    query.add(Box::new(tags)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"tags": {"$elemMatch": {"$eq": "rust"}}}"#
    );
}

#[test]
fn in_emits_value_array() {
    let mut query = FilterQuery::new(BsonContext::new());
    let mut status = Predicate::new(Path::field("status"));
    status
        .add(Box::new(In::new(vec!["open".into(), "pending".into()])))
        .unwrap();
    query.add(Box::new(status)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"status": {"$in": ["open", "pending"]}}"#
    );
}

#[test]
fn bitwise_mask_from_bit_positions_renders_as_binary() {
    let mut query = FilterQuery::new(BsonContext::new());
    let mut flags = Predicate::new(Path::field("flags"));
    flags.add(Box::new(BitsAllSet::new(Mask::from_bit_positions(&[0, 2])))).unwrap();
    query.add(Box::new(flags)).unwrap();

    assert_eq!(
        rendered(query),
        r#"{"flags": {"$bitsAllSet": {"$binary": {"base64": "BQ==", "subType": "00"}}}}"#
    );
}

#[test]
fn simplify_is_idempotent_on_a_flattened_and() {
    let make_tree = || {
        let mut outer = Logical::and();
        let mut inner = Logical::and();
        let mut a = Predicate::new(Path::field("a"));
        a.add(Box::new(Eq::new(1i32))).unwrap();
        inner.add(Box::new(a)).unwrap();
        let mut b = Predicate::new(Path::field("b"));
        b.add(Box::new(Eq::new(2i32))).unwrap();
        outer.add(Box::new(inner)).unwrap();
        outer.add(Box::new(b)).unwrap();
        let boxed: Box<dyn BsonNode> = Box::new(outer);
        boxed
    };

    let once = make_tree().simplify().unwrap();
    let bytes_once = build_document(|w| once.write(w)).unwrap();

    // simplify() consumes its receiver, so "applying it twice" means
    // simplifying the already-simplified tree a second time and checking
    // the result is byte-identical, per the idempotence invariant.
    let twice = make_tree().simplify().unwrap().simplify().unwrap();
    let bytes_twice = build_document(|w| twice.write(w)).unwrap();

    assert_eq!(bytes_once, bytes_twice);
}
