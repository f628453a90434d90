//! The update DSL: per-operator leaf nodes with coalescing on simplify, so
//! the emitted BSON has at most one document per operator subtype.

use crate::builder::FieldWriter;
use crate::error::Error;
use crate::expr::BsonNode;
use crate::path::Path;
use crate::query::value::Value;

/// A single `$currentDate` entry: either a plain datetime bump or a
/// timestamp bump, which render differently (`true` vs `{"$type": "timestamp"}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentDateKind {
    Datetime,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperatorKind {
    Set,
    SetOnInsert,
    Inc,
    Mul,
    Min,
    Max,
    Unset,
    Rename,
    AddToSet,
    CurrentDate,
}

impl OperatorKind {
    fn key(self) -> &'static str {
        match self {
            OperatorKind::Set => "$set",
            OperatorKind::SetOnInsert => "$setOnInsert",
            OperatorKind::Inc => "$inc",
            OperatorKind::Mul => "$mul",
            OperatorKind::Min => "$min",
            OperatorKind::Max => "$max",
            OperatorKind::Unset => "$unset",
            OperatorKind::Rename => "$rename",
            OperatorKind::AddToSet => "$addToSet",
            OperatorKind::CurrentDate => "$currentDate",
        }
    }
}

/// The payload carried per path by an operator node. Most operators carry a
/// [`Value`]; `$rename` carries a destination path string and `$currentDate`
/// carries a [`CurrentDateKind`]. `$unset` ignores its payload entirely
/// (always renders `true`), so any `Value` may be supplied for it.
#[derive(Clone)]
enum Payload {
    Value(Value),
    RenameTo(Path),
    CurrentDate(CurrentDateKind),
}

/// One operator's accumulated `(path, payload)` entries. Before being
/// accepted into an [`UpdateQuery`], distinct operator nodes of the same
/// kind are coalesced by concatenating their entry lists.
pub struct Operator {
    kind: OperatorKind,
    entries: Vec<(Path, Payload)>,
    frozen: bool,
}

impl Operator {
    fn new(kind: OperatorKind) -> Self {
        Operator { kind, entries: Vec::new(), frozen: false }
    }

    pub fn set() -> Self {
        Self::new(OperatorKind::Set)
    }

    pub fn set_on_insert() -> Self {
        Self::new(OperatorKind::SetOnInsert)
    }

    pub fn inc() -> Self {
        Self::new(OperatorKind::Inc)
    }

    pub fn mul() -> Self {
        Self::new(OperatorKind::Mul)
    }

    pub fn min() -> Self {
        Self::new(OperatorKind::Min)
    }

    pub fn max() -> Self {
        Self::new(OperatorKind::Max)
    }

    pub fn unset() -> Self {
        Self::new(OperatorKind::Unset)
    }

    pub fn rename() -> Self {
        Self::new(OperatorKind::Rename)
    }

    pub fn add_to_set() -> Self {
        Self::new(OperatorKind::AddToSet)
    }

    pub fn current_date() -> Self {
        Self::new(OperatorKind::CurrentDate)
    }

    /// Adds a `(path, value)` entry. Valid for every operator except
    /// `$rename` and `$currentDate`, which have their own typed adders.
    pub fn add(mut self, path: Path, value: impl Into<Value>) -> Self {
        self.entries.push((path, Payload::Value(value.into())));
        self
    }

    /// Adds a `$rename` entry: rename `from` to `to`.
    pub fn add_rename(mut self, from: Path, to: Path) -> Self {
        self.entries.push((from, Payload::RenameTo(to)));
        self
    }

    /// Adds a `$currentDate` entry.
    pub fn add_current_date(mut self, path: Path, kind: CurrentDateKind) -> Self {
        self.entries.push((path, Payload::CurrentDate(kind)));
        self
    }
}

impl BsonNode for Operator {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        let kind = self.kind;
        let entries = &self.entries;
        writer.write_document(kind.key(), |d| {
            for (path, payload) in entries {
                let key = path.to_string();
                match (kind, payload) {
                    (OperatorKind::Unset, _) => d.write_boolean(&key, true),
                    (OperatorKind::Rename, Payload::RenameTo(to)) => {
                        d.write_string(&key, &to.to_string())
                    }
                    (OperatorKind::CurrentDate, Payload::CurrentDate(CurrentDateKind::Datetime)) => {
                        d.write_boolean(&key, true)
                    }
                    (OperatorKind::CurrentDate, Payload::CurrentDate(CurrentDateKind::Timestamp)) => {
                        d.write_document(&key, |inner| {
                            inner.write_string("$type", "timestamp");
                            Ok(())
                        })?;
                    }
                    (_, Payload::Value(v)) => v.write_field(&key, d)?,
                    _ => unreachable!("payload shape is fixed per operator kind"),
                }
            }
            Ok(())
        })
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn take_and_children(self: Box<Self>) -> Result<Vec<Box<dyn BsonNode>>, Box<dyn BsonNode>> {
        Err(self)
    }
}

/// A compound of operator nodes, coalescing same-kind operators on
/// simplify so the emitted document has at most one `$set`, one `$inc`,
/// etc. `$addToSet` additionally groups multiple values for the same path
/// under `{"$each": [...]}`.
pub struct UpdateQuery {
    children: Vec<Operator>,
    frozen: bool,
}

impl UpdateQuery {
    pub fn new() -> Self {
        UpdateQuery { children: Vec::new(), frozen: false }
    }

    pub fn add(&mut self, op: Operator) -> Result<(), Error> {
        if self.frozen {
            return Err(crate::error::ErrorKind::FrozenMutation.into());
        }
        if !op.entries.is_empty() {
            self.children.push(op);
        }
        Ok(())
    }
}

impl Default for UpdateQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonNode for UpdateQuery {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        if self.children.is_empty() {
            return None;
        }
        let mut merged: Vec<Operator> = Vec::new();
        for child in self.children {
            if let Some(existing) = merged.iter_mut().find(|m| m.kind == child.kind) {
                existing.entries.extend(child.entries);
            } else {
                merged.push(child);
            }
        }
        Some(Box::new(UpdateQuery { children: merged, frozen: false }))
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        for child in &self.children {
            if child.kind == OperatorKind::AddToSet {
                write_add_to_set(child, writer)?;
            } else {
                child.write(writer)?;
            }
        }
        Ok(())
    }

    fn freeze(&mut self) {
        self.frozen = true;
        for child in &mut self.children {
            child.freeze();
        }
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// `$addToSet` needs one value per path, or `{"$each": [...]}` once a path
/// has more than one value -- unlike every other operator, which simply
/// repeats `(path, value)` pairs verbatim.
fn write_add_to_set(op: &Operator, writer: &mut FieldWriter) -> Result<(), Error> {
    let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
    for (path, payload) in &op.entries {
        let Payload::Value(value) = payload else {
            unreachable!("$addToSet entries are always Value payloads")
        };
        let key = path.to_string();
        if let Some(existing) = grouped.iter_mut().find(|(k, _)| *k == key) {
            existing.1.push(value.clone());
        } else {
            grouped.push((key, vec![value.clone()]));
        }
    }
    writer.write_document("$addToSet", |d| {
        for (key, values) in &grouped {
            if values.len() == 1 {
                values[0].write_field(key, d)?;
            } else {
                let values = values.clone();
                d.write_document(key, |each_doc| {
                    each_doc.write_array("$each", |a| {
                        for v in &values {
                            v.write_element(a)?;
                        }
                        Ok(())
                    })
                })?;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::build_document;
    use crate::document::reader::DocumentReader;
    use crate::extjson::render_document;

    fn rendered(query: UpdateQuery) -> String {
        let simplified = Box::new(query).simplify().unwrap();
        let bytes = build_document(|w| simplified.write(w)).unwrap();
        render_document(&DocumentReader::from_full_bytes(bytes)).unwrap()
    }

    #[test]
    fn set_renders_mapping() {
        let mut query = UpdateQuery::new();
        query.add(Operator::set().add(Path::field("name"), "ada")).unwrap();
        assert_eq!(rendered(query), r#"{"$set": {"name": "ada"}}"#);
    }

    #[test]
    fn coalesces_same_kind_operators() {
        let mut query = UpdateQuery::new();
        query.add(Operator::set().add(Path::field("a"), 1i32)).unwrap();
        query.add(Operator::set().add(Path::field("b"), 2i32)).unwrap();
        assert_eq!(rendered(query), r#"{"$set": {"a": 1, "b": 2}}"#);
    }

    #[test]
    fn unset_always_renders_true() {
        let mut query = UpdateQuery::new();
        query.add(Operator::unset().add(Path::field("a"), true)).unwrap();
        assert_eq!(rendered(query), r#"{"$unset": {"a": true}}"#);
    }

    #[test]
    fn rename_renders_destination_string() {
        let mut query = UpdateQuery::new();
        query.add(Operator::rename().add_rename(Path::field("a"), Path::field("b"))).unwrap();
        assert_eq!(rendered(query), r#"{"$rename": {"a": "b"}}"#);
    }

    #[test]
    fn current_date_renders_per_kind() {
        let mut query = UpdateQuery::new();
        query
            .add(
                Operator::current_date()
                    .add_current_date(Path::field("a"), CurrentDateKind::Datetime)
                    .add_current_date(Path::field("b"), CurrentDateKind::Timestamp),
            )
            .unwrap();
        assert_eq!(
            rendered(query),
            r#"{"$currentDate": {"a": true, "b": {"$type": "timestamp"}}}"#
        );
    }

    #[test]
    fn add_to_set_groups_multiple_values_under_each() {
        let mut query = UpdateQuery::new();
        query
            .add(
                Operator::add_to_set()
                    .add(Path::field("tags"), "a")
                    .add(Path::field("tags"), "b")
                    .add(Path::field("other"), "solo"),
            )
            .unwrap();
        assert_eq!(
            rendered(query),
            r#"{"$addToSet": {"tags": {"$each": ["a", "b"]}, "other": "solo"}}"#
        );
    }
}
