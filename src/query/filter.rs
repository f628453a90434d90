//! The filter DSL: `FilterQuery` plus the predicate and logical operator
//! nodes that populate it.

use crate::binary::{Binary, BinarySubtype};
use crate::builder::{BsonContext, FieldWriter};
use crate::error::Error;
use crate::expr::BsonNode;
use crate::path::Path;
use crate::query::value::Value;
use crate::query::value_expr::ValueExpr;
use crate::regex::sort_options;
use crate::types::BsonType;

/// A compound that emits its children's predicate documents directly into
/// the enclosing document -- there is no `FilterQuery` envelope of its
/// own. Multiple children at this level behave as an implicit AND.
pub struct FilterQuery {
    context: BsonContext,
    children: Vec<Box<dyn BsonNode>>,
    frozen: bool,
}

impl FilterQuery {
    pub fn new(context: BsonContext) -> Self {
        FilterQuery { context, children: Vec::new(), frozen: false }
    }

    pub fn context(&self) -> &BsonContext {
        &self.context
    }

    /// Adds a top-level child: a [`Predicate`], [`And`]/[`Or`], `$expr`, or
    /// bitwise mask node. Simplifies and freezes it immediately, per the
    /// base `accept` contract.
    pub fn add(&mut self, child: Box<dyn BsonNode>) -> Result<(), Error> {
        if self.frozen {
            return Err(crate::error::ErrorKind::FrozenMutation.into());
        }
        if let Some(mut simplified) = child.simplify() {
            simplified.freeze();
            self.children.push(simplified);
        }
        Ok(())
    }
}

impl BsonNode for FilterQuery {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        if self.children.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        for child in &self.children {
            child.write(writer)?;
        }
        Ok(())
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// `{ "<path>": { <body> } }` -- a path-scoped predicate. The body may hold
/// any number of operator leaves (`eq`, `in`, `elemMatch`, `all`, …), all
/// sharing the one sub-document keyed by `path`.
pub struct Predicate {
    path: Path,
    body: Vec<Box<dyn BsonNode>>,
    frozen: bool,
}

impl Predicate {
    pub fn new(path: Path) -> Self {
        Predicate { path, body: Vec::new(), frozen: false }
    }

    pub fn add(&mut self, op: Box<dyn BsonNode>) -> Result<(), Error> {
        if self.frozen {
            return Err(crate::error::ErrorKind::FrozenMutation.into());
        }
        if let Some(mut simplified) = op.simplify() {
            simplified.freeze();
            self.body.push(simplified);
        }
        Ok(())
    }
}

impl BsonNode for Predicate {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        if self.body.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        let path = self.path.to_string();
        let body = &self.body;
        writer.write_document(&path, |d| {
            for op in body {
                op.write(d)?;
            }
            Ok(())
        })
    }

    fn freeze(&mut self) {
        self.frozen = true;
        for op in &mut self.body {
            op.freeze();
        }
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

macro_rules! single_value_op {
    ($name:ident, $key:literal) => {
        pub struct $name {
            value: Value,
            frozen: bool,
        }

        impl $name {
            pub fn new(value: impl Into<Value>) -> Self {
                $name { value: value.into(), frozen: false }
            }
        }

        impl BsonNode for $name {
            fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
                Some(self)
            }

            fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
                self.value.write_field($key, writer)
            }

            fn freeze(&mut self) {
                self.frozen = true;
            }

            fn is_frozen(&self) -> bool {
                self.frozen
            }
        }
    };
}

single_value_op!(Eq, "$eq");
single_value_op!(Ne, "$ne");
single_value_op!(Gt, "$gt");
single_value_op!(Gte, "$gte");
single_value_op!(Lt, "$lt");
single_value_op!(Lte, "$lte");

macro_rules! value_list_op {
    ($name:ident, $key:literal) => {
        pub struct $name {
            values: Vec<Value>,
            frozen: bool,
        }

        impl $name {
            pub fn new(values: Vec<Value>) -> Self {
                $name { values, frozen: false }
            }
        }

        impl BsonNode for $name {
            fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
                Some(self)
            }

            fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
                let values = self.values.clone();
                writer.write_array($key, |a| {
                    for v in &values {
                        v.write_element(a)?;
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
        }
    };
}

value_list_op!(In, "$in");
value_list_op!(Nin, "$nin");
value_list_op!(All, "$all");

pub struct Exists {
    exists: bool,
    frozen: bool,
}

impl Exists {
    pub fn new(exists: bool) -> Self {
        Exists { exists, frozen: false }
    }
}

impl BsonNode for Exists {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        Some(self)
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        writer.write_boolean("$exists", self.exists);
        Ok(())
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

pub struct TypeIs {
    bson_type: BsonType,
    frozen: bool,
}

impl TypeIs {
    pub fn new(bson_type: BsonType) -> Self {
        TypeIs { bson_type, frozen: false }
    }
}

impl BsonNode for TypeIs {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        Some(self)
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        writer.write_int32("$type", self.bson_type.tag() as i32);
        Ok(())
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Regex options, built up from individual booleans and assembled in the
/// canonical alphabetical order (`i`, `m`, `s`, `x`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexOptions {
    pub case_insensitive: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub extended: bool,
}

impl RegexOptions {
    fn letters(self) -> String {
        let mut letters = String::new();
        if self.case_insensitive {
            letters.push('i');
        }
        if self.multiline {
            letters.push('m');
        }
        if self.dot_all {
            letters.push('s');
        }
        if self.extended {
            letters.push('x');
        }
        sort_options(&letters)
    }
}

pub struct MatchesRegex {
    pattern: String,
    options: RegexOptions,
    frozen: bool,
}

impl MatchesRegex {
    pub fn new(pattern: impl Into<String>, options: RegexOptions) -> Self {
        MatchesRegex { pattern: pattern.into(), options, frozen: false }
    }
}

impl BsonNode for MatchesRegex {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        Some(self)
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        writer.write_regexp("$regex", &self.pattern, &self.options.letters());
        Ok(())
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// `{"$not": { <body> }}`; an empty body simplifies away entirely.
pub struct Not {
    body: Vec<Box<dyn BsonNode>>,
    frozen: bool,
}

impl Not {
    pub fn new() -> Self {
        Not { body: Vec::new(), frozen: false }
    }

    pub fn add(&mut self, op: Box<dyn BsonNode>) -> Result<(), Error> {
        if self.frozen {
            return Err(crate::error::ErrorKind::FrozenMutation.into());
        }
        if let Some(mut simplified) = op.simplify() {
            simplified.freeze();
            self.body.push(simplified);
        }
        Ok(())
    }
}

impl Default for Not {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonNode for Not {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        if self.body.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        let body = &self.body;
        writer.write_document("$not", |d| {
            for op in body {
                op.write(d)?;
            }
            Ok(())
        })
    }

    fn freeze(&mut self) {
        self.frozen = true;
        for op in &mut self.body {
            op.freeze();
        }
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// `{"<path>": {"$elemMatch": { <sub-filter or sub-predicate> }}}`, used as
/// an operator inside a [`Predicate`] body.
pub struct ElemMatch {
    body: Vec<Box<dyn BsonNode>>,
    frozen: bool,
}

impl ElemMatch {
    pub fn new() -> Self {
        ElemMatch { body: Vec::new(), frozen: false }
    }

    pub fn add(&mut self, op: Box<dyn BsonNode>) -> Result<(), Error> {
        if self.frozen {
            return Err(crate::error::ErrorKind::FrozenMutation.into());
        }
        if let Some(mut simplified) = op.simplify() {
            simplified.freeze();
            self.body.push(simplified);
        }
        Ok(())
    }
}

impl Default for ElemMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonNode for ElemMatch {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        Some(self)
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        let body = &self.body;
        writer.write_document("$elemMatch", |d| {
            for op in body {
                op.write(d)?;
            }
            Ok(())
        })
    }

    fn freeze(&mut self) {
        self.frozen = true;
        for op in &mut self.body {
            op.freeze();
        }
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

pub struct Expr {
    expr: ValueExpr,
    frozen: bool,
}

impl Expr {
    pub fn new(expr: ValueExpr) -> Self {
        Expr { expr: expr.simplify(), frozen: false }
    }
}

impl BsonNode for Expr {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        Some(self)
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        self.expr.render().write_field("$expr", writer)
    }

    fn freeze(&mut self) {
        self.frozen = true;
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// The mask operand accepted by the four bitwise operators: either an
/// integer mask or a byte-array mask (emitted as `BinaryData` subtype 0).
#[derive(Debug, Clone, PartialEq)]
pub enum Mask {
    Int(i64),
    Bytes(Vec<u8>),
}

impl From<i64> for Mask {
    fn from(v: i64) -> Self {
        Mask::Int(v)
    }
}

impl From<Vec<u8>> for Mask {
    fn from(v: Vec<u8>) -> Self {
        Mask::Bytes(v)
    }
}

impl Mask {
    /// Builds a byte-array mask from individual bit positions, for callers
    /// that want to address specific bits rather than precompute an
    /// integer mask by hand.
    pub fn from_bit_positions(positions: &[usize]) -> Mask {
        let Some(&highest) = positions.iter().max() else {
            return Mask::Bytes(Vec::new());
        };
        let mut bits: bitvec::vec::BitVec<u8, bitvec::order::Lsb0> =
            bitvec::vec::BitVec::repeat(false, highest + 1);
        for &position in positions {
            bits.set(position, true);
        }
        Mask::Bytes(bits.into_vec())
    }
}

macro_rules! bitwise_op {
    ($name:ident, $key:literal) => {
        pub struct $name {
            mask: Mask,
            frozen: bool,
        }

        impl $name {
            pub fn new(mask: impl Into<Mask>) -> Self {
                $name { mask: mask.into(), frozen: false }
            }
        }

        impl BsonNode for $name {
            fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
                Some(self)
            }

            fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
                match &self.mask {
                    Mask::Int(n) => writer.write_int64($key, *n),
                    Mask::Bytes(bytes) => writer.write_binary_data(
                        $key,
                        &Binary { subtype: BinarySubtype::Generic, bytes: bytes.clone() },
                    ),
                }
                Ok(())
            }

            fn freeze(&mut self) {
                self.frozen = true;
            }

            fn is_frozen(&self) -> bool {
                self.frozen
            }
        }
    };
}

bitwise_op!(BitsAllClear, "$bitsAllClear");
bitwise_op!(BitsAllSet, "$bitsAllSet");
bitwise_op!(BitsAnyClear, "$bitsAnyClear");
bitwise_op!(BitsAnySet, "$bitsAnySet");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogicalKind {
    And,
    Or,
}

/// `$and`/`$or`: a list of child predicate documents. Empty simplifies
/// away; a single child unwraps to that child. Only `$and` flattens
/// nested `$and` operands into itself; `$or` does not flatten nested `$or`.
/// Simplification is idempotent -- running it twice yields the same tree.
pub struct Logical {
    kind: LogicalKind,
    children: Vec<Box<dyn BsonNode>>,
    frozen: bool,
}

impl Logical {
    pub fn and() -> Self {
        Logical { kind: LogicalKind::And, children: Vec::new(), frozen: false }
    }

    pub fn or() -> Self {
        Logical { kind: LogicalKind::Or, children: Vec::new(), frozen: false }
    }

    pub fn add(&mut self, child: Box<dyn BsonNode>) -> Result<(), Error> {
        if self.frozen {
            return Err(crate::error::ErrorKind::FrozenMutation.into());
        }
        self.children.push(child);
        Ok(())
    }
}

impl BsonNode for Logical {
    fn simplify(self: Box<Self>) -> Option<Box<dyn BsonNode>> {
        let kind = self.kind;
        let mut flattened: Vec<Box<dyn BsonNode>> = Vec::new();
        for child in self.children {
            let Some(simplified) = child.simplify() else { continue };
            if kind == LogicalKind::And {
                match simplified.take_and_children() {
                    Ok(inner) => flattened.extend(inner),
                    Err(node) => flattened.push(node),
                }
            } else {
                flattened.push(simplified);
            }
        }
        match flattened.len() {
            0 => None,
            1 => Some(flattened.into_iter().next().expect("checked len == 1")),
            _ => Some(Box::new(Logical { kind, children: flattened, frozen: false })),
        }
    }

    fn write(&self, writer: &mut FieldWriter) -> Result<(), Error> {
        let key = match self.kind {
            LogicalKind::And => "$and",
            LogicalKind::Or => "$or",
        };
        let children = &self.children;
        writer.write_array(key, |a| {
            for child in children {
                a.open_document(|d| child.write(d))?;
            }
            Ok(())
        })
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

    fn take_and_children(self: Box<Self>) -> Result<Vec<Box<dyn BsonNode>>, Box<dyn BsonNode>> {
        if self.kind == LogicalKind::And {
            Ok(self.children)
        } else {
            Err(self)
        }
    }
}
