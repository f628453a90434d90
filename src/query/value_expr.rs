//! The aggregation value sub-DSL: string operators plugged into filters
//! via `$expr`. Unlike the filter/update DSLs, a `ValueExpr` does not emit
//! named fields of its own -- it renders to a single [`Value`] that the
//! caller embeds wherever a value is expected (typically under `$expr`).

use crate::path::Path;
use crate::query::value::Value;

/// One node of the aggregation value expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// A `"$path.to.field"` reference into the document being evaluated.
    FieldPath(Path),
    /// A literal value, embedded as-is.
    Literal(Value),
    Trim { input: Box<ValueExpr>, chars: Option<Box<ValueExpr>> },
    LTrim { input: Box<ValueExpr>, chars: Option<Box<ValueExpr>> },
    RTrim { input: Box<ValueExpr>, chars: Option<Box<ValueExpr>> },
    ToLower(Box<ValueExpr>),
    ToUpper(Box<ValueExpr>),
    StrLenCP(Box<ValueExpr>),
    StrLenBytes(Box<ValueExpr>),
    SubstrCP { input: Box<ValueExpr>, start: Box<ValueExpr>, length: Box<ValueExpr> },
    SubstrBytes { input: Box<ValueExpr>, start: Box<ValueExpr>, length: Box<ValueExpr> },
    Split { input: Box<ValueExpr>, delimiter: Box<ValueExpr> },
    ReplaceOne { input: Box<ValueExpr>, find: Box<ValueExpr>, replacement: Box<ValueExpr> },
    ReplaceAll { input: Box<ValueExpr>, find: Box<ValueExpr>, replacement: Box<ValueExpr> },
    Concat(Vec<ValueExpr>),
}

impl ValueExpr {
    pub fn field(path: Path) -> Self {
        ValueExpr::FieldPath(path)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        ValueExpr::Literal(value.into())
    }

    pub fn to_lower(self) -> Self {
        ValueExpr::ToLower(Box::new(self))
    }

    pub fn to_upper(self) -> Self {
        ValueExpr::ToUpper(Box::new(self))
    }

    pub fn trim(self, chars: Option<ValueExpr>) -> Self {
        ValueExpr::Trim { input: Box::new(self), chars: chars.map(Box::new) }
    }

    pub fn ltrim(self, chars: Option<ValueExpr>) -> Self {
        ValueExpr::LTrim { input: Box::new(self), chars: chars.map(Box::new) }
    }

    pub fn rtrim(self, chars: Option<ValueExpr>) -> Self {
        ValueExpr::RTrim { input: Box::new(self), chars: chars.map(Box::new) }
    }

    pub fn str_len_cp(self) -> Self {
        ValueExpr::StrLenCP(Box::new(self))
    }

    pub fn str_len_bytes(self) -> Self {
        ValueExpr::StrLenBytes(Box::new(self))
    }

    pub fn substr_cp(self, start: ValueExpr, length: ValueExpr) -> Self {
        ValueExpr::SubstrCP { input: Box::new(self), start: Box::new(start), length: Box::new(length) }
    }

    pub fn substr_bytes(self, start: ValueExpr, length: ValueExpr) -> Self {
        ValueExpr::SubstrBytes { input: Box::new(self), start: Box::new(start), length: Box::new(length) }
    }

    pub fn split(self, delimiter: ValueExpr) -> Self {
        ValueExpr::Split { input: Box::new(self), delimiter: Box::new(delimiter) }
    }

    pub fn replace_one(self, find: ValueExpr, replacement: ValueExpr) -> Self {
        ValueExpr::ReplaceOne { input: Box::new(self), find: Box::new(find), replacement: Box::new(replacement) }
    }

    pub fn replace_all(self, find: ValueExpr, replacement: ValueExpr) -> Self {
        ValueExpr::ReplaceAll { input: Box::new(self), find: Box::new(find), replacement: Box::new(replacement) }
    }

    pub fn concat(items: Vec<ValueExpr>) -> Self {
        ValueExpr::Concat(items)
    }

    /// Flattens nested `$concat` operands into their parent. Every other
    /// node is left as-is: this sub-DSL has no other reducible shape.
    pub fn simplify(self) -> ValueExpr {
        match self {
            ValueExpr::Concat(items) => {
                let flattened = items
                    .into_iter()
                    .map(ValueExpr::simplify)
                    .flat_map(|item| match item {
                        ValueExpr::Concat(inner) => inner,
                        other => vec![other],
                    })
                    .collect();
                ValueExpr::Concat(flattened)
            }
            other => other,
        }
    }

    /// Renders this expression tree down to a single [`Value`], ready to
    /// be written as a field (typically `$expr`'s payload).
    pub fn render(&self) -> Value {
        match self {
            ValueExpr::FieldPath(path) => Value::String(format!("${path}")),
            ValueExpr::Literal(value) => value.clone(),
            ValueExpr::ToLower(e) => unary("$toLower", e),
            ValueExpr::ToUpper(e) => unary("$toUpper", e),
            ValueExpr::StrLenCP(e) => unary("$strLenCP", e),
            ValueExpr::StrLenBytes(e) => unary("$strLenBytes", e),
            ValueExpr::Trim { input, chars } => trim_like("$trim", input, chars),
            ValueExpr::LTrim { input, chars } => trim_like("$ltrim", input, chars),
            ValueExpr::RTrim { input, chars } => trim_like("$rtrim", input, chars),
            ValueExpr::SubstrCP { input, start, length } => {
                array_op("$substrCP", [input, start, length])
            }
            ValueExpr::SubstrBytes { input, start, length } => {
                array_op("$substrBytes", [input, start, length])
            }
            ValueExpr::Split { input, delimiter } => array_op("$split", [input, delimiter]),
            ValueExpr::ReplaceOne { input, find, replacement } => {
                replace_like("$replaceOne", input, find, replacement)
            }
            ValueExpr::ReplaceAll { input, find, replacement } => {
                replace_like("$replaceAll", input, find, replacement)
            }
            ValueExpr::Concat(items) => Value::Document(vec![(
                "$concat".to_string(),
                Value::Array(items.iter().map(ValueExpr::render).collect()),
            )]),
        }
    }
}

fn unary(op: &str, e: &ValueExpr) -> Value {
    Value::Document(vec![(op.to_string(), e.render())])
}

fn array_op<'a>(op: &str, operands: impl IntoIterator<Item = &'a Box<ValueExpr>>) -> Value {
    let rendered = operands.into_iter().map(|e| e.render()).collect();
    Value::Document(vec![(op.to_string(), Value::Array(rendered))])
}

fn trim_like(op: &str, input: &ValueExpr, chars: &Option<Box<ValueExpr>>) -> Value {
    let mut fields = vec![("input".to_string(), input.render())];
    if let Some(c) = chars {
        fields.push(("chars".to_string(), c.render()));
    }
    Value::Document(vec![(op.to_string(), Value::Document(fields))])
}

fn replace_like(op: &str, input: &ValueExpr, find: &ValueExpr, replacement: &ValueExpr) -> Value {
    Value::Document(vec![(
        op.to_string(),
        Value::Document(vec![
            ("input".to_string(), input.render()),
            ("find".to_string(), find.render()),
            ("replacement".to_string(), replacement.render()),
        ]),
    )])
}
