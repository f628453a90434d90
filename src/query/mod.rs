//! The query layer: filter predicates, update operators, the shared BSON
//! value payload, and the aggregation value sub-DSL they both embed.

pub mod filter;
pub mod update;
pub mod value;
pub mod value_expr;

pub use filter::{
    All, BitsAllClear, BitsAllSet, BitsAnyClear, BitsAnySet, ElemMatch, Eq, Exists, Expr,
    FilterQuery, Gt, Gte, In, Logical, Lt, Lte, Mask, MatchesRegex, Ne, Nin, Not, Predicate,
    RegexOptions, TypeIs,
};
pub use update::{CurrentDateKind, Operator, UpdateQuery};
pub use value::Value;
pub use value_expr::ValueExpr;
