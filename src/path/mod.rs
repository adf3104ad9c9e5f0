//! Path expressions - parse and evaluate field-access strings
//!
//! ```text
//! path    := segment ("." segment)*
//! segment := name ("[" (index | key | "*") "]")*
//! ```

pub mod expression;
pub mod resolver;

pub use expression::{PathExpression, Segment};
pub use resolver::{
    value_kind, value_to_text, FieldAccessor, JsonFieldAccessor, PathResolver, ResolveOptions,
};
