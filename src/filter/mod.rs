//! Dynamic filtering: `{Property, Operator, Value}` criteria applied to any
//! [`Filterable`](crate::schema::Filterable) entity type.
//!
//! All criteria combine with AND. Evaluation of one entity stops at the first
//! criterion that does not hold; beyond that, no evaluation order is promised.

mod criterion;
mod engine;
mod operator;

pub use criterion::{parse_criteria, Criterion};
pub use engine::{apply, Filter, Filtered, Predicate};
pub use operator::Operator;
