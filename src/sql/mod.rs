//! Safe SQL builder: parameterized queries only; identifiers from the static schema.

mod builder;
mod params;

pub use builder::{delete, insert, select_by_id, select_list, update, QueryBuf};
