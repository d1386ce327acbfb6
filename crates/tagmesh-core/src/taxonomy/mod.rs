mod family;
mod validate;

pub use family::{Cardinality, TagFamily};
pub use validate::{TagParts, parse_tag, validate_tags};
