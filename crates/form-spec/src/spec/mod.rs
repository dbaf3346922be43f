pub mod field;
pub mod form;

pub use field::{Constraint, FieldDefinition, FieldType, REGION_CODES, VisibilityClause};
pub use form::{FormSpec, SchemaError};
