//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` structs matching the entity and version rows
//! - A `Deserialize` create DTO for inserts
//! - A `New*Version` copy-on-write DTO enumerating exactly the content
//!   columns that carry over into a fresh version
//! - A `*WithVersion` composite flattening an entity and one of its versions

pub mod decision_dataset;
pub mod organisation;
pub mod profession;
pub mod user;
