//! Pure domain logic for the professions register.
//!
//! No I/O lives here: the version lifecycle state machine, role and
//! permission tables, slug generation, and the field validation behind the
//! confirm step. Persistence belongs to `register-db`.

pub mod error;
pub mod permissions;
pub mod roles;
pub mod slug;
pub mod status;
pub mod types;
pub mod validation;
