//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod cattle;
pub mod checkup;
pub mod employee;
pub mod feed;
pub mod milk;
pub mod role;
pub mod session;
pub mod vaccination;
