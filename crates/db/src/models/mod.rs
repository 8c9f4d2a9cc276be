//! Model structs and DTOs, one module per table.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the operations that mutate it

pub mod booking;
pub mod client;
pub mod dm;
pub mod matches;
pub mod room;
pub mod script;
pub mod script_character;
pub mod slot;
pub mod status;
pub mod store;
