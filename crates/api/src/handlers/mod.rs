//! HTTP handlers, one module per resource.

pub mod bookings;
pub mod health;
pub mod matches;
pub mod rooms;
pub mod script_characters;
pub mod scripts;
pub mod slots;
pub mod store_scripts;
