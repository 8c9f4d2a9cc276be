//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Helpers that must run inside a
//! caller's transaction accept `impl PgExecutor` or `&mut PgConnection`
//! instead. Repositories implementing multi-step domain operations return
//! `CoreError`; plain probes return `sqlx::Error` and are wrapped by their
//! callers.

pub mod booking_repo;
pub mod client_repo;
pub mod conflict_repo;
pub mod dm_repo;
pub mod match_repo;
pub mod room_allocator;
pub mod room_repo;
pub mod script_character_repo;
pub mod script_repo;
pub mod slot_repo;
pub mod store_repo;
pub mod store_script_repo;

pub use booking_repo::BookingRepo;
pub use client_repo::ClientRepo;
pub use conflict_repo::ConflictRepo;
pub use dm_repo::DmRepo;
pub use match_repo::{CharacterClientMatchRepo, CharacterDmMatchRepo};
pub use room_allocator::RoomAllocator;
pub use room_repo::RoomRepo;
pub use script_character_repo::ScriptCharacterRepo;
pub use script_repo::ScriptRepo;
pub use slot_repo::SlotRepo;
pub use store_repo::StoreRepo;
pub use store_script_repo::StoreScriptRepo;

/// Default page size for list queries.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for list queries.
const MAX_LIMIT: i64 = 100;

/// Clamp a requested page size to `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
