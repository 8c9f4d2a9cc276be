//! Shared seeding helpers for repository integration tests.
//!
//! Stores, people, and the script catalog are provisioned by the
//! surrounding platform in production, so tests seed those tables
//! directly and drive everything else through the repositories.

use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;
use stagedoor_core::types::{DbId, Timestamp};
use stagedoor_db::models::booking::CreateIncompleteBooking;
use stagedoor_db::models::matches::CreateCharacterClientMatch;
use stagedoor_db::repositories::{BookingRepo, CharacterClientMatchRepo};

pub async fn seed_store(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO store (name) VALUES ($1) RETURNING store_id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_room(pool: &PgPool, store_id: DbId, name: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO store_room (store_id, name) VALUES ($1, $2) RETURNING store_room_id",
    )
    .bind(store_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_client(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO client (display_name) VALUES ($1) RETURNING client_id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_dm(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO dm (display_name) VALUES ($1) RETURNING dm_id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_script(pool: &PgPool, name: &str, estimated_minutes: i32) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO script (name, estimated_minutes) VALUES ($1, $2) RETURNING script_id",
    )
    .bind(name)
    .bind(estimated_minutes)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn activate_script(pool: &PgPool, store_id: DbId, script_id: DbId, is_active: bool) {
    sqlx::query("INSERT INTO store_script (store_id, script_id, is_active) VALUES ($1, $2, $3)")
        .bind(store_id)
        .bind(script_id)
        .bind(is_active)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn seed_character(pool: &PgPool, script_id: DbId, name: &str, is_dm: bool) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO script_character (script_id, character_name, is_dm) \
         VALUES ($1, $2, $3) RETURNING character_id",
    )
    .bind(script_id)
    .bind(name)
    .bind(is_dm)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

pub fn at(hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2026, 4, 1, hour, minute, 0).unwrap()
}

/// A store with two rooms, an active two-player script, two clients, and a
/// booking whose matches already satisfy the bijection — one `confirm`
/// call away from scheduled.
pub struct ConfirmableBooking {
    pub store_id: DbId,
    pub room_ids: Vec<DbId>,
    pub script_id: DbId,
    pub character_ids: Vec<DbId>,
    pub client_ids: Vec<DbId>,
    pub booking_id: DbId,
}

pub async fn confirmable_booking(pool: &PgPool, tag: &str) -> ConfirmableBooking {
    let store_id = seed_store(pool, &format!("Store {tag}")).await;
    let room_a = seed_room(pool, store_id, &format!("Room A {tag}")).await;
    let room_b = seed_room(pool, store_id, &format!("Room B {tag}")).await;
    let script_id = seed_script(pool, &format!("Script {tag}"), 120).await;
    activate_script(pool, store_id, script_id, true).await;
    let char_one = seed_character(pool, script_id, "Heir", false).await;
    let char_two = seed_character(pool, script_id, "Butler", false).await;
    let client_one = seed_client(pool, &format!("Client One {tag}")).await;
    let client_two = seed_client(pool, &format!("Client Two {tag}")).await;

    let booking = BookingRepo::create_incomplete(
        pool,
        store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: vec![client_one, client_two],
            script_id: Some(script_id),
        },
    )
    .await
    .unwrap();

    for (character_id, client_id) in [(char_one, client_one), (char_two, client_two)] {
        CharacterClientMatchRepo::create(
            pool,
            store_id,
            booking.booking_id,
            &CreateCharacterClientMatch {
                character_id,
                client_id,
            },
        )
        .await
        .unwrap();
    }

    ConfirmableBooking {
        store_id,
        room_ids: vec![room_a, room_b],
        script_id,
        character_ids: vec![char_one, char_two],
        client_ids: vec![client_one, client_two],
        booking_id: booking.booking_id,
    }
}
