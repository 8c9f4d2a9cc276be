//! Integration tests for the match validators: booking-status gates, scope
//! rules, and uniqueness translation for both match kinds.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;
use stagedoor_core::error::CoreError;
use stagedoor_core::matching::DmAssignment;
use stagedoor_db::models::booking::ConfirmBooking;
use stagedoor_db::models::matches::{
    CreateCharacterClientMatch, CreateCharacterDmMatch, UpdateCharacterClientMatch,
    UpdateCharacterDmMatch,
};
use stagedoor_db::repositories::{BookingRepo, CharacterClientMatchRepo, CharacterDmMatchRepo};

use common::*;

// ---------------------------------------------------------------------------
// Booking-status gate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn matches_are_frozen_once_confirmed(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "frozen").await;
    let existing = CharacterClientMatchRepo::list(&pool, fixture.store_id, fixture.booking_id)
        .await
        .unwrap();
    BookingRepo::confirm(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap();

    let err = CharacterClientMatchRepo::delete(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        existing[0].character_client_match_id,
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("incomplete"));

    let dm_id = seed_dm(&pool, "Gate DM").await;
    let err = CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id,
            character_id: None,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("incomplete"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn match_on_missing_booking_is_not_found(pool: PgPool) {
    let store_id = seed_store(&pool, "No booking").await;
    let err = CharacterClientMatchRepo::create(
        &pool,
        store_id,
        9999,
        &CreateCharacterClientMatch {
            character_id: 1,
            client_id: 1,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Booking", .. });
}

// ---------------------------------------------------------------------------
// Character-client scope rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_match_rejects_dm_only_character(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "dm-only").await;
    let dm_character = seed_character(&pool, fixture.script_id, "Narrator", true).await;

    let err = CharacterClientMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterClientMatch {
            character_id: dm_character,
            client_id: fixture.client_ids[0],
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("DM-only"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_match_rejects_character_from_other_script(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "foreign-char").await;
    let other_script = seed_script(&pool, "Other script", 60).await;
    let foreign = seed_character(&pool, other_script, "Stranger", false).await;

    let err = CharacterClientMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterClientMatch {
            character_id: foreign,
            client_id: fixture.client_ids[0],
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("script"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_match_requires_linked_client(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "unlinked").await;
    let outsider = seed_client(&pool, "Outsider").await;
    let spare = seed_character(&pool, fixture.script_id, "Spare", false).await;

    let err = CharacterClientMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterClientMatch {
            character_id: spare,
            client_id: outsider,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("linked"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_character_is_not_found(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "ghost-char").await;
    let err = CharacterClientMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterClientMatch {
            character_id: 9999,
            client_id: fixture.client_ids[0],
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Character", .. });
}

// ---------------------------------------------------------------------------
// Character-client uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_character_or_client_match_is_conflict(pool: PgPool) {
    // The fixture already matches both characters to both clients.
    let fixture = confirmable_booking(&pool, "dup-match").await;
    let err = CharacterClientMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterClientMatch {
            character_id: fixture.character_ids[0],
            client_id: fixture.client_ids[1],
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("character"));

    let spare = seed_character(&pool, fixture.script_id, "Understudy", false).await;
    let err = CharacterClientMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterClientMatch {
            character_id: spare,
            client_id: fixture.client_ids[1],
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("client"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_match_translates_uniqueness_and_missing_rows(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "update-match").await;
    let rows = CharacterClientMatchRepo::list(&pool, fixture.store_id, fixture.booking_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    // Point the first match at the second match's client.
    let err = CharacterClientMatchRepo::update(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        rows[0].character_client_match_id,
        &UpdateCharacterClientMatch {
            character_id: None,
            client_id: Some(rows[1].client_id),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    let err = CharacterClientMatchRepo::update(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        9999,
        &UpdateCharacterClientMatch {
            character_id: None,
            client_id: Some(rows[1].client_id),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_match_missing_is_not_found(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "delete-match").await;
    let err =
        CharacterClientMatchRepo::delete(&pool, fixture.store_id, fixture.booking_id, 9999)
            .await
            .unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}

// ---------------------------------------------------------------------------
// Character-DM matches
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn dm_may_hold_one_unassigned_seat_but_many_characters(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "dm-seats").await;
    let dm_id = seed_dm(&pool, "Seat DM").await;
    let narrator = seed_character(&pool, fixture.script_id, "Narrator", true).await;
    let keeper = seed_character(&pool, fixture.script_id, "Keeper", true).await;

    // Two distinct characters for the same DM: allowed.
    for character_id in [narrator, keeper] {
        CharacterDmMatchRepo::create(
            &pool,
            fixture.store_id,
            fixture.booking_id,
            &CreateCharacterDmMatch {
                dm_id,
                character_id: Some(character_id),
            },
        )
        .await
        .unwrap();
    }

    // One unassigned seat: allowed once.
    let seat = CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id,
            character_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(seat.assignment(), DmAssignment::Unassigned);

    let err = CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id,
            character_id: None,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("unassigned"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn character_takes_at_most_one_dm(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "dm-per-char").await;
    let narrator = seed_character(&pool, fixture.script_id, "Narrator", true).await;
    let first_dm = seed_dm(&pool, "First DM").await;
    let second_dm = seed_dm(&pool, "Second DM").await;

    CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id: first_dm,
            character_id: Some(narrator),
        },
    )
    .await
    .unwrap();

    let err = CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id: second_dm,
            character_id: Some(narrator),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("DM"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dm_match_rejects_non_dm_character(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "non-dm-char").await;
    let dm_id = seed_dm(&pool, "Strict DM").await;

    let err = CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id,
            character_id: Some(fixture.character_ids[0]),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("not DM-only"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_dm_is_not_found(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "ghost-dm").await;
    let err = CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id: 9999,
            character_id: None,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "DM", .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clear_character_releases_the_seat(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "clear-seat").await;
    let dm_id = seed_dm(&pool, "Clear DM").await;
    let narrator = seed_character(&pool, fixture.script_id, "Narrator", true).await;

    let row = CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id,
            character_id: Some(narrator),
        },
    )
    .await
    .unwrap();
    assert_eq!(row.assignment(), DmAssignment::Character(narrator));

    let cleared = CharacterDmMatchRepo::update(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        row.character_dm_match_id,
        &UpdateCharacterDmMatch {
            dm_id: None,
            character_id: None,
            clear_character: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.assignment(), DmAssignment::Unassigned);

    // The character is free again for another DM.
    let other_dm = seed_dm(&pool, "Replacement DM").await;
    CharacterDmMatchRepo::create(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &CreateCharacterDmMatch {
            dm_id: other_dm,
            character_id: Some(narrator),
        },
    )
    .await
    .unwrap();
}
