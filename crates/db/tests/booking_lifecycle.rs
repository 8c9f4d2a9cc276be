//! Integration tests for the booking lifecycle state machine.
//!
//! Exercises the full repository layer against a real database: incomplete
//! creation, conditional transitions, room allocation, slot deduplication,
//! the confirmation bijection, and the conflict view.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;
use stagedoor_core::error::CoreError;
use stagedoor_db::models::booking::{
    AddBookingClient, BookingListQuery, ConfirmBooking, CreateIncompleteBooking,
    UpdateIncompleteBooking,
};
use stagedoor_db::models::status::BookingStatus;
use stagedoor_db::repositories::BookingRepo;

use common::*;

// ---------------------------------------------------------------------------
// create_incomplete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_incomplete_links_clients(pool: PgPool) {
    let store_id = seed_store(&pool, "Create").await;
    let client_a = seed_client(&pool, "Ann").await;
    let client_b = seed_client(&pool, "Ben").await;

    let booking = BookingRepo::create_incomplete(
        &pool,
        store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: vec![client_a, client_b],
            script_id: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(booking.booking_status_id, BookingStatus::Incomplete.id());
    assert_eq!(booking.target_month, Some(month(2026, 4)));
    assert_eq!(booking.client_ids, vec![client_a, client_b]);
    assert!(booking.start_at.is_none());
    assert!(booking.store_room_id.is_none());
    assert!(!booking.has_conflict);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_incomplete_missing_client_is_not_found(pool: PgPool) {
    let store_id = seed_store(&pool, "Missing client").await;

    let err = BookingRepo::create_incomplete(
        &pool,
        store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: vec![9999],
            script_id: None,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::NotFound { entity: "Client", .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_incomplete_inactive_script_is_not_found(pool: PgPool) {
    let store_id = seed_store(&pool, "Inactive script").await;
    let client_id = seed_client(&pool, "Cara").await;
    let script_id = seed_script(&pool, "Dormant", 90).await;
    activate_script(&pool, store_id, script_id, false).await;

    let err = BookingRepo::create_incomplete(
        &pool,
        store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: vec![client_id],
            script_id: Some(script_id),
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::NotFound { entity: "Script", .. });
}

// ---------------------------------------------------------------------------
// update_incomplete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_incomplete_rejects_clear_script_with_script_id(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "clear-vs-set").await;

    let err = BookingRepo::update_incomplete(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &UpdateIncompleteBooking {
            target_month: None,
            script_id: Some(fixture.script_id),
            clear_script: true,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_incomplete_can_clear_script(pool: PgPool) {
    let store_id = seed_store(&pool, "Clear script").await;
    let client_id = seed_client(&pool, "Dee").await;
    let script_id = seed_script(&pool, "Clearable", 60).await;
    activate_script(&pool, store_id, script_id, true).await;

    let booking = BookingRepo::create_incomplete(
        &pool,
        store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: vec![client_id],
            script_id: Some(script_id),
        },
    )
    .await
    .unwrap();

    let updated = BookingRepo::update_incomplete(
        &pool,
        store_id,
        booking.booking_id,
        &UpdateIncompleteBooking {
            target_month: Some(month(2026, 5)),
            script_id: None,
            clear_script: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.script_id, None);
    assert_eq!(updated.target_month, Some(month(2026, 5)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_incomplete_on_scheduled_is_conflict(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "update-after-confirm").await;
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

    let err = BookingRepo::update_incomplete(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &UpdateIncompleteBooking {
            target_month: Some(month(2026, 5)),
            script_id: None,
            clear_script: false,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::Conflict(_));
}

// ---------------------------------------------------------------------------
// confirm
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_assigns_lowest_free_room_and_derives_end(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "happy").await;

    let confirmed = BookingRepo::confirm(
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

    assert_eq!(confirmed.booking_status_id, BookingStatus::Scheduled.id());
    assert_eq!(confirmed.store_room_id, Some(fixture.room_ids[0]));
    assert_eq!(confirmed.start_at, Some(at(10, 0)));
    // 120-minute script estimate.
    assert_eq!(confirmed.end_at, Some(at(12, 0)));
    assert!(confirmed.slot_id.is_some());
    assert_eq!(confirmed.target_month, None);
    assert!(!confirmed.has_conflict);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_skips_occupied_preferred_room(pool: PgPool) {
    let first = confirmable_booking(&pool, "first").await;
    let room_a = first.room_ids[0];
    let room_b = first.room_ids[1];
    BookingRepo::confirm(
        &pool,
        first.store_id,
        first.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: Some(room_a),
        },
    )
    .await
    .unwrap();

    // Second booking in the same store wants the occupied room.
    let second_clients = vec![
        seed_client(&pool, "Eve").await,
        seed_client(&pool, "Finn").await,
    ];
    let second = BookingRepo::create_incomplete(
        &pool,
        first.store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: second_clients.clone(),
            script_id: Some(first.script_id),
        },
    )
    .await
    .unwrap();
    for (character_id, client_id) in fixture_pairs(&first.character_ids, &second_clients) {
        stagedoor_db::repositories::CharacterClientMatchRepo::create(
            &pool,
            first.store_id,
            second.booking_id,
            &stagedoor_db::models::matches::CreateCharacterClientMatch {
                character_id,
                client_id,
            },
        )
        .await
        .unwrap();
    }

    let confirmed = BookingRepo::confirm(
        &pool,
        first.store_id,
        second.booking_id,
        &ConfirmBooking {
            start_at: at(11, 0),
            preferred_room_id: Some(room_a),
        },
    )
    .await
    .unwrap();

    assert_eq!(confirmed.store_room_id, Some(room_b));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_unknown_preferred_room_is_not_found(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "bad-room").await;

    let err = BookingRepo::confirm(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: Some(9999),
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::NotFound { entity: "Room", .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_when_every_room_is_occupied_is_conflict(pool: PgPool) {
    let first = confirmable_booking(&pool, "crowded").await;
    // Occupy both rooms for the same window.
    BookingRepo::confirm(
        &pool,
        first.store_id,
        first.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap();

    let more_clients = vec![
        seed_client(&pool, "Gil").await,
        seed_client(&pool, "Hana").await,
    ];
    let second = seeded_sibling(&pool, &first, &more_clients).await;
    BookingRepo::confirm(
        &pool,
        first.store_id,
        second,
        &ConfirmBooking {
            start_at: at(10, 30),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap();

    let last_clients = vec![
        seed_client(&pool, "Iris").await,
        seed_client(&pool, "Jack").await,
    ];
    let third = seeded_sibling(&pool, &first, &last_clients).await;
    let err = BookingRepo::confirm(
        &pool,
        first.store_id,
        third,
        &ConfirmBooking {
            start_at: at(11, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn back_to_back_windows_share_a_room(pool: PgPool) {
    let first = confirmable_booking(&pool, "backtoback").await;
    let room_a = first.room_ids[0];
    let confirmed = BookingRepo::confirm(
        &pool,
        first.store_id,
        first.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: Some(room_a),
        },
    )
    .await
    .unwrap();
    assert_eq!(confirmed.end_at, Some(at(12, 0)));

    let clients = vec![
        seed_client(&pool, "Kay").await,
        seed_client(&pool, "Lee").await,
    ];
    let second = seeded_sibling(&pool, &first, &clients).await;
    // Starts exactly when the first ends: no conflict, same room is fine.
    let confirmed = BookingRepo::confirm(
        &pool,
        first.store_id,
        second,
        &ConfirmBooking {
            start_at: at(12, 0),
            preferred_room_id: Some(room_a),
        },
    )
    .await
    .unwrap();

    assert_eq!(confirmed.store_room_id, Some(room_a));
    assert!(!confirmed.has_conflict);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_requires_bijection(pool: PgPool) {
    let store_id = seed_store(&pool, "No matches").await;
    seed_room(&pool, store_id, "Only room").await;
    let script_id = seed_script(&pool, "Unmatched", 60).await;
    activate_script(&pool, store_id, script_id, true).await;
    seed_character(&pool, script_id, "Solo", false).await;
    let client_id = seed_client(&pool, "Mia").await;

    let booking = BookingRepo::create_incomplete(
        &pool,
        store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: vec![client_id],
            script_id: Some(script_id),
        },
    )
    .await
    .unwrap();

    let err = BookingRepo::confirm(
        &pool,
        store_id,
        booking.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("bijection"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_requires_matching_client_count(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "extra-client").await;
    let extra = seed_client(&pool, "Nell").await;
    BookingRepo::add_client(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &AddBookingClient { client_id: extra },
    )
    .await
    .unwrap();

    let err = BookingRepo::confirm(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_without_script_is_conflict(pool: PgPool) {
    let store_id = seed_store(&pool, "Scriptless").await;
    seed_room(&pool, store_id, "Room").await;
    let client_id = seed_client(&pool, "Omar").await;

    let booking = BookingRepo::create_incomplete(
        &pool,
        store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: vec![client_id],
            script_id: None,
        },
    )
    .await
    .unwrap();

    let err = BookingRepo::confirm(
        &pool,
        store_id,
        booking.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::Conflict(msg) if msg.contains("script"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirm_uses_duration_override(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "override").await;
    sqlx::query("UPDATE booking SET duration_override_minutes = 45 WHERE booking_id = $1")
        .bind(fixture.booking_id)
        .execute(&pool)
        .await
        .unwrap();

    let confirmed = BookingRepo::confirm(
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

    assert_eq!(confirmed.end_at, Some(at(10, 45)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bookings_at_the_same_instant_share_a_slot(pool: PgPool) {
    let first = confirmable_booking(&pool, "slot-share").await;
    let a = BookingRepo::confirm(
        &pool,
        first.store_id,
        first.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap();

    let clients = vec![
        seed_client(&pool, "Pia").await,
        seed_client(&pool, "Quinn").await,
    ];
    let second = seeded_sibling(&pool, &first, &clients).await;
    let b = BookingRepo::confirm(
        &pool,
        first.store_id,
        second,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(a.slot_id, b.slot_id);
    assert_ne!(a.store_room_id, b.store_room_id);
}

// ---------------------------------------------------------------------------
// cancel / complete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancel_preserves_schedule_shape(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "cancel").await;
    let confirmed = BookingRepo::confirm(
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

    let cancelled = BookingRepo::cancel(&pool, fixture.store_id, fixture.booking_id)
        .await
        .unwrap();

    assert_eq!(cancelled.booking_status_id, BookingStatus::Cancelled.id());
    assert_eq!(cancelled.start_at, confirmed.start_at);
    assert_eq!(cancelled.store_room_id, confirmed.store_room_id);
    assert_eq!(cancelled.slot_id, confirmed.slot_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancel_missing_booking_is_not_found(pool: PgPool) {
    let store_id = seed_store(&pool, "Cancel missing").await;
    let err = BookingRepo::cancel(&pool, store_id, 9999).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Booking", .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_requires_scheduled(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "early-complete").await;

    let err = BookingRepo::complete(&pool, fixture.store_id, fixture.booking_id)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));

    let err = BookingRepo::complete(&pool, fixture.store_id, 9999)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "Booking", .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn complete_from_scheduled(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "complete").await;
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

    let completed = BookingRepo::complete(&pool, fixture.store_id, fixture.booking_id)
        .await
        .unwrap();
    assert_eq!(completed.booking_status_id, BookingStatus::Completed.id());
    assert!(completed.start_at.is_some());
}

// ---------------------------------------------------------------------------
// client links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn add_client_duplicate_is_conflict(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "dup-client").await;
    let err = BookingRepo::add_client(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        &AddBookingClient {
            client_id: fixture.client_ids[0],
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn remove_client_keeps_at_least_one(pool: PgPool) {
    let store_id = seed_store(&pool, "Min clients").await;
    let client_id = seed_client(&pool, "Rhea").await;
    let booking = BookingRepo::create_incomplete(
        &pool,
        store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: vec![client_id],
            script_id: None,
        },
    )
    .await
    .unwrap();

    let err = BookingRepo::remove_client(&pool, store_id, booking.booking_id, client_id)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn remove_client_leaves_the_rest(pool: PgPool) {
    let fixture = confirmable_booking(&pool, "remove-client").await;
    let detail = BookingRepo::remove_client(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        fixture.client_ids[1],
    )
    .await
    .unwrap();
    assert_eq!(detail.client_ids, vec![fixture.client_ids[0]]);

    let err = BookingRepo::remove_client(
        &pool,
        fixture.store_id,
        fixture.booking_id,
        fixture.client_ids[1],
    )
    .await
    .unwrap_err();
    assert_matches!(err, CoreError::Conflict(_));
}

// ---------------------------------------------------------------------------
// list + conflict view
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_conflict_flag(pool: PgPool) {
    let first = confirmable_booking(&pool, "conflict-view").await;
    let room_a = first.room_ids[0];
    BookingRepo::confirm(
        &pool,
        first.store_id,
        first.booking_id,
        &ConfirmBooking {
            start_at: at(10, 0),
            preferred_room_id: Some(room_a),
        },
    )
    .await
    .unwrap();

    let clients = vec![
        seed_client(&pool, "Sol").await,
        seed_client(&pool, "Tess").await,
    ];
    let second = seeded_sibling(&pool, &first, &clients).await;
    BookingRepo::confirm(
        &pool,
        first.store_id,
        second,
        &ConfirmBooking {
            start_at: at(11, 0),
            preferred_room_id: None,
        },
    )
    .await
    .unwrap();

    // The allocator kept the rooms apart; force an overlap to exercise the
    // detector.
    sqlx::query("UPDATE booking SET store_room_id = $1 WHERE booking_id = $2")
        .bind(room_a)
        .bind(second)
        .execute(&pool)
        .await
        .unwrap();

    let (conflicted, total) = BookingRepo::list(
        &pool,
        first.store_id,
        &BookingListQuery {
            booking_status_id: None,
            target_month: None,
            has_conflict: Some(true),
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(total, 2);
    let ids: Vec<_> = conflicted.iter().map(|b| b.booking_id).collect();
    assert!(ids.contains(&first.booking_id));
    assert!(ids.contains(&second));

    let detail = BookingRepo::find_detail(&pool, first.store_id, first.booking_id)
        .await
        .unwrap();
    assert!(detail.has_conflict);
    assert_eq!(detail.conflict_count, 1);
    assert_eq!(detail.conflict_booking_ids, vec![second]);

    let (clear, _) = BookingRepo::list(
        &pool,
        first.store_id,
        &BookingListQuery {
            booking_status_id: None,
            target_month: None,
            has_conflict: Some(false),
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert!(clear.iter().all(|b| !b.has_conflict));
    assert!(!clear.iter().any(|b| b.booking_id == first.booking_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_status_and_month(pool: PgPool) {
    let store_id = seed_store(&pool, "List filters").await;
    let client_id = seed_client(&pool, "Uma").await;
    for m in [4, 5] {
        BookingRepo::create_incomplete(
            &pool,
            store_id,
            &CreateIncompleteBooking {
                target_month: month(2026, m),
                client_ids: vec![client_id],
                script_id: None,
            },
        )
        .await
        .unwrap();
    }

    let (items, total) = BookingRepo::list(
        &pool,
        store_id,
        &BookingListQuery {
            booking_status_id: Some(BookingStatus::Incomplete.id()),
            target_month: Some(month(2026, 5)),
            has_conflict: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(total, 1);
    assert_eq!(items[0].target_month, Some(month(2026, 5)));
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Pair the fixture's cast with a fresh set of clients, in order.
fn fixture_pairs(character_ids: &[i64], client_ids: &[i64]) -> Vec<(i64, i64)> {
    character_ids
        .iter()
        .copied()
        .zip(client_ids.iter().copied())
        .collect()
}

/// Create another match-complete incomplete booking in the fixture's store,
/// reusing its script and cast with the given clients.
async fn seeded_sibling(
    pool: &PgPool,
    fixture: &ConfirmableBooking,
    client_ids: &[i64],
) -> i64 {
    let booking = BookingRepo::create_incomplete(
        pool,
        fixture.store_id,
        &CreateIncompleteBooking {
            target_month: month(2026, 4),
            client_ids: client_ids.to_vec(),
            script_id: Some(fixture.script_id),
        },
    )
    .await
    .unwrap();
    for (character_id, client_id) in fixture_pairs(&fixture.character_ids, client_ids) {
        stagedoor_db::repositories::CharacterClientMatchRepo::create(
            pool,
            fixture.store_id,
            booking.booking_id,
            &stagedoor_db::models::matches::CreateCharacterClientMatch {
                character_id,
                client_id,
            },
        )
        .await
        .unwrap();
    }
    booking.booking_id
}
