//! Integration tests for the PostgreSQL repositories and `PgStore`.
//!
//! These need a live database (`DATABASE_URL`) and are ignored by default:
//! run them with `cargo test -p jukebox-db -- --ignored`.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use jukebox_core::queue::VoteDirection;
use jukebox_db::models::room::CreateRoom;
use jukebox_db::models::track::{AdvanceOutcome, CreateTrack, CurrentGuard, VoteOutcome, VoteTrack};
use jukebox_db::repositories::{RoomRepo, TrackRepo};
use jukebox_db::store::{PgStore, RoomStore, StoreError, TrackStore};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_room(pool: &PgPool, name: &str) -> i64 {
    RoomRepo::create(
        pool,
        &CreateRoom {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_track(title: &str) -> CreateTrack {
    CreateTrack {
        title: title.to_string(),
        source: format!("https://example.com/{title}"),
        duration_ms: 180_000,
    }
}

async fn set_vote(pool: &PgPool, track_id: i64, vote: i32) {
    sqlx::query("UPDATE tracks SET vote = $2 WHERE id = $1")
        .bind(track_id)
        .bind(vote)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn advance_promotes_by_vote_then_creation(pool: PgPool) {
    let room = new_room(&pool, "lobby").await;
    let a = TrackRepo::create(&pool, room, &new_track("a")).await.unwrap().unwrap();
    let b = TrackRepo::create(&pool, room, &new_track("b")).await.unwrap().unwrap();
    let c = TrackRepo::create(&pool, room, &new_track("c")).await.unwrap().unwrap();
    set_vote(&pool, a.id, 5).await;
    set_vote(&pool, b.id, 5).await;
    set_vote(&pool, c.id, 3).await;

    let first = TrackRepo::advance(&pool, room, CurrentGuard::Expect(None), Utc::now())
        .await
        .unwrap();
    assert_matches!(first, AdvanceOutcome::Advanced { promoted: Some(ref t), retired: 0 } if t.id == a.id);

    let second = TrackRepo::advance(&pool, room, CurrentGuard::Expect(Some(a.id)), Utc::now())
        .await
        .unwrap();
    assert_matches!(second, AdvanceOutcome::Advanced { promoted: Some(ref t), retired: 1 } if t.id == b.id);
    assert!(TrackRepo::find_by_id(&pool, room, a.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn stale_guard_is_superseded_without_writes(pool: PgPool) {
    let room = new_room(&pool, "lobby").await;
    TrackRepo::create(&pool, room, &new_track("a")).await.unwrap();
    TrackRepo::create(&pool, room, &new_track("b")).await.unwrap();

    let promoted = TrackRepo::advance(&pool, room, CurrentGuard::Any, Utc::now())
        .await
        .unwrap()
        .into_current()
        .unwrap();

    let outcome = TrackRepo::advance(&pool, room, CurrentGuard::Expect(None), Utc::now())
        .await
        .unwrap();
    assert_matches!(outcome, AdvanceOutcome::Superseded(Some(ref t)) if t.id == promoted.id);
    assert_eq!(TrackRepo::list_queued(&pool, room).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn advance_on_empty_room_returns_none(pool: PgPool) {
    let room = new_room(&pool, "lobby").await;
    let only = TrackRepo::create(&pool, room, &new_track("a")).await.unwrap().unwrap();
    assert!(TrackRepo::delete(&pool, room, only.id).await.unwrap());

    let outcome = TrackRepo::advance(&pool, room, CurrentGuard::Expect(None), Utc::now())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        AdvanceOutcome::Advanced {
            promoted: None,
            retired: 0
        }
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn played_at_is_the_supplied_time(pool: PgPool) {
    let room = new_room(&pool, "lobby").await;
    TrackRepo::create(&pool, room, &new_track("a")).await.unwrap();
    let now = Utc::now() - Duration::minutes(1);

    let current = TrackRepo::advance(&pool, room, CurrentGuard::Any, now)
        .await
        .unwrap()
        .into_current()
        .unwrap();
    let stored = current.played_at.unwrap();
    assert!((stored - now).num_milliseconds().abs() < 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn store_vote_outcomes(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let room = new_room(&pool, "lobby").await;
    let track = store
        .create_track(room, &new_track("a"))
        .await
        .unwrap()
        .unwrap();
    let vote = VoteTrack {
        voter: "alice".into(),
        direction: VoteDirection::Up,
    };

    assert_matches!(store.vote(room, track.id, &vote).await.unwrap(), VoteOutcome::Recorded(t) if t.vote == 1);
    assert_eq!(store.vote(room, track.id, &vote).await.unwrap(), VoteOutcome::AlreadyVoted);
    assert_eq!(store.vote(room, 9_999, &vote).await.unwrap(), VoteOutcome::TrackNotFound);

    store.advance(room, CurrentGuard::Any, Utc::now()).await.unwrap();
    let bob = VoteTrack {
        voter: "bob".into(),
        direction: VoteDirection::Down,
    };
    assert_eq!(store.vote(room, track.id, &bob).await.unwrap(), VoteOutcome::NotQueued);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn duplicate_room_name_is_a_conflict(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    new_room(&pool, "lobby").await;

    let dup = store
        .create_room(&CreateRoom {
            name: "lobby".into(),
        })
        .await;
    assert_matches!(dup, Err(StoreError::Conflict(msg)) if msg.contains("uq_rooms_name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn create_track_in_missing_room_returns_none(pool: PgPool) {
    let created = TrackRepo::create(&pool, 12_345, &new_track("a")).await.unwrap();
    assert!(created.is_none());
}
