//! Tests for rank computation and the leaderboard listing.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use diesel::{Connection, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::NamedTempFile;

use word_sprint::{
    CreatePuzzleRequest, PuzzleKind, PuzzleRepository, PuzzleService, ShiftDirection,
    StartAttemptRequest, Variant, leaderboard, rank_attempt,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn setup() -> (NamedTempFile, PuzzleRepository, PuzzleService) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let mut conn = SqliteConnection::establish(&db_path).expect("Failed to connect");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Migrations failed");

    let repo = PuzzleRepository::new(db_path);
    let service = PuzzleService::new(repo.clone());
    (db_file, repo, service)
}

fn seed_puzzle(service: &PuzzleService, kind: PuzzleKind, slot: i32) -> i32 {
    service
        .create_puzzle(CreatePuzzleRequest {
            date: NaiveDate::from_ymd_opt(2026, 8, 30).expect("date"),
            slot,
            kind,
            variant: Variant::Cipher,
            target_word: "CRANE".to_string(),
            theme_hint: "birds".to_string(),
            shift: Some(3),
            direction: Some(ShiftDirection::Right),
            unshifted_count: Some(1),
        })
        .expect("Seeding failed")
        .id
}

fn start(service: &PuzzleService, user: &str, puzzle_id: i32, mode: &str) -> i32 {
    service
        .start_attempt(
            user,
            StartAttemptRequest {
                puzzle_id,
                mode: mode.to_string(),
                premium: false,
            },
        )
        .expect("Start failed")
        .id
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 30)
        .expect("date")
        .and_hms_opt(12, 0, 0)
        .expect("time")
}

/// Completes an attempt with crafted times; new attempts carry version 0.
fn finish(
    repo: &PuzzleRepository,
    attempt_id: i32,
    completed_at: NaiveDateTime,
    final_time_ms: i64,
) {
    repo.complete_attempt(attempt_id, 0, completed_at, final_time_ms, final_time_ms)
        .expect("Completion failed")
        .expect("Completion lost a version race");
}

#[test]
fn test_rank_orders_by_final_time_then_arrival() {
    let (_db, repo, service) = setup();
    let puzzle_id = seed_puzzle(&service, PuzzleKind::Daily, 10);
    let t = base_time();

    let alice = start(&service, "alice", puzzle_id, "daily");
    let bob = start(&service, "bob", puzzle_id, "daily");
    let carol = start(&service, "carol", puzzle_id, "daily");

    // Alice and Carol tie on final time; Alice finished first.
    finish(&repo, alice, t, 10_000);
    finish(&repo, bob, t + TimeDelta::seconds(1), 9_000);
    finish(&repo, carol, t + TimeDelta::seconds(2), 10_000);

    let rank_of = |id: i32| {
        let row = repo
            .get_attempt(id)
            .expect("Query failed")
            .expect("Attempt missing");
        rank_attempt(&repo, &row).expect("Rank failed")
    };

    assert_eq!(rank_of(bob), Some(1));
    assert_eq!(rank_of(alice), Some(2));
    assert_eq!(rank_of(carol), Some(3));
}

#[test]
fn test_rank_is_none_until_solved() {
    let (_db, repo, service) = setup();
    let puzzle_id = seed_puzzle(&service, PuzzleKind::Daily, 10);

    let attempt_id = start(&service, "alice", puzzle_id, "daily");
    let row = repo
        .get_attempt(attempt_id)
        .expect("Query failed")
        .expect("Attempt missing");
    assert_eq!(rank_attempt(&repo, &row).expect("Rank failed"), None);
}

#[test]
fn test_give_ups_never_ranked() {
    let (_db, repo, service) = setup();
    let puzzle_id = seed_puzzle(&service, PuzzleKind::Daily, 10);

    let solved = start(&service, "alice", puzzle_id, "daily");
    finish(&repo, solved, base_time(), 10_000);

    let abandoned = start(&service, "dave", puzzle_id, "daily");
    service.give_up("dave", abandoned).expect("Give up failed");

    let row = repo
        .get_attempt(abandoned)
        .expect("Query failed")
        .expect("Attempt missing");
    assert_eq!(rank_attempt(&repo, &row).expect("Rank failed"), None);

    let entries = leaderboard(&repo, puzzle_id, 10).expect("Leaderboard failed");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id(), "alice");
}

#[test]
fn test_practice_attempts_never_ranked() {
    let (_db, repo, service) = setup();
    let puzzle_id = seed_puzzle(&service, PuzzleKind::Practice, 11);

    let attempt_id = start(&service, "eve", puzzle_id, "practice");
    finish(&repo, attempt_id, base_time(), 7_000);

    let row = repo
        .get_attempt(attempt_id)
        .expect("Query failed")
        .expect("Attempt missing");
    assert_eq!(rank_attempt(&repo, &row).expect("Rank failed"), None);
    assert!(
        leaderboard(&repo, puzzle_id, 10)
            .expect("Leaderboard failed")
            .is_empty()
    );
}

#[test]
fn test_leaderboard_order_and_limit() {
    let (_db, repo, service) = setup();
    let puzzle_id = seed_puzzle(&service, PuzzleKind::Daily, 10);
    let t = base_time();

    let alice = start(&service, "alice", puzzle_id, "daily");
    let bob = start(&service, "bob", puzzle_id, "daily");
    let carol = start(&service, "carol", puzzle_id, "daily");

    finish(&repo, alice, t, 10_000);
    finish(&repo, bob, t + TimeDelta::seconds(1), 9_000);
    finish(&repo, carol, t + TimeDelta::seconds(2), 10_000);

    let entries = leaderboard(&repo, puzzle_id, 10).expect("Leaderboard failed");
    let order: Vec<&str> = entries.iter().map(|e| e.user_id().as_str()).collect();
    assert_eq!(order, vec!["bob", "alice", "carol"]);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(*entry.rank(), i as i64 + 1);
        assert_eq!(*entry.hints_used_count(), 0);
    }

    let top_two = leaderboard(&repo, puzzle_id, 2).expect("Leaderboard failed");
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[1].user_id(), "alice");
}
