use std::sync::Arc;

use chrono::NaiveDate;

use posewave_domain::local_state::{CachedStreak, LocalStateRepository};
use posewave_infrastructure::persistence::{Database, SqliteLocalStateRepository};

async fn setup() -> (Database, SqliteLocalStateRepository) {
    let db = Database::in_memory().await.expect("in-memory db");
    db.init_schema().await.expect("schema");
    let repo = SqliteLocalStateRepository::new(Arc::new(db.pool().clone()));
    (db, repo)
}

#[tokio::test]
async fn local_state_repo_streak_round_trip() {
    let (_db, repo) = setup().await;

    assert!(repo.cached_streak().await.expect("read").is_none());

    let streak = CachedStreak {
        days: 4,
        last_play_date: NaiveDate::parse_from_str("2024-01-02", "%Y-%m-%d").ok(),
    };
    repo.store_streak(&streak).await.expect("store");

    let cached = repo.cached_streak().await.expect("read").expect("cached");
    assert_eq!(cached.days, 4);
    assert_eq!(cached.last_play_date, streak.last_play_date);

    // Overwrite with the authoritative recomputation
    let refreshed = CachedStreak {
        days: 0,
        last_play_date: None,
    };
    repo.store_streak(&refreshed).await.expect("store again");

    let cached = repo.cached_streak().await.expect("read").expect("cached");
    assert_eq!(cached.days, 0);
    assert_eq!(cached.last_play_date, None);
}

#[tokio::test]
async fn local_state_repo_legacy_spent_lifecycle() {
    let (db, repo) = setup().await;

    assert!(repo.legacy_spent_points().await.expect("read").is_none());

    sqlx::query("INSERT INTO local_state (key, value) VALUES ('legacy.spent_points', '120')")
        .execute(db.pool())
        .await
        .expect("seed");

    assert_eq!(repo.legacy_spent_points().await.expect("read"), Some(120));

    repo.clear_legacy_spent_points().await.expect("clear");
    assert!(repo.legacy_spent_points().await.expect("read").is_none());

    // Clearing twice is harmless
    repo.clear_legacy_spent_points().await.expect("clear again");
}
