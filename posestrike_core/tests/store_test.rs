use std::{env, fs, path::PathBuf};

use pose_data::player::{PlayerKey, PlayerRecord};
use posestrike_core::error::{PersistenceError, StoreError};
use posestrike_core::store::PlayerStore;

fn temp_path(name: &str) -> PathBuf {
    let path = env::temp_dir().join(format!(
        "posestrike_store_{}_{}.json",
        name,
        std::process::id()
    ));
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn test_add_player_starts_fresh() {
    let mut store = PlayerStore::in_memory(2);
    let key = PlayerKey::new("Ann", "A");

    store.add_player(key.clone()).unwrap();

    assert_eq!(
        store.record(&key),
        Some(PlayerRecord { score: 0, remaining_attempts: 2 })
    );
    assert_eq!(
        store.add_player(key.clone()),
        Err(StoreError::DuplicatePlayer(key))
    );
}

#[test]
fn test_keys_compare_both_fields() {
    let mut store = PlayerStore::in_memory(2);
    store.add_player(PlayerKey::new("Ann", "A")).unwrap();
    store.add_player(PlayerKey::new("Ann", "B")).unwrap();

    assert!(!store.contains(&PlayerKey::new("ann", "A")));
    assert_eq!(store.players().count(), 2);
}

#[test]
fn test_attempts_stop_at_zero() {
    let mut store = PlayerStore::in_memory(2);
    let key = PlayerKey::new("Ann", "A");
    store.add_player(key.clone()).unwrap();

    store.decrement_attempts(&key);
    assert_eq!(store.remaining_attempts(&key), 1);
    store.decrement_attempts(&key);
    store.decrement_attempts(&key);
    assert_eq!(store.remaining_attempts(&key), 0);

    // Unknown players are ignored.
    store.decrement_attempts(&PlayerKey::new("Bob", "A"));
    assert_eq!(store.remaining_attempts(&PlayerKey::new("Bob", "A")), 0);
}

#[test]
fn test_score_only_ratchets_up() {
    let mut store = PlayerStore::in_memory(2);
    let key = PlayerKey::new("Ann", "A");
    store.add_player(key.clone()).unwrap();

    assert_eq!(store.set_score(&key, 7), Some(7));
    assert_eq!(store.set_score(&key, 3), Some(7));
    assert_eq!(store.score(&key), Some(7));
    assert_eq!(store.set_score(&PlayerKey::new("Bob", "A"), 3), None);
}

#[test]
fn test_leaderboard_keeps_best_score() {
    let mut store = PlayerStore::in_memory(2);
    let key = PlayerKey::new("Ann", "A");

    store.update_leaderboard(&key, 10).unwrap();
    store.update_leaderboard(&key, 5).unwrap();

    assert_eq!(store.leaderboard().len(), 1);
    assert_eq!(store.leaderboard()[0].best_score, 10);
}

#[test]
fn test_rank_on_empty_leaderboard_fails() {
    let store = PlayerStore::in_memory(2);
    let key = PlayerKey::new("Ann", "A");
    assert_eq!(store.rank(&key), Err(StoreError::UnknownPlayer(key)));
}

#[test]
fn test_ranking_and_ties() {
    let mut store = PlayerStore::in_memory(2);
    let ann = PlayerKey::new("Ann", "A");
    let bob = PlayerKey::new("Bob", "A");
    let cy = PlayerKey::new("Cy", "B");

    store.update_leaderboard(&ann, 5).unwrap();
    store.update_leaderboard(&bob, 10).unwrap();
    store.update_leaderboard(&cy, 5).unwrap();

    assert_eq!(store.rank(&bob), Ok(1));
    assert_eq!(store.rank(&ann), Ok(2));
    assert_eq!(store.rank(&cy), Ok(3));

    // Ann catches up with Bob; Bob got there first and stays ahead.
    store.update_leaderboard(&ann, 10).unwrap();
    assert_eq!(store.rank(&bob), Ok(1));
    assert_eq!(store.rank(&ann), Ok(2));

    store.update_leaderboard(&cy, 11).unwrap();
    assert_eq!(store.rank(&cy), Ok(1));

    let top: Vec<&str> = store.top(2).iter().map(|e| e.key.name.as_str()).collect();
    assert_eq!(top, vec!["Cy", "Bob"]);
    assert_eq!(store.top(10).len(), 3);
}

#[test]
fn test_round_trip_with_awkward_keys() {
    let path = temp_path("round_trip");
    let mut store = PlayerStore::open(&path, 2);

    let zoe = PlayerKey::new("Zoë 李", "group:A");
    let colon = PlayerKey::new("a:b", "c");
    let plain = PlayerKey::new("a", "b:c");
    for key in [&zoe, &colon, &plain] {
        store.add_player(key.clone()).unwrap();
    }
    store.set_score(&zoe, 4);
    store.decrement_attempts(&zoe);
    store.update_leaderboard(&zoe, 4).unwrap();
    store.update_leaderboard(&colon, 9).unwrap();
    store.update_leaderboard(&plain, 9).unwrap();

    let loaded = PlayerStore::load(&path, 2).unwrap();

    assert_eq!(loaded.to_document(), store.to_document());
    assert_eq!(
        loaded.record(&zoe),
        Some(PlayerRecord { score: 4, remaining_attempts: 1 })
    );
    // Keys that would collide under a "name:group" encoding stay distinct.
    assert_ne!(loaded.rank(&colon), loaded.rank(&plain));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_missing_file_is_empty_store() {
    let path = temp_path("missing");
    let store = PlayerStore::load(&path, 2).unwrap();

    assert_eq!(store.players().count(), 0);
    assert!(store.leaderboard().is_empty());
    assert_eq!(store.path(), Some(path.as_path()));
}

#[test]
fn test_corrupt_file_degrades_to_empty_store() {
    let path = temp_path("corrupt");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        PlayerStore::load(&path, 2),
        Err(PersistenceError::Decode { .. })
    ));

    let mut store = PlayerStore::open(&path, 2);
    assert!(store.leaderboard().is_empty());
    assert_eq!(store.path(), Some(path.as_path()));

    // The unreadable file is kept next to the store instead of overwritten.
    let mut corrupt = path.clone().into_os_string();
    corrupt.push(".corrupt");
    let corrupt = PathBuf::from(corrupt);
    assert_eq!(fs::read_to_string(&corrupt).unwrap(), "{ not json");

    let key = PlayerKey::new("Ann", "A");
    store.add_player(key.clone()).unwrap();
    store.save().unwrap();
    assert_eq!(fs::read_to_string(&corrupt).unwrap(), "{ not json");
    assert!(PlayerStore::load(&path, 2).unwrap().contains(&key));

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&corrupt);
}

#[test]
fn test_failed_save_keeps_memory_state() {
    let blocker = temp_path("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();
    let path = blocker.join("leaderboard.json");

    let mut store = PlayerStore::open(&path, 2);
    let key = PlayerKey::new("Ann", "A");

    let result = store.update_leaderboard(&key, 3);
    assert!(matches!(result, Err(PersistenceError::Write { .. })));
    assert_eq!(store.rank(&key), Ok(1));

    let _ = fs::remove_file(&blocker);
}

#[test]
fn test_in_memory_store_never_writes() {
    let mut store = PlayerStore::in_memory(2);
    assert!(store.path().is_none());
    assert!(store.update_leaderboard(&PlayerKey::new("Ann", "A"), 1).is_ok());
    assert!(store.save().is_ok());
}
