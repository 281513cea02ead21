//! Basic cache operation tests

use super::{cache_with_clock, config};
use crate::core::{Lookup, ObjectCache};
use crate::keys::DEFAULT_GROUP;
use tempfile::TempDir;

#[test]
fn test_set_then_get() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(cache.set("key1", "value1", DEFAULT_GROUP, 0));
    assert_eq!(
        cache.get::<String>("key1", DEFAULT_GROUP),
        Lookup::Hit("value1".to_string())
    );
}

#[test]
fn test_stored_false_is_found() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(cache.set("flag", &false, DEFAULT_GROUP, 0));
    let (value, found) = cache.get::<bool>("flag", DEFAULT_GROUP).into_parts();
    assert!(found);
    assert_eq!(value, Some(false));

    let (value, found) = cache.get::<bool>("other", DEFAULT_GROUP).into_parts();
    assert!(!found);
    assert_eq!(value, None);
}

#[test]
fn test_delete_then_get() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(cache.set("key1", &1, DEFAULT_GROUP, 0));
    assert!(cache.delete("key1", DEFAULT_GROUP));
    assert!(!cache.get::<i64>("key1", DEFAULT_GROUP).found());

    // Deleting again is not an error
    assert!(cache.delete("key1", DEFAULT_GROUP));
}

#[test]
fn test_add_does_not_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(cache.add("key1", "v1", DEFAULT_GROUP, 0));
    assert!(!cache.add("key1", "v2", DEFAULT_GROUP, 0));
    assert_eq!(
        cache.get::<String>("key1", DEFAULT_GROUP).into_value(),
        Some("v1".to_string())
    );
}

#[test]
fn test_replace_requires_existing_key() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(!cache.replace("key1", "v", DEFAULT_GROUP, 0));
    let path = cache.entry_path("key1", DEFAULT_GROUP).unwrap();
    assert!(!path.exists());

    assert!(cache.set("key1", "v1", DEFAULT_GROUP, 0));
    assert!(cache.replace("key1", "v2", DEFAULT_GROUP, 0));
    assert_eq!(
        cache.get::<String>("key1", DEFAULT_GROUP).into_value(),
        Some("v2".to_string())
    );
}

#[test]
fn test_incr_and_decr() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert_eq!(cache.incr("counter", 5, DEFAULT_GROUP), None);

    assert!(cache.set("counter", &10, DEFAULT_GROUP, 0));
    assert_eq!(cache.incr("counter", 5, DEFAULT_GROUP), Some(15));
    assert_eq!(cache.decr("counter", 3, DEFAULT_GROUP), Some(12));
    assert_eq!(cache.incr("counter", -20, DEFAULT_GROUP), Some(-8));
    assert_eq!(
        cache.get::<i64>("counter", DEFAULT_GROUP).into_value(),
        Some(-8)
    );
}

#[test]
fn test_incr_coerces_strings() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(cache.set("counter", "7 apples", DEFAULT_GROUP, 0));
    assert_eq!(cache.incr("counter", 1, DEFAULT_GROUP), Some(8));
}

#[test]
fn test_expired_entry_misses_but_file_remains() {
    let temp_dir = TempDir::new().unwrap();
    let (cache, clock) = cache_with_clock(config(&temp_dir));

    assert!(cache.set("key1", "v", DEFAULT_GROUP, 30));
    clock.advance(30);
    assert!(cache.get::<String>("key1", DEFAULT_GROUP).found());

    clock.advance(1);
    assert!(!cache.get::<String>("key1", DEFAULT_GROUP).found());

    let path = cache.entry_path("key1", DEFAULT_GROUP).unwrap();
    assert!(path.is_file(), "expired entries are not deleted on read");

    assert!(cache.set("key1", "fresh", DEFAULT_GROUP, 30));
    assert_eq!(
        cache.get::<String>("key1", DEFAULT_GROUP).into_value(),
        Some("fresh".to_string())
    );
}

#[test]
fn test_zero_ttl_never_expires() {
    let temp_dir = TempDir::new().unwrap();
    let (cache, clock) = cache_with_clock(config(&temp_dir));

    assert!(cache.set("key1", "v", DEFAULT_GROUP, 0));
    clock.advance(10 * 365 * 24 * 3600);
    assert!(cache.get::<String>("key1", DEFAULT_GROUP).found());
}

#[test]
fn test_flush_removes_everything() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(cache.flush(), "flushing an empty store succeeds");

    for i in 0..5 {
        assert!(cache.set(&format!("k{i}"), &i, "g", 0));
    }
    assert!(cache.flush());
    for i in 0..5 {
        assert!(!cache.get::<i64>(&format!("k{i}"), "g").found());
    }
}

#[test]
fn test_get_multi_omits_missing_keys() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(cache.set("a", "va", "g", 0));
    let result = cache.get_multi::<String, _, _, _, _>([("g", vec!["a", "b"])]);

    assert_eq!(result.len(), 1);
    let group = &result["g"];
    assert_eq!(group.len(), 1);
    assert_eq!(group["a"], "va");
    assert!(!group.contains_key("b"));
}

#[test]
fn test_statistics_track_hits_and_misses() {
    let temp_dir = TempDir::new().unwrap();
    let cache = ObjectCache::new(config(&temp_dir));

    assert!(cache.set("key1", "v", DEFAULT_GROUP, 0));
    let _ = cache.get::<String>("key1", DEFAULT_GROUP);
    let _ = cache.get::<String>("key2", DEFAULT_GROUP);
    let _ = cache.get_multi::<String, _, _, _, _>([(DEFAULT_GROUP, ["key1", "key3"])]);

    assert_eq!(cache.cache_hits(), 2);
    assert_eq!(cache.cache_misses(), 2);

    // incr reads through the same path
    assert!(cache.set("n", &1, DEFAULT_GROUP, 0));
    assert_eq!(cache.incr("n", 1, DEFAULT_GROUP), Some(2));
    let stats = cache.statistics();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 2);
    assert!((stats.hit_rate() - 0.6).abs() < 1e-9);
}
