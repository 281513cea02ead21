use super::*;
use crate::entry::{Entry, NO_EXPIRATION};
use crate::keys::KeyNamespacer;
use crate::storage::accelerator::MemoryAccelerator;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn store(temp_dir: &TempDir) -> EntryStore {
    EntryStore::open(temp_dir.path(), "opstash", None).unwrap()
}

#[test]
fn test_write_then_read() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let ns = KeyNamespacer::new("site", false, 1);
    let key = ns.build_key("k", "default");

    assert!(!store.exists(&key));
    store.write(&key, Entry::encode(&"v", NO_EXPIRATION)?)?;
    assert!(store.exists(&key));

    let entry = store.read(&key, 0)?.expect("entry should be present");
    assert_eq!(entry.decode::<String>()?, "v");

    Ok(())
}

#[test]
fn test_entry_path_is_salted_hash() {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let ns = KeyNamespacer::new("site", false, 1);
    let key = ns.build_key("a/../../etc:passwd", "default");

    let path = store.entry_path(&key);
    assert_eq!(path.parent(), Some(temp_dir.path()));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("opstash-"));
    assert_eq!(name.len(), "opstash-".len() + 64);
}

#[test]
fn test_expired_entry_reads_as_missing_but_stays_on_disk() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let ns = KeyNamespacer::new("site", false, 1);
    let key = ns.build_key("k", "default");

    store.write(&key, Entry::encode(&1, 100)?)?;
    assert!(store.read(&key, 100)?.is_some());
    assert!(store.read(&key, 101)?.is_none());

    assert!(store.entry_path(&key).is_file());
    assert!(store.exists(&key));
    let record = store.read_record(&key)?.expect("raw record survives expiry");
    assert_eq!(record.expires_at, 100);

    Ok(())
}

#[test]
fn test_invalidate_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let ns = KeyNamespacer::new("site", false, 1);
    let key = ns.build_key("k", "default");

    store.write(&key, Entry::encode(&"v", NO_EXPIRATION)?)?;
    assert!(store.invalidate(&key)?);
    assert!(!store.invalidate(&key)?);
    assert!(store.read(&key, 0)?.is_none());

    Ok(())
}

#[test]
fn test_corrupt_file_is_an_error_not_a_value() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let ns = KeyNamespacer::new("site", false, 1);
    let key = ns.build_key("k", "default");

    std::fs::write(store.entry_path(&key), b"garbage").unwrap();
    let err = store.read(&key, 0).unwrap_err();
    assert!(err.is_corruption());

    Ok(())
}

const TEMP_NAME: &str = "deadbeef-0123456789abcdef0123456789abcdef.tmp";

#[test]
fn test_clear_removes_entries_and_unused_locks() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let ns = KeyNamespacer::new("site", false, 1);

    for i in 0..3 {
        let key = ns.build_key(&format!("k{i}"), "default");
        store.write(&key, Entry::encode(&i, NO_EXPIRATION)?)?;
    }
    let unused = ns.build_key("unused", "default");
    drop(store.lock(&unused)?);
    let held_key = ns.build_key("held", "default");
    let held = store.lock(&held_key)?;
    // A temp file from a writer that may still be about to rename
    std::fs::write(temp_dir.path().join(TEMP_NAME), b"partial").unwrap();

    assert_eq!(store.entry_files()?.len(), 3);
    let sweep = store.clear()?;
    assert_eq!(sweep.removed, 3);
    assert_eq!(sweep.failed, 0);
    assert_eq!(sweep.leftovers, 1);

    assert!(store.entry_files()?.is_empty());
    assert!(!store.lock_path(&unused).exists());
    assert!(store.lock_path(&held_key).is_file());
    assert!(temp_dir.path().join(TEMP_NAME).is_file());

    drop(held);
    Ok(())
}

#[test]
fn test_clear_leftovers_removes_stale_temp_files() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let temp_file = temp_dir.path().join(TEMP_NAME);
    let unrelated = temp_dir.path().join("notes.tmp");
    std::fs::write(&temp_file, b"partial").unwrap();
    std::fs::write(&unrelated, b"not ours").unwrap();

    assert_eq!(store.clear_leftovers(SystemTime::now())?, 0);
    assert!(temp_file.is_file());

    let later = SystemTime::now() + TEMP_FILE_GRACE + Duration::from_secs(1);
    assert_eq!(store.clear_leftovers(later)?, 1);
    assert!(!temp_file.exists());
    assert!(unrelated.is_file());

    Ok(())
}

#[test]
fn test_clear_skips_entry_named_directories() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let ns = KeyNamespacer::new("site", false, 1);

    for i in 0..20 {
        let key = ns.build_key(&format!("k{i}"), "default");
        store.write(&key, Entry::encode(&i, NO_EXPIRATION)?)?;
    }
    let impostor = temp_dir.path().join(format!("opstash-{}", "a".repeat(64)));
    std::fs::create_dir(&impostor).unwrap();
    std::fs::write(impostor.join("inner"), b"x").unwrap();

    assert_eq!(store.entry_files()?.len(), 20);
    let sweep = store.clear()?;
    assert_eq!(sweep.removed, 20);
    assert_eq!(sweep.failed, 0);
    assert!(store.entry_files()?.is_empty());
    assert!(impostor.is_dir());

    Ok(())
}

#[test]
fn test_remove_where_filters_on_key_parts() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = store(&temp_dir);
    let ns = KeyNamespacer::new("site", false, 1);

    let keep = ns.build_key("a", "keep");
    let drop_a = ns.build_key("a", "drop");
    let drop_b = ns.build_key("b", "drop");
    for key in [&keep, &drop_a, &drop_b] {
        store.write(key, Entry::encode(&"v", NO_EXPIRATION)?)?;
    }

    let sweep = store.remove_where(|record| record.key.group == "drop")?;
    assert_eq!(sweep.removed, 2);
    assert_eq!(sweep.failed, 0);
    assert!(store.exists(&keep));
    assert!(!store.exists(&drop_a));
    assert!(!store.exists(&drop_b));

    Ok(())
}

#[test]
fn test_accelerator_mirrors_presence() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let accel = Arc::new(MemoryAccelerator::new());
    let store = EntryStore::open(
        temp_dir.path(),
        "opstash",
        Some(accel.clone() as Arc<dyn AccelerationBackend>),
    )?;
    let ns = KeyNamespacer::new("site", false, 1);
    let key = ns.build_key("k", "default");

    store.write(&key, Entry::encode(&"v", NO_EXPIRATION)?)?;
    assert!(accel.exists(&store.entry_path(&key)));

    store.invalidate(&key)?;
    assert!(!accel.exists(&store.entry_path(&key)));
    assert!(!store.exists(&key));

    Ok(())
}

#[test]
fn test_stale_accelerator_reference_reads_as_miss() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let accel = Arc::new(MemoryAccelerator::new());
    let store = EntryStore::open(
        temp_dir.path(),
        "opstash",
        Some(accel.clone() as Arc<dyn AccelerationBackend>),
    )?;
    let ns = KeyNamespacer::new("site", false, 1);
    let key = ns.build_key("k", "default");

    store.write(&key, Entry::encode(&"v", NO_EXPIRATION)?)?;
    // Simulate a crash after the file was removed but before eviction.
    std::fs::remove_file(store.entry_path(&key)).unwrap();

    assert!(store.exists(&key));
    assert!(!store.confirm_exists(&key));
    assert!(!accel.exists(&store.entry_path(&key)));

    store.write(&key, Entry::encode(&"v", NO_EXPIRATION)?)?;
    std::fs::remove_file(store.entry_path(&key)).unwrap();
    assert!(store.read(&key, 0)?.is_none());
    assert!(!store.exists(&key), "a failed read evicts the stale reference");

    Ok(())
}

#[test]
fn test_open_rejects_file_as_base_dir() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();
    assert!(EntryStore::open(&file, "opstash", None).is_err());
}
