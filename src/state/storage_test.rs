use super::*;

fn temp_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("movieflix-storage-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}

// =============================================================
// MemoryStore
// =============================================================

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get("token"), None);
    store.set("token", "abc").unwrap();
    assert_eq!(store.get("token").as_deref(), Some("abc"));
    store.remove("token").unwrap();
    assert_eq!(store.get("token"), None);
}

#[test]
fn memory_store_clear_drops_everything() {
    let store = MemoryStore::new();
    store.set("token", "abc").unwrap();
    store.set("role", "USER").unwrap();
    store.clear().unwrap();
    assert_eq!(store.get("token"), None);
    assert_eq!(store.get("role"), None);
}

// =============================================================
// FileStore
// =============================================================

#[test]
fn file_store_survives_reopen() {
    let path = temp_path();
    {
        let store = FileStore::open(&path).unwrap();
        store.set("token", "abc").unwrap();
        store.set("userId", "7").unwrap();
    }
    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("token").as_deref(), Some("abc"));
    assert_eq!(reopened.get("userId").as_deref(), Some("7"));
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_missing_file_is_empty_and_not_created_on_read() {
    let path = temp_path();
    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get("token"), None);
    assert!(!path.exists());
}

#[test]
fn file_store_remove_persists() {
    let path = temp_path();
    let store = FileStore::open(&path).unwrap();
    store.set("token", "abc").unwrap();
    store.remove("token").unwrap();
    drop(store);
    assert_eq!(FileStore::open(&path).unwrap().get("token"), None);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_corrupt_file_reads_as_empty_and_is_replaced() {
    let path = temp_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get("token"), None);
    store.set("token", "fresh").unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.get("token").map(String::as_str), Some("fresh"));
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_clear_writes_empty_map() {
    let path = temp_path();
    let store = FileStore::open(&path).unwrap();
    store.set("role", "ADMIN").unwrap();
    store.clear().unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.trim(), "{}");
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
