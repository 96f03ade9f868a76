//! Record store integration tests over the file backend.
//!
//! Covers persistence across store instances, caps, tolerance of corrupted
//! files, and share ingestion into a fresh store.

use std::fs;

use reading_kernel::share::{self, ShareKind};
use reading_kernel::store::StoredRecord;
use reading_kernel::{
    build_share_url, draw, generate_report, take_share_token, BirthProfileInput, DrawRequest,
    FileBackend, RecordStore, SpreadId, TarotRecord, TarotSharePayload, ZiweiProfile,
    ZiweiSharePayload,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn open(dir: &tempfile::TempDir) -> RecordStore<FileBackend> {
    RecordStore::new(FileBackend::open(dir.path()).unwrap())
}

fn profile(name: &str) -> ZiweiProfile {
    let input = BirthProfileInput::new(name, "1992-07-07", "07:07", "新竹");
    let report = generate_report(&input, 2026);
    ZiweiProfile::new(input, report)
}

fn record(topic: &str, seed: i64) -> TarotRecord {
    let result = draw(&DrawRequest::new(topic, SpreadId::Six, true, seed));
    TarotRecord::new(topic, SpreadId::Six, true, result)
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let p = profile("小華");
    let r = record("事業", 10);
    {
        let store = open(&dir);
        store.upsert(p.clone()).unwrap();
        store.upsert(r.clone()).unwrap();
    }

    let store = open(&dir);
    assert_eq!(store.load::<ZiweiProfile>(), vec![p]);
    assert_eq!(store.load::<TarotRecord>(), vec![r]);
    assert!(dir.path().join("ziweiProfiles.json").exists());
    assert!(dir.path().join("tarotRecords.json").exists());
}

#[test]
fn test_caps_apply_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let mut newest = Vec::new();
    for i in 0..10 {
        let p = profile(&format!("P{i}"));
        newest.insert(0, p.id.clone());
        store.upsert(p).unwrap();
        store.upsert(record("愛情", i)).unwrap();
    }

    let profiles = open(&dir).load::<ZiweiProfile>();
    assert_eq!(profiles.len(), ZiweiProfile::CAP);
    let ids: Vec<_> = profiles.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, newest[..ZiweiProfile::CAP].to_vec());
    assert_eq!(open(&dir).load::<TarotRecord>().len(), TarotRecord::CAP);
}

#[test]
fn test_corrupted_file_reads_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ziweiProfiles.json"), "{{{ definitely not json").unwrap();

    let store = open(&dir);
    assert!(store.load::<ZiweiProfile>().is_empty());

    let p = profile("修復");
    store.upsert(p.clone()).unwrap();
    assert_eq!(store.load::<ZiweiProfile>(), vec![p]);
}

#[test]
fn test_legacy_records_are_repaired_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut legacy = serde_json::to_value(profile("舊資料")).unwrap();
    let obj = legacy.as_object_mut().unwrap();
    obj.remove("fiveElements");
    obj.remove("notes");
    fs::write(
        dir.path().join("ziweiProfiles.json"),
        serde_json::json!([legacy, "junk"]).to_string(),
    )
    .unwrap();

    let loaded = open(&dir).load::<ZiweiProfile>();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].five_elements.len(), 5);
    assert!(loaded[0].notes.is_empty());
}

#[test]
fn test_lifecycle_edits_persist() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);
    let a = profile("A");
    let b = profile("B");
    store.upsert(a.clone()).unwrap();
    store.upsert(b.clone()).unwrap();

    store.set_note(&a.id, "事業 / 財運", "準備面試").unwrap();
    store.rename::<ZiweiProfile>(&a.id, "阿A").unwrap();
    store.delete::<ZiweiProfile>(&b.id).unwrap();

    let loaded = open(&dir).load::<ZiweiProfile>();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "阿A");
    assert_eq!(loaded[0].note("事業 / 財運"), "準備面試");
}

#[test]
fn test_concurrent_upserts_never_fail() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = &store;
                scope.spawn(move || {
                    for round in 0..5 {
                        store.upsert(record("事業", i * 10 + round))?;
                    }
                    Ok::<_, reading_kernel::StoreError>(())
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
    });

    // Last writer wins: some records may be lost, but the bucket stays whole.
    let loaded = open(&dir).load::<TarotRecord>();
    assert!(!loaded.is_empty());
    assert!(loaded.len() <= TarotRecord::CAP);
    let raw = fs::read_to_string(dir.path().join("tarotRecords.json")).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).unwrap().is_array());
}

// ─────────────────────────────────────────────────────────────────────────────
// Share ingestion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_shared_profile_lands_in_receiver_store() {
    let sender = tempfile::tempdir().unwrap();
    let receiver = tempfile::tempdir().unwrap();

    let input = BirthProfileInput::new("分享者", "1985-01-01", "01:00", "花蓮");
    let report = generate_report(&input, 2026);
    let token = share::encode(&ZiweiSharePayload::new(input.clone(), report.clone()));
    open(&sender)
        .upsert(ZiweiProfile::new(input, report.clone()))
        .unwrap();

    let url = build_share_url("https://reading.example.com/?from=line", ShareKind::Ziwei, &token)
        .unwrap();
    let ingest = take_share_token(&url, ShareKind::Ziwei).unwrap();
    assert_eq!(ingest.cleaned_url, "https://reading.example.com/");

    let payload: ZiweiSharePayload = share::decode(&ingest.token).unwrap();
    let store = open(&receiver);
    store.upsert(ZiweiProfile::from_share(payload)).unwrap();

    let loaded = store.load::<ZiweiProfile>();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "分享者");
    assert_eq!(loaded[0].report(), report);
}

#[test]
fn test_shared_draw_lands_in_receiver_store() {
    let dir = tempfile::tempdir().unwrap();
    let original = record("婚姻", 77);
    let token = share::encode(&TarotSharePayload::from_record(&original));

    let payload: TarotSharePayload = share::decode(&token).unwrap();
    let ingested = TarotRecord::from_share(payload).unwrap();
    let store = open(&dir);
    store.upsert(ingested.clone()).unwrap();

    let loaded = store.load::<TarotRecord>();
    assert_eq!(loaded, vec![ingested]);
    assert_eq!(loaded[0].cards, original.cards);
    assert_ne!(loaded[0].id, original.id);
}
