use super::*;
use crate::embeddings::ChunkKind;
use tempfile::TempDir;

fn sample_snapshot() -> Snapshot {
    let chunks = vec![
        Chunk {
            text: "## Programs\n- Computer Science".to_string(),
            section: Some("Programs".to_string()),
            kind: ChunkKind::Section,
            index: 0,
        },
        Chunk {
            text: "- Price: 2500 KM".to_string(),
            section: Some("Fees".to_string()),
            kind: ChunkKind::Bullet,
            index: 1,
        },
    ];
    let index = VectorIndex::build(vec![vec![1.0, 0.0, 0.0], vec![0.0, 2.0, 0.0]])
        .expect("index should build");

    Snapshot::new(
        chunks,
        index,
        hash_document("knowledge"),
        "test-model".to_string(),
        500,
    )
}

#[test]
fn save_then_load_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let snapshot = sample_snapshot();

    snapshot.save(temp_dir.path()).expect("save should succeed");
    let loaded = Snapshot::load(temp_dir.path())
        .expect("load should succeed")
        .expect("snapshot should exist");

    assert_eq!(loaded, snapshot);
    assert!(!temp_dir.path().join("index.bin.tmp").exists());
    assert!(!temp_dir.path().join("chunks.json.tmp").exists());

    let query = [0.0, 1.0, 0.0];
    assert_eq!(
        loaded.index.search(&query, 1).expect("search should succeed"),
        snapshot.index.search(&query, 1).expect("search should succeed")
    );
}

#[test]
fn manifest_uses_type_field_for_chunk_kind() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    sample_snapshot()
        .save(temp_dir.path())
        .expect("save should succeed");

    let json = fs::read_to_string(temp_dir.path().join(MANIFEST_FILE_NAME))
        .expect("manifest should be readable");
    let value: serde_json::Value = serde_json::from_str(&json).expect("manifest should be json");

    assert_eq!(value["chunks"][0]["type"], "section");
    assert_eq!(value["chunks"][1]["section"], "Fees");
    assert_eq!(value["dimension"], 3);
    assert_eq!(value["embedding_model"], "test-model");
    assert_eq!(value["max_chunk_size"], 500);
}

#[test]
fn missing_files_mean_no_snapshot() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    assert!(
        Snapshot::load(temp_dir.path())
            .expect("load should succeed")
            .is_none()
    );

    sample_snapshot()
        .save(temp_dir.path())
        .expect("save should succeed");
    fs::remove_file(temp_dir.path().join(INDEX_FILE_NAME)).expect("should remove index");
    assert!(
        Snapshot::load(temp_dir.path())
            .expect("load should succeed")
            .is_none()
    );
}

#[test]
fn truncated_index_is_corruption() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    sample_snapshot()
        .save(temp_dir.path())
        .expect("save should succeed");

    let index_path = temp_dir.path().join(INDEX_FILE_NAME);
    let bytes = fs::read(&index_path).expect("should read index");
    fs::write(&index_path, &bytes[..bytes.len() - 3]).expect("should truncate index");

    assert!(matches!(
        Snapshot::load(temp_dir.path()),
        Err(RagError::IndexCorruption(_))
    ));
}

#[test]
fn wrong_index_version_is_corruption() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    sample_snapshot()
        .save(temp_dir.path())
        .expect("save should succeed");

    let stored = StoredIndex {
        version: SNAPSHOT_FORMAT_VERSION + 1,
        dimension: 3,
        values: vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    };
    let bytes = encode_to_vec(&stored, bincode_config()).expect("should encode");
    fs::write(temp_dir.path().join(INDEX_FILE_NAME), bytes).expect("should write index");

    let err = Snapshot::load(temp_dir.path()).expect_err("load should fail");
    assert!(matches!(err, RagError::IndexCorruption(msg) if msg.contains("version")));
}

#[test]
fn trailing_bytes_are_corruption() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    sample_snapshot()
        .save(temp_dir.path())
        .expect("save should succeed");

    let index_path = temp_dir.path().join(INDEX_FILE_NAME);
    let mut bytes = fs::read(&index_path).expect("should read index");
    bytes.extend_from_slice(b"junk");
    fs::write(&index_path, bytes).expect("should write index");

    assert!(matches!(
        Snapshot::load(temp_dir.path()),
        Err(RagError::IndexCorruption(_))
    ));
}

#[test]
fn text_file_is_not_an_index() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    sample_snapshot()
        .save(temp_dir.path())
        .expect("save should succeed");
    fs::write(temp_dir.path().join(INDEX_FILE_NAME), "not an index").expect("should write");

    assert!(matches!(
        Snapshot::load(temp_dir.path()),
        Err(RagError::IndexCorruption(_))
    ));
}

#[test]
fn garbled_manifest_is_corruption() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    sample_snapshot()
        .save(temp_dir.path())
        .expect("save should succeed");
    fs::write(temp_dir.path().join(MANIFEST_FILE_NAME), "{ not json").expect("should write");

    assert!(matches!(
        Snapshot::load(temp_dir.path()),
        Err(RagError::IndexCorruption(_))
    ));
}

#[test]
fn chunk_count_mismatch_is_corruption() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut snapshot = sample_snapshot();
    snapshot.manifest.chunks.pop();
    snapshot.save(temp_dir.path()).expect("save should succeed");

    let err = Snapshot::load(temp_dir.path()).expect_err("load should fail");
    assert!(matches!(err, RagError::IndexCorruption(msg) if msg.contains("1 chunks")));
}

#[test]
fn dimension_mismatch_is_corruption() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut snapshot = sample_snapshot();
    snapshot.manifest.dimension = 4;
    snapshot.save(temp_dir.path()).expect("save should succeed");

    assert!(matches!(
        Snapshot::load(temp_dir.path()),
        Err(RagError::IndexCorruption(_))
    ));
}

#[test]
fn empty_snapshot_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let snapshot = Snapshot::new(
        Vec::new(),
        VectorIndex::default(),
        hash_document(""),
        "test-model".to_string(),
        500,
    );

    snapshot.save(temp_dir.path()).expect("save should succeed");
    let loaded = Snapshot::load(temp_dir.path())
        .expect("load should succeed")
        .expect("snapshot should exist");

    assert!(loaded.index.is_empty());
    assert!(loaded.manifest.chunks.is_empty());
}

#[test]
fn currency_checks_hash_and_model() {
    let snapshot = sample_snapshot();
    let hash = hash_document("knowledge");

    assert!(snapshot.is_current(&hash, "test-model", 500));
    assert!(!snapshot.is_current(&hash_document("changed"), "test-model", 500));
    assert!(!snapshot.is_current(&hash, "other-model", 500));
    assert!(!snapshot.is_current(&hash, "test-model", 300));
}

#[test]
fn document_hash_is_sha256_hex() {
    assert_eq!(
        hash_document(""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(hash_document("abc").len(), 64);
}
