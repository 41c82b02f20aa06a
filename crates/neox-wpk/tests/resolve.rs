mod common;

use std::fs;
use std::sync::Arc;
use std::thread;

use common::{init_logging, pack_nxs3, pack_rotor, ArchiveBuilder, CountingCodec};
use neox_codec::crypto::xor_in_place;
use neox_wpk::{
    ArchivePaths, Category, CompressionType, DataFlags, Error, ReadOptions, WpkArchive,
};

const ZSTD: u16 = CompressionType::Zstd as u16;
const XOR: u16 = 1;

#[test]
fn test_plain_entry_resolves_to_stored_bytes() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .stored("greeting", b"hello")
        .write(dir.path(), "plain");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();
    assert_eq!(archive.record_count(), 1);

    let entry = archive.resolve(0).unwrap();
    assert_eq!(entry.data(), b"hello");
    assert!(!entry.flags.intersects(DataFlags::ERROR | DataFlags::ENCRYPTED));
    assert!(entry.flags.contains(DataFlags::TEXT));
    assert_eq!(entry.extension, "dat");
    assert_eq!(entry.filename(), "greeting.dat");
    assert_eq!(entry.category, Category::Other);

    // The index table keeps the original name.
    assert_eq!(archive.filename(0).as_deref(), Some("greeting"));
}

#[test]
fn test_resolve_is_idempotent_and_decodes_once() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let content = b"<?xml version=\"1.0\"?><Root/>";
    let stored = zstd::encode_all(&content[..], 3).unwrap();
    let (index, data) = ArchiveBuilder::new()
        .raw("config", stored, content.len() as u32, ZSTD, 0)
        .write(dir.path(), "idem");

    let archive = WpkArchive::open_with_codec(
        &index,
        Some(&data),
        ReadOptions::new(),
        CountingCodec::default(),
    )
    .unwrap();

    assert!(!archive.is_resolved(0));
    let first = archive.resolve(0).unwrap();
    assert!(archive.is_resolved(0));

    // Removing the data file proves the second call never touches it.
    fs::remove_file(&data).unwrap();
    let second = archive.resolve(0).unwrap();

    assert_eq!(first.data(), second.data());
    assert_eq!(first.flags, second.flags);
    assert_eq!(first.filename(), "config.xml");
    assert!(Arc::ptr_eq(&first, &second));

    let codec = archive.codec();
    assert_eq!(CountingCodec::count(&codec.decompress), 1);
    assert_eq!(CountingCodec::count(&codec.rotor), 1);
    assert_eq!(CountingCodec::count(&codec.nxs3), 1);
    assert_eq!(CountingCodec::count(&codec.classify), 1);
    assert_eq!(CountingCodec::count(&codec.decrypt), 0);
}

#[test]
fn test_out_of_range_ordinal() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .stored("only", b"x")
        .write(dir.path(), "range");
    fs::remove_file(&data).unwrap();

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();

    for ordinal in [1, 2, usize::MAX] {
        let entry = archive.resolve(ordinal).unwrap();
        assert!(entry.has_error());
        assert!(!entry.is_locked());
        assert!(entry.data().is_empty());
        assert!(!archive.is_resolved(ordinal));
    }
}

#[test]
fn test_decompression_failure_with_key_sets_encrypted() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let garbage = vec![0xA5u8; 24];
    let (index, data) = ArchiveBuilder::new()
        .raw("broken", garbage.clone(), 100, ZSTD, 0)
        .write(dir.path(), "locked");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new().with_key(0x45)).unwrap();
    let entry = archive.resolve(0).unwrap();

    assert!(entry.flags.contains(DataFlags::ENCRYPTED));
    assert!(!entry.flags.contains(DataFlags::ERROR));
    assert_eq!(entry.data(), garbage.as_slice());
    assert_eq!(entry.extension, "");
    assert_eq!(entry.filename(), "broken");
    assert_eq!(entry.display_label(), "broken (Encrypted)");
}

#[test]
fn test_decompression_failure_without_key_sets_error() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let garbage = vec![0xA5u8; 24];

    for (stem, options) in [
        ("nokey", ReadOptions::new()),
        ("zerokey", ReadOptions::new().with_key(0)),
    ] {
        let (index, data) = ArchiveBuilder::new()
            .raw("broken", garbage.clone(), 100, ZSTD, 0)
            .write(dir.path(), stem);

        let archive = WpkArchive::open(&index, Some(&data), options).unwrap();
        let entry = archive.resolve(0).unwrap();

        assert!(entry.flags.contains(DataFlags::ERROR));
        assert!(!entry.flags.contains(DataFlags::ENCRYPTED));
        assert_eq!(entry.data(), garbage.as_slice());
        // The failure is cached like any other outcome.
        assert!(archive.is_resolved(0));
    }
}

#[test]
fn test_oversized_stream_is_a_decode_failure() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let stored = zstd::encode_all(&vec![0u8; 32 * 1024 * 1024][..], 3).unwrap();
    let (index, data) = ArchiveBuilder::new()
        .raw("inflated", stored.clone(), 64, ZSTD, 0)
        .write(dir.path(), "inflated");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();
    let entry = archive.resolve(0).unwrap();

    assert!(entry.has_error());
    assert_eq!(entry.data(), stored.as_slice());
}

#[test]
fn test_failure_aborts_later_stages() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .raw("broken", pack_rotor(b"never reached"), 13, ZSTD, 0)
        .write(dir.path(), "abort");

    let archive = WpkArchive::open_with_codec(
        &index,
        Some(&data),
        ReadOptions::new(),
        CountingCodec::failing(),
    )
    .unwrap();
    let entry = archive.resolve(0).unwrap();

    assert!(entry.has_error());
    assert!(!entry.flags.contains(DataFlags::ROTOR_PACKED));
    let codec = archive.codec();
    assert_eq!(CountingCodec::count(&codec.decompress), 1);
    assert_eq!(CountingCodec::count(&codec.rotor), 0);
    assert_eq!(CountingCodec::count(&codec.nxs3), 0);
    assert_eq!(CountingCodec::count(&codec.classify), 0);
}

#[test]
fn test_xor_encrypted_compressed_entry() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let content = b"DDS |\x7c\x00\x00\x00texture payload";
    let mut stored = zstd::encode_all(&content[..], 3).unwrap();
    xor_in_place(&mut stored, 0x45);

    let (index, data) = ArchiveBuilder::new()
        .raw("tex", stored, content.len() as u32, ZSTD, XOR)
        .write(dir.path(), "xor");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new().with_key(0x45)).unwrap();
    let entry = archive.resolve(0).unwrap();

    assert_eq!(entry.data(), content);
    assert!(entry.flags.is_empty());
    assert_eq!(entry.filename(), "tex.dds");
    assert_eq!(entry.category, Category::Texture);

    // Same archive with the wrong key looks encrypted.
    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new().with_key(0x99)).unwrap();
    assert!(archive.resolve(0).unwrap().is_locked());
}

#[test]
fn test_missing_key_for_encrypted_entry_is_error() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .raw("secret", b"ciphertext".to_vec(), 10, 0, XOR)
        .write(dir.path(), "missing");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();
    let entry = archive.resolve(0).unwrap();

    assert!(entry.has_error());
    assert_eq!(entry.data(), b"ciphertext");
}

#[test]
fn test_secondary_layers_rotor_then_nxs3() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let content = b"<Material name=\"hero\"/>";
    let (index, data) = ArchiveBuilder::new()
        .stored("both", &pack_rotor(&pack_nxs3(content)))
        .stored("nxs3", &pack_nxs3(content))
        .write(dir.path(), "layers");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();

    let both = archive.resolve(0).unwrap();
    assert_eq!(both.data(), content);
    assert!(both
        .flags
        .contains(DataFlags::ROTOR_PACKED | DataFlags::NXS3_PACKED | DataFlags::TEXT));
    assert_eq!(both.filename(), "both.mtl");

    let nxs3 = archive.resolve(1).unwrap();
    assert_eq!(nxs3.data(), content);
    assert!(nxs3.flags.contains(DataFlags::NXS3_PACKED));
    assert!(!nxs3.flags.contains(DataFlags::ROTOR_PACKED));
}

#[test]
fn test_broken_secondary_layer_is_error() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let mut packed = pack_nxs3(b"payload payload payload");
    packed.truncate(13);
    let (index, data) = ArchiveBuilder::new()
        .stored("broken", &packed)
        .write(dir.path(), "badlayer");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();
    let entry = archive.resolve(0).unwrap();

    assert!(entry.flags.contains(DataFlags::NXS3_PACKED | DataFlags::ERROR));
    assert_eq!(entry.data(), packed.as_slice());
}

#[test]
fn test_entry_past_end_of_data_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .stored("first", b"first payload")
        .stored("second", b"second payload")
        .write(dir.path(), "short");

    // Cut the data file inside the second payload.
    let mut bytes = fs::read(&data).unwrap();
    bytes.truncate(bytes.len() - 4);
    fs::write(&data, bytes).unwrap();

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();

    assert!(matches!(
        archive.resolve(1),
        Err(Error::EntryOutOfBounds { ordinal: 1, .. })
    ));
    assert!(!archive.is_resolved(1));
    assert_eq!(archive.resolve(0).unwrap().data(), b"first payload");
}

#[test]
fn test_missing_data_file_keeps_cached_entries() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .stored("a", b"aaa")
        .stored("b", b"bbb")
        .write(dir.path(), "gone");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();
    let first = archive.resolve(0).unwrap();
    fs::remove_file(&data).unwrap();

    assert!(matches!(archive.resolve(1), Err(Error::Open { .. })));
    assert_eq!(archive.resolve(0).unwrap().data(), first.data());
}

#[test]
fn test_unknown_tags_fail_open() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .raw("odd", b"x".to_vec(), 1, 77, 0)
        .write(dir.path(), "tags");

    assert!(matches!(
        WpkArchive::open(&index, Some(&data), ReadOptions::new()),
        Err(Error::UnsupportedCompression { ordinal: 0, tag: 77 })
    ));
}

#[test]
fn test_rename_affects_later_resolutions_only() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .stored("a", b"aaa")
        .stored("b", b"bbb")
        .write(dir.path(), "rename");

    let archive = WpkArchive::open(&index, Some(&data), ReadOptions::new()).unwrap();
    let resolved = archive.resolve(0).unwrap();

    assert!(archive.rename(0, "renamed_a"));
    assert!(archive.rename(1, "renamed_b"));
    assert!(!archive.rename(9, "nothing"));

    assert_eq!(archive.filename(0).as_deref(), Some("renamed_a"));
    assert_eq!(resolved.filename(), "a.dat");
    assert_eq!(archive.resolve(1).unwrap().filename(), "renamed_b.dat");
}

#[test]
fn test_open_from_data_path_with_signed_index() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (_, data) = ArchiveBuilder::new()
        .with_signature()
        .stored("one", b"1")
        .stored("two", b"22")
        .write(dir.path(), "signed");

    let paths = ArchivePaths::resolve(&data, None).unwrap();
    let archive = WpkArchive::open_paths(paths, ReadOptions::new()).unwrap();

    assert_eq!(archive.record_count(), 2);
    assert_eq!(archive.resolve(1).unwrap().data(), b"22");
}

#[test]
fn test_default_data_path_is_sibling() {
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .stored("x", b"x")
        .write(dir.path(), "sibling");

    let archive = WpkArchive::open(&index, None, ReadOptions::new()).unwrap();
    assert_eq!(archive.data_path(), data.as_path());
    assert_eq!(archive.resolve(0).unwrap().data(), b"x");
}

#[test]
fn test_concurrent_readers_decode_once() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let (index, data) = ArchiveBuilder::new()
        .stored("shared", b"shared content")
        .write(dir.path(), "threads");

    let archive = Arc::new(
        WpkArchive::open_with_codec(
            &index,
            Some(&data),
            ReadOptions::new(),
            CountingCodec::default(),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let archive = Arc::clone(&archive);
            thread::spawn(move || archive.resolve(0).unwrap().data().to_vec())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), b"shared content");
    }
    assert_eq!(CountingCodec::count(&archive.codec().classify), 1);
}
