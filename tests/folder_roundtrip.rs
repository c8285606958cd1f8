//! 目录加密/解密流水线测试

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use tempfile::tempdir;

use imgvault::{Key, VaultError};

fn key() -> Key {
    imgvault::validate_key(b"folder-key-16byt").expect("valid key")
}

fn write_images(dir: &Path, files: &[(&str, &str)]) {
    fs::create_dir_all(dir).expect("create input dir");
    for (name, bytes) in files {
        fs::write(dir.join(name), bytes).expect("write image");
    }
}

#[test]
fn encrypt_decrypt_folder_roundtrip_in_display_order() {
    let temp = tempdir().expect("create temp dir");
    let input_dir = temp.path().join("plain");
    let encrypted_dir = temp.path().join("nested/encrypted");

    write_images(
        &input_dir,
        &[
            ("img(2).png", "two"),
            ("img(10).png", "ten"),
            ("img(1).png", "one"),
            ("cover.png", "cover"),
        ],
    );

    let report = imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).expect("encrypt folder");
    assert!(report.is_complete());
    assert_eq!(report.encrypted.len(), 4);
    for name in ["img(2).png", "img(10).png", "img(1).png", "cover.png"] {
        assert!(encrypted_dir.join(format!("{name}.enc")).exists(), "{name}");
    }

    let report = imgvault::decrypt_folder(&key(), &encrypted_dir).expect("decrypt folder");
    assert!(report.is_complete());
    assert_eq!(
        report.names().collect::<Vec<_>>(),
        vec![
            "img(1).png.enc",
            "img(2).png.enc",
            "img(10).png.enc",
            "cover.png.enc",
        ]
    );

    let records = report.into_records();
    let bytes: Vec<Vec<u8>> = records.iter().map(|r| r.bytes.clone()).collect();
    assert_eq!(
        bytes,
        vec![
            b"one".to_vec(),
            b"two".to_vec(),
            b"ten".to_vec(),
            b"cover".to_vec()
        ]
    );
    assert_eq!(records[0].original_name(), "img(1).png");
}

#[test]
fn encrypt_only_touches_allow_listed_images() {
    let temp = tempdir().expect("create temp dir");
    let input_dir = temp.path().join("plain");
    let encrypted_dir = temp.path().join("encrypted");

    write_images(
        &input_dir,
        &[
            ("a.PNG", "a"),
            ("b.JpEg", "b"),
            ("c.bmp", "c"),
            ("d.gif", "d"),
            ("e.jpg", "e"),
            ("notes.txt", "skip"),
            ("photo.webp", "skip"),
        ],
    );
    fs::create_dir(input_dir.join("subdir.png")).unwrap();

    let report = imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).expect("encrypt folder");

    assert_eq!(report.encrypted.len(), 5);
    assert_eq!(report.skipped, 3);
    assert!(report.failures.is_empty());
    assert!(encrypted_dir.join("a.PNG.enc").exists());
    assert!(encrypted_dir.join("b.JpEg.enc").exists());
    assert!(!encrypted_dir.join("notes.txt.enc").exists());
    assert!(!encrypted_dir.join("subdir.png.enc").exists());
}

#[test]
fn encrypt_is_idempotent_on_existing_destination() {
    let temp = tempdir().expect("create temp dir");
    let input_dir = temp.path().join("plain");
    let encrypted_dir = temp.path().join("encrypted");
    write_images(&input_dir, &[("x.png", "first")]);

    imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).expect("first run");
    fs::write(input_dir.join("x.png"), b"second").unwrap();
    imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).expect("second run");

    let report = imgvault::decrypt_folder(&key(), &encrypted_dir).unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].bytes, b"second");
}

#[test]
fn missing_source_is_fatal() {
    let temp = tempdir().expect("create temp dir");
    let missing = temp.path().join("missing");
    let out = temp.path().join("out");

    let result = imgvault::encrypt_folder(&key(), &missing, &out);
    assert!(matches!(result, Err(VaultError::SourceNotFound(p)) if p == missing));
    assert!(!out.exists(), "no work before the source check");

    let result = imgvault::decrypt_folder(&key(), &missing);
    assert!(matches!(result, Err(VaultError::SourceNotFound(_))));
}

#[test]
fn corrupted_container_does_not_stop_the_batch() {
    let temp = tempdir().expect("create temp dir");
    let input_dir = temp.path().join("plain");
    let encrypted_dir = temp.path().join("encrypted");
    write_images(
        &input_dir,
        &[("p(3).png", "three"), ("p(1).png", "one"), ("p(2).png", "two")],
    );
    imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).unwrap();

    let victim = encrypted_dir.join("p(2).png.enc");
    let mut bytes = fs::read(&victim).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&victim, bytes).unwrap();

    let report = imgvault::decrypt_folder(&key(), &encrypted_dir).expect("decrypt folder");

    assert_eq!(
        report.names().collect::<Vec<_>>(),
        vec!["p(1).png.enc", "p(3).png.enc"]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, victim);
    assert!(matches!(
        report.failures[0].error,
        VaultError::AuthenticationFailed
    ));
    assert!(!report.is_complete());
}

#[test]
fn short_and_foreign_files_are_reported_or_ignored() {
    let temp = tempdir().expect("create temp dir");
    let encrypted_dir = temp.path().join("encrypted");
    let input_dir = temp.path().join("plain");
    write_images(&input_dir, &[("ok.png", "fine")]);
    imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).unwrap();

    fs::write(encrypted_dir.join("stub.PNG.ENC"), b"short").unwrap();
    fs::write(encrypted_dir.join("readme.txt"), b"ignored").unwrap();

    let report = imgvault::decrypt_folder(&key(), &encrypted_dir).unwrap();

    assert_eq!(report.names().collect::<Vec<_>>(), vec!["ok.png.enc"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        VaultError::MalformedContainer { len: 5, .. }
    ));
}

#[test]
fn encrypt_batch_continues_after_write_failure() {
    let temp = tempdir().expect("create temp dir");
    let input_dir = temp.path().join("plain");
    let encrypted_dir = temp.path().join("encrypted");
    write_images(&input_dir, &[("a.png", "a"), ("b.png", "b")]);

    // 目标位置被目录占据，a.png 的原子重命名必然失败
    fs::create_dir_all(encrypted_dir.join("a.png.enc")).unwrap();

    let report = imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).expect("encrypt folder");

    assert_eq!(report.encrypted.len(), 1);
    assert_eq!(report.encrypted[0].source, input_dir.join("b.png"));
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("a.png"));
    assert!(matches!(report.failures[0].error, VaultError::Io(_)));
    assert!(!report.is_complete());

    assert!(encrypted_dir.join("a.png.enc").is_dir());
    let leftovers: Vec<_> = fs::read_dir(&encrypted_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(".tmp-"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[test]
fn decrypt_folder_with_wrong_key_yields_only_failures() {
    let temp = tempdir().expect("create temp dir");
    let input_dir = temp.path().join("plain");
    let encrypted_dir = temp.path().join("encrypted");
    write_images(&input_dir, &[("a.png", "a"), ("b.png", "b")]);

    imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).expect("encrypt folder");

    let wrong = imgvault::validate_key(b"another-key-that-is-32-bytes-ok!").unwrap();
    let report = imgvault::decrypt_folder(&wrong, &encrypted_dir).expect("decrypt folder");

    assert!(report.records.is_empty());
    assert_eq!(report.failures.len(), 2);
    assert!(
        report
            .failures
            .iter()
            .all(|f| matches!(f.error, VaultError::AuthenticationFailed))
    );
}

#[test]
fn cancellation_is_honored_before_the_next_file() {
    let temp = tempdir().expect("create temp dir");
    let input_dir = temp.path().join("plain");
    let encrypted_dir = temp.path().join("encrypted");
    write_images(&input_dir, &[("a.png", "a"), ("b.png", "b")]);

    let cancel = AtomicBool::new(true);

    let report =
        imgvault::encrypt_folder_cancellable(&key(), &input_dir, &encrypted_dir, &cancel).unwrap();
    assert!(report.cancelled);
    assert!(report.encrypted.is_empty());
    assert!(!report.is_complete());

    imgvault::encrypt_folder(&key(), &input_dir, &encrypted_dir).unwrap();
    let report = imgvault::decrypt_folder_cancellable(&key(), &encrypted_dir, &cancel).unwrap();
    assert!(report.cancelled);
    assert!(report.records.is_empty());
}
