use assert_cmd::Command;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn binmap() -> Command {
    Command::cargo_bin("binmap").unwrap()
}

fn create_config() -> NamedTempFile {
    let mut cfg = NamedTempFile::new().unwrap();
    cfg.write_all(br#"{ "open_mode": "create" }"#).unwrap();
    cfg.flush().unwrap();
    cfg
}

#[test]
fn test_bit_set_keeps_other_bytes_under_create_config() {
    let cfg = create_config();
    let data = NamedTempFile::new().unwrap();
    std::fs::write(data.path(), [1u8, 2, 3, 4]).unwrap();

    binmap()
        .arg("--config").arg(cfg.path())
        .args(["bit"]).arg(data.path())
        .args(["--offset", "2", "--bit", "7", "--set", "true"])
        .assert()
        .success();

    assert_eq!(std::fs::read(data.path()).unwrap(), [1, 2, 0x83, 4]);
}

#[test]
fn test_poke_writes_in_place_under_create_config() {
    let cfg = create_config();
    let data = NamedTempFile::new().unwrap();
    std::fs::write(data.path(), [1u8, 2, 3, 4]).unwrap();

    binmap()
        .arg("--config").arg(cfg.path())
        .args(["poke"]).arg(data.path())
        .args(["--offset", "2", "--kind", "u8", "--value", "9"])
        .assert()
        .success();

    assert_eq!(std::fs::read(data.path()).unwrap(), [1, 2, 9, 4]);
}

#[test]
fn test_poke_create_starts_a_new_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fresh.bin");

    binmap()
        .arg("poke").arg(&path)
        .args(["--offset", "0", "--kind", "u8", "--value", "1"])
        .assert()
        .failure();
    assert!(!path.exists());

    binmap()
        .arg("poke").arg(&path)
        .args(["--offset", "0", "--kind", "u16", "--value", "0x1234", "--order", "be", "--create"])
        .assert()
        .success();
    assert_eq!(std::fs::read(&path).unwrap(), [0x12, 0x34]);
}

#[test]
fn test_bit_query_does_not_create_or_modify() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nonexist.bin");

    binmap()
        .arg("bit").arg(&missing)
        .args(["--offset", "0", "--bit", "0"])
        .assert()
        .failure();
    assert!(!missing.exists());

    let present = dir.path().join("flags.bin");
    std::fs::write(&present, [0x05u8]).unwrap();
    let out = binmap()
        .arg("bit").arg(&present)
        .args(["--offset", "0", "--bit", "2"])
        .assert()
        .success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("0b00000101"));
    assert!(stdout.contains("= true"));
    assert_eq!(std::fs::read(&present).unwrap(), [0x05]);
}

#[test]
fn test_peek_huge_width_reads_to_end() {
    let data = NamedTempFile::new().unwrap();
    std::fs::write(data.path(), b"ab").unwrap();

    let out = binmap()
        .arg("peek").arg(data.path())
        .args(["--offset", "0", "--kind", "str", "--width", "4611686018427387904"])
        .assert()
        .success();
    assert_eq!(String::from_utf8(out.get_output().stdout.clone()).unwrap().trim(), "ab");
}
