//! Integration tests for the `occ-pktgen` binary.

use assert_cmd::Command;
use tempfile::TempDir;

use occ_wire::{HEADER_LEN, NO_DATA_COMMAND_TAG, PacketHeader, PacketType};

fn pktgen_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_occ-pktgen"));
    // Suppress tracing output during tests
    cmd.env("RUST_LOG", "error");
    cmd
}

fn walk_headers(stream: &[u8]) -> Vec<PacketHeader> {
    let mut headers = Vec::new();
    let mut offset = 0;
    while offset < stream.len() {
        let header = PacketHeader::decode(&stream[offset..]).expect("valid header");
        offset += header.total_len();
        headers.push(header);
    }
    assert_eq!(offset, stream.len(), "stream ends mid-packet");
    headers
}

#[test]
fn writes_requested_packet_count() {
    let dir = TempDir::new().expect("tempdir");
    let outfile = dir.path().join("events.bin");

    pktgen_cmd()
        .arg("das")
        .arg(&outfile)
        .args(["-c", "5", "-s", "64"])
        .assert()
        .success();

    let stream = std::fs::read(&outfile).expect("read outfile");
    let headers = walk_headers(&stream);
    assert_eq!(headers.len(), 5);
    for header in &headers {
        assert_eq!(header.packet_type().expect("type"), PacketType::EventData);
        assert_eq!(header.total_len(), HEADER_LEN + 64);
    }
}

#[test]
fn size_is_aligned_up_to_a_multiple_of_four() {
    let dir = TempDir::new().expect("tempdir");
    let outfile = dir.path().join("events.bin");

    // 61 aligns up to 64, which is 8 whole event records.
    pktgen_cmd()
        .arg("das")
        .arg(&outfile)
        .args(["-c", "1", "-s", "61"])
        .assert()
        .success();

    let stream = std::fs::read(&outfile).expect("read outfile");
    assert_eq!(walk_headers(&stream)[0].payload_len(), 64);
}

#[test]
fn mps_size_zero_means_no_payload() {
    let dir = TempDir::new().expect("tempdir");
    let outfile = dir.path().join("commands.bin");

    pktgen_cmd()
        .arg("mps")
        .arg(&outfile)
        .args(["-c", "2", "-s", "0", "-d", "3", "-a", "512"])
        .assert()
        .success();

    let stream = std::fs::read(&outfile).expect("read outfile");
    assert_eq!(stream.len(), 2 * HEADER_LEN);
    for header in walk_headers(&stream) {
        assert_eq!(header.word3, NO_DATA_COMMAND_TAG);
        assert_eq!(header.word2 >> 16, 3);
        assert_eq!(header.word4, 512);
    }
}

#[test]
fn oversized_mps_payload_is_clamped() {
    let dir = TempDir::new().expect("tempdir");
    let outfile = dir.path().join("commands.bin");

    pktgen_cmd()
        .arg("mps")
        .arg(&outfile)
        .args(["-c", "1", "-s", "5000"])
        .assert()
        .success();

    let stream = std::fs::read(&outfile).expect("read outfile");
    assert_eq!(walk_headers(&stream)[0].payload_len(), 4092);
}

#[test]
fn uppercase_type_names_are_accepted() {
    let dir = TempDir::new().expect("tempdir");
    let outfile = dir.path().join("events.bin");

    pktgen_cmd()
        .arg("DAS")
        .arg(&outfile)
        .args(["-c", "1", "-s", "8"])
        .assert()
        .success();
}

#[test]
fn unknown_type_is_a_usage_error() {
    let dir = TempDir::new().expect("tempdir");
    let outfile = dir.path().join("out.bin");

    pktgen_cmd()
        .arg("rtdl")
        .arg(&outfile)
        .assert()
        .failure()
        .code(2);
    assert!(!outfile.exists());
}
