use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn tmp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("sonolink-cli-tests");
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir.join(name)
}

fn create_test_file(name: &str, content: &[u8]) -> PathBuf {
    let path = tmp_path(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn run_sonolink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sonolink"))
        .args(args)
        .output()
        .expect("Failed to execute sonolink")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_encode_writes_wav() {
    let input = create_test_file("encode_input.bin", b"Test message");
    let output = tmp_path("encode_output.wav");

    let result = run_sonolink(&["encode", input.to_str().unwrap(), output.to_str().unwrap()]);
    assert!(result.status.success(), "encode failed: {:?}", result);
    assert!(stdout(&result).contains("Encoded to"));

    let reader = hound::WavReader::open(&output).expect("Output is not a WAV file");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);

    // 12 bytes -> 4 codewords + 6 preamble codewords, 21 samples per bit.
    assert_eq!(reader.len(), 10 * 32 * 21);
}

#[test]
fn test_encode_with_init_pips() {
    let input = create_test_file("pips_input.bin", b"Test message");
    let output = tmp_path("pips_output.wav");

    let result = run_sonolink(&[
        "encode",
        "--pips",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "encode failed: {:?}", result);

    let reader = hound::WavReader::open(&output).unwrap();
    // 640 ms of pips ahead of the same 6720 data samples.
    assert_eq!(reader.len(), 28224 + 10 * 32 * 21);
}

#[test]
fn test_encode_fsk_without_preamble() {
    let input = create_test_file("fsk_input.bin", b"abc");
    let output = tmp_path("fsk_output.wav");

    let result = run_sonolink(&[
        "encode",
        "--fsk",
        "--no-preamble",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "encode failed: {:?}", result);
    assert!(stdout(&result).contains("FSK"));

    let reader = hound::WavReader::open(&output).unwrap();
    // One codeword, 44.1 samples per symbol.
    assert_eq!(reader.len(), 1412);
}

#[test]
fn test_encode_rejects_carrier_above_nyquist() {
    let input = create_test_file("bad_carrier.bin", b"x");
    let output = tmp_path("bad_carrier.wav");

    let result = run_sonolink(&[
        "encode",
        "--sample-rate",
        "8000",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("InvalidConfig"));
}

#[test]
fn test_frame_unframe_round_trip() {
    let message = b"Round trip through codeword files";
    let input = create_test_file("frame_input.bin", message);
    let framed = tmp_path("framed.bin");
    let output = tmp_path("unframed.bin");

    let result = run_sonolink(&["frame", input.to_str().unwrap(), framed.to_str().unwrap()]);
    assert!(result.status.success(), "frame failed: {:?}", result);

    let result = run_sonolink(&["unframe", framed.to_str().unwrap(), output.to_str().unwrap()]);
    assert!(result.status.success(), "unframe failed: {:?}", result);

    let decoded = fs::read(&output).unwrap();
    assert_eq!(&decoded[..message.len()], &message[..]);
}

#[test]
fn test_unframe_without_preamble_fails() {
    let input = create_test_file("no_preamble_input.bin", b"abcdef");
    let framed = tmp_path("no_preamble.bin");
    let output = tmp_path("no_preamble_out.bin");

    let result = run_sonolink(&[
        "frame",
        "--no-preamble",
        input.to_str().unwrap(),
        framed.to_str().unwrap(),
    ]);
    assert!(result.status.success());

    let result = run_sonolink(&["unframe", framed.to_str().unwrap(), output.to_str().unwrap()]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("PreambleNotFound"));
}

#[test]
fn test_scan_reports_json() {
    let input = create_test_file("scan_input.bin", b"hello");
    let framed = tmp_path("scan_framed.bin");
    let result = run_sonolink(&["frame", input.to_str().unwrap(), framed.to_str().unwrap()]);
    assert!(result.status.success());

    // Two leading zero bytes push the preamble to bit 16.
    let mut shifted = vec![0u8, 0u8];
    shifted.extend(fs::read(&framed).unwrap());
    let captured = create_test_file("scan_captured.bin", &shifted);

    let result = run_sonolink(&["scan", captured.to_str().unwrap()]);
    assert!(result.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&result)).expect("Invalid JSON");
    assert_eq!(report["bit_offset"], 16);
    assert_eq!(report["match_count"], 6);
    assert_eq!(report["locked"], true);
    assert_eq!(report["payload_offset"], 16 + 6 * 32);

    let empty = create_test_file("scan_empty.bin", &[0u8; 32]);
    let result = run_sonolink(&["scan", empty.to_str().unwrap()]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&result)).unwrap();
    assert_eq!(report["bit_offset"], -1);
    assert_eq!(report["locked"], false);
}
