//! Integration test for file logging.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_FILE_PATH: when using file mode, the path of the log file (default "logs/signer.log")
//!   Refer to `src/logging/mod.rs` for more details.
use chrono::Utc;
use kms_eth_signer::logging::{compute_rolled_file_path, setup_logging};
use serial_test::serial;
use std::{env, fs, path::Path, thread, time::Duration};

// The logger is process-global, so this is the only test that installs it.
#[test]
#[serial]
fn test_setup_logging_file_mode_creates_log_file() {
    let temp_log_dir = tempfile::tempdir().unwrap();
    let base = temp_log_dir.path().join("nested").join("test_signer.log");

    env::set_var("LOG_MODE", "file");
    env::set_var("LOG_LEVEL", "debug");
    env::set_var("LOG_FILE_PATH", base.to_str().unwrap());

    setup_logging().unwrap();
    log::info!("file logger smoke test");
    // Sleep for logger to flush
    thread::sleep(Duration::from_millis(200));

    let expected_path = compute_rolled_file_path(base.to_str().unwrap(), Utc::now().date_naive());
    assert!(
        Path::new(&expected_path).exists(),
        "Expected log file {} does not exist",
        expected_path
    );
    let contents = fs::read_to_string(&expected_path).unwrap();
    assert!(contents.contains("Logging is successfully configured"));

    // A second installation is rejected rather than panicking.
    assert!(setup_logging().is_err());

    env::remove_var("LOG_MODE");
    env::remove_var("LOG_LEVEL");
    env::remove_var("LOG_FILE_PATH");
}
