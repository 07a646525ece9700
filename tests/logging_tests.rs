use storyloom::AppError;
use storyloom::logging::{self, LOG_FILE};
use tempfile::tempdir;

// The logger is process-wide, so everything about it lives in this one test.
#[test]
fn test_file_logger() {
    let dir = tempdir().unwrap();
    let log_dir = dir.path().join("data");

    logging::init(log_dir.clone(), false).unwrap();
    log::info!("Studio opened for logging");
    log::debug!("Hidden below info level");

    let written = std::fs::read_to_string(log_dir.join(LOG_FILE)).unwrap();
    assert!(written.contains("INFO"));
    assert!(written.contains("Studio opened for logging"));
    assert!(!written.contains("Hidden below info level"));

    // A second logger cannot be installed.
    assert!(matches!(
        logging::init(log_dir, true),
        Err(AppError::Logger(_))
    ));
}
