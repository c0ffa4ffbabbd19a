use folio_logger::{Logger, LoggerError};

#[test]
fn init_twice_returns_subscriber_error() {
    let _logger = Logger::builder("folio-first").init().expect("first init should succeed");

    let err = Logger::builder("folio-second").init().expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "expected subscriber error for second init");
}
