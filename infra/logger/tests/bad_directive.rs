use folio_logger::{Logger, LoggerError};

#[test]
fn malformed_directive_is_rejected_before_install() {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }

    let err = Logger::builder("folio").directive("folio=loud").init().expect_err("bad directive");
    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}
