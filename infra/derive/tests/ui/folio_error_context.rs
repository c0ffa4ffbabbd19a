use folio_derive::folio_error;
use std::borrow::Cow;

#[folio_error]
pub enum LookupError {
    #[error("Lookup failed{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), LookupError> {
    Err::<(), _>(std::io::Error::other("disk")).context("Reading catalog")
}

fn lookup() -> Result<(), LookupError> {
    Err::<(), _>(LookupError::Missing { message: "project".into(), context: None }).context("By id")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (Reading catalog): disk");

    let err = lookup().unwrap_err();
    assert_eq!(err.to_string(), "Lookup failed (By id): project");
}
