use sbox_derive::sbox_error;
use std::borrow::Cow;

#[sbox_error]
pub enum PictureError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Forbidden path{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open_missing() -> Result<std::fs::File, PictureError> {
    std::fs::File::open("/definitely/not/here.png").context("Opening picture")
}

#[test]
fn sbox_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/sbox_error_pass.rs");
}

#[test]
fn source_errors_pick_up_context() {
    let err = open_missing().unwrap_err();
    assert_eq!(err.kind(), "Io");
    let rendered = err.to_string();
    assert!(rendered.starts_with("I/O failure (Opening picture): "), "got: {rendered}");
}

#[test]
fn context_overrides_existing_variant_context() {
    let res: Result<(), PictureError> =
        Err(PictureError::Forbidden { message: "../etc/passwd".into(), context: None });
    let err = res.context("Traversal").unwrap_err();
    assert_eq!(err.to_string(), "Forbidden path (Traversal): ../etc/passwd");
    assert_eq!(err.kind(), "Forbidden");
}

#[test]
fn internal_accepts_plain_strings() {
    let from_static: PictureError = "broken".into();
    let from_owned: PictureError = String::from("also broken").into();
    assert_eq!(from_static.to_string(), "Internal error: broken");
    assert_eq!(from_owned.to_string(), "Internal error: also broken");
}

#[test]
fn question_mark_converts_sources() {
    fn run() -> Result<(), PictureError> {
        Err::<(), _>(std::io::Error::other("disk gone"))?;
        Ok(())
    }
    let err = run().unwrap_err();
    assert!(matches!(err, PictureError::Io { context: None, .. }));
}
