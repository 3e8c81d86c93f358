//! Unit tests for session configuration parsing.

use std::collections::HashMap;
use std::io::Write;

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temporary key file");
    file.write_all(&vec![b'k'; len]).expect("write key bytes");
    file
}

#[fixture]
fn release_key() -> NamedTempFile {
    key_file(SESSION_KEY_MIN_LEN)
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (
            KEY_FILE_ENV,
            key.path().to_string_lossy().into_owned(),
        ),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

fn release_error(vars: HashMap<&'static str, String>) -> SessionConfigError {
    match session_settings_from_env(&mock_env(vars), BuildMode::Release) {
        Ok(_) => panic!("release settings should be rejected"),
        Err(error) => error,
    }
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(release_key: NamedTempFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&release_key);
    vars.remove(missing);

    let error = release_error(vars);
    assert!(
        matches!(error, SessionConfigError::MissingEnv { name } if name == missing),
        "unexpected error: {error}"
    );
}

#[rstest]
#[case("maybe")]
#[case("")]
fn release_rejects_unparseable_cookie_secure(release_key: NamedTempFile, #[case] value: &str) {
    let mut vars = release_vars(&release_key);
    vars.insert(COOKIE_SECURE_ENV, value.to_owned());

    assert!(matches!(
        release_error(vars),
        SessionConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            ..
        }
    ));
}

#[rstest]
fn release_rejects_ephemeral_keys(release_key: NamedTempFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    assert!(matches!(
        release_error(vars),
        SessionConfigError::EphemeralNotAllowed
    ));
}

#[rstest]
fn release_rejects_missing_key_file(release_key: NamedTempFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(KEY_FILE_ENV, "/nonexistent/session_key".to_owned());

    assert!(matches!(
        release_error(vars),
        SessionConfigError::KeyRead { .. }
    ));
}

#[rstest]
fn release_rejects_short_key() {
    let short = key_file(32);
    assert!(matches!(
        release_error(release_vars(&short)),
        SessionConfigError::KeyTooShort { length: 32, .. }
    ));
}

#[rstest]
fn release_rejects_insecure_same_site_none(release_key: NamedTempFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    assert!(matches!(
        release_error(vars),
        SessionConfigError::InsecureSameSiteNone
    ));
}

#[rstest]
fn release_accepts_complete_settings(release_key: NamedTempFile) {
    let mut vars = release_vars(&release_key);
    vars.insert(COOKIE_NAME_ENV, "tracker".to_owned());

    let settings = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .expect("valid release settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
    assert_eq!(settings.cookie_name, "tracker");
}

#[rstest]
fn same_key_file_gives_same_fingerprint(release_key: NamedTempFile) {
    let first = session_settings_from_env(&mock_env(release_vars(&release_key)), BuildMode::Release)
        .expect("first load");
    let second =
        session_settings_from_env(&mock_env(release_vars(&release_key)), BuildMode::Release)
            .expect("second load");

    let fingerprint = first.key_fingerprint();
    assert_eq!(fingerprint, second.key_fingerprint());
    assert_eq!(fingerprint.len(), FINGERPRINT_BYTES * 2);
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
}

#[rstest]
fn debug_defaults_are_secure_and_lax() {
    let mut vars = HashMap::new();
    vars.insert(KEY_FILE_ENV, "/nonexistent/session_key".to_owned());

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
    assert_eq!(settings.cookie_name, DEFAULT_COOKIE_NAME);
}

#[rstest]
#[case("unexpected", SameSite::Lax)]
#[case("strict", SameSite::Strict)]
fn debug_same_site_parsing(
    release_key: NamedTempFile,
    #[case] raw: &str,
    #[case] expected: SameSite,
) {
    let mut vars = release_vars(&release_key);
    vars.insert(SAMESITE_ENV, raw.to_owned());

    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug settings");
    assert_eq!(settings.same_site, expected);
}

#[rstest]
#[case("1", Some(true))]
#[case(" no ", Some(false))]
#[case("Y", Some(true))]
#[case("perhaps", None)]
fn bool_parsing(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}
