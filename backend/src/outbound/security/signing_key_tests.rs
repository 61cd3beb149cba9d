//! Unit tests for signing key resolution.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;

const GOOD_SECRET: &str = "0123456789abcdef0123456789abcdef";

fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[rstest]
#[case(BuildMode::Debug)]
#[case(BuildMode::Release)]
fn configured_secret_takes_precedence(#[case] mode: BuildMode) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("jwt-secret");
    std::fs::write(&path, vec![b'f'; 48]).expect("write secret");
    let env = mock_env(&[(KEY_FILE_ENV, path.to_str().expect("utf-8 path"))]);

    let key = signing_key_from_env(&env, mode, Some(GOOD_SECRET)).expect("key");
    assert_eq!(key.as_bytes(), GOOD_SECRET.as_bytes());
}

#[rstest]
fn secret_file_is_read_when_nothing_is_configured() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("jwt-secret");
    std::fs::write(&path, vec![b'f'; 48]).expect("write secret");
    let env = mock_env(&[(KEY_FILE_ENV, path.to_str().expect("utf-8 path"))]);

    let key = signing_key_from_env(&env, BuildMode::Release, None).expect("key");
    assert_eq!(key.as_bytes().len(), 48);
}

#[rstest]
fn unreadable_secret_file_is_an_error() {
    let env = mock_env(&[(KEY_FILE_ENV, "/nonexistent/jwt-secret")]);
    let err = signing_key_from_env(&env, BuildMode::Debug, None).expect_err("missing file");
    assert!(matches!(err, SigningKeyError::KeyRead { .. }));
}

#[rstest]
fn release_rejects_short_secrets() {
    let env = mock_env(&[]);
    let err = signing_key_from_env(&env, BuildMode::Release, Some("short")).expect_err("short");
    assert!(matches!(
        err,
        SigningKeyError::KeyTooShort {
            length: 5,
            min_len: SIGNING_KEY_MIN_LEN
        }
    ));
}

#[rstest]
fn debug_accepts_short_secrets() {
    let env = mock_env(&[]);
    let key = signing_key_from_env(&env, BuildMode::Debug, Some("short")).expect("key");
    assert_eq!(key.as_bytes(), b"short");
}

#[rstest]
fn release_without_secret_is_missing() {
    let env = mock_env(&[]);
    let err = signing_key_from_env(&env, BuildMode::Release, None).expect_err("missing");
    assert!(matches!(err, SigningKeyError::Missing));
}

#[rstest]
fn debug_without_secret_generates_a_key() {
    let env = mock_env(&[]);
    let first = signing_key_from_env(&env, BuildMode::Debug, None).expect("key");
    let second = signing_key_from_env(&env, BuildMode::Debug, None).expect("key");
    assert_eq!(first.as_bytes().len(), EPHEMERAL_KEY_LEN);
    assert_ne!(first.fingerprint(), second.fingerprint());
}

#[rstest]
fn debug_can_opt_out_of_ephemeral_keys() {
    let env = mock_env(&[(ALLOW_EPHEMERAL_ENV, "0")]);
    let err = signing_key_from_env(&env, BuildMode::Debug, None).expect_err("opted out");
    assert!(matches!(err, SigningKeyError::Missing));
}

#[rstest]
fn release_refuses_ephemeral_keys() {
    let env = mock_env(&[(ALLOW_EPHEMERAL_ENV, "yes")]);
    let err = signing_key_from_env(&env, BuildMode::Release, None).expect_err("refused");
    assert!(matches!(err, SigningKeyError::EphemeralNotAllowed));
}

#[rstest]
#[case("maybe")]
#[case("")]
fn invalid_ephemeral_flag_is_rejected(#[case] value: &str) {
    let env = mock_env(&[(ALLOW_EPHEMERAL_ENV, value)]);
    let err = signing_key_from_env(&env, BuildMode::Debug, None).expect_err("invalid flag");
    assert!(matches!(
        err,
        SigningKeyError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            ..
        }
    ));
}

#[rstest]
fn fingerprint_is_stable_and_redacts_debug_output() {
    let key = SigningKey::from_bytes(GOOD_SECRET);
    assert_eq!(key.fingerprint(), key.clone().fingerprint());
    assert_eq!(key.fingerprint(), key.fingerprint().to_lowercase());

    let rendered = format!("{key:?}");
    assert!(!rendered.contains(GOOD_SECRET));
    assert!(rendered.contains(&key.fingerprint()));
}
