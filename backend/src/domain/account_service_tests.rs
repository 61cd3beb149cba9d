//! Tests for the account service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockPasswordHasher, MockSessionTokenCodec, MockUserRepository, UserAccount,
};
use crate::domain::{ErrorCode, PasswordHash, SessionToken, Username};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 20, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

type TestService = AccountService<MockUserRepository, MockPasswordHasher, MockSessionTokenCodec>;

fn make_service(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockSessionTokenCodec,
) -> TestService {
    AccountService::new(
        Arc::new(users),
        Arc::new(hasher),
        Arc::new(tokens),
        Arc::new(FixtureClock {
            utc_now: fixture_now(),
        }),
    )
}

fn name(raw: &str) -> Username {
    Username::new(raw).expect("valid username")
}

#[fixture]
fn credentials() -> LoginCredentials {
    LoginCredentials::try_from_parts("budi", "rahasia").expect("valid credentials")
}

fn identity(role: Role) -> Identity {
    Identity {
        id: UserId::new(1),
        username: name("admin"),
        role,
    }
}

fn hashing_hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(PasswordHash::new(format!("hashed:{password}"))));
    hasher
}

fn inserting_repo(existing: u64) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_count().times(1).return_once(move || Ok(existing));
    users.expect_insert().times(1).returning(|new_user| {
        assert_eq!(new_user.password_hash.as_str(), "hashed:rahasia");
        Ok(User {
            id: UserId::new(9),
            username: new_user.username.clone(),
            role: new_user.role,
        })
    });
    users
}

#[rstest]
#[case(0, Role::Admin)]
#[case(1, Role::User)]
#[case(5, Role::User)]
#[tokio::test]
async fn register_promotes_only_the_first_account(
    credentials: LoginCredentials,
    #[case] existing: u64,
    #[case] expected: Role,
) {
    let service = make_service(
        inserting_repo(existing),
        hashing_hasher(),
        MockSessionTokenCodec::new(),
    );

    let role = service.register(&credentials).await.expect("register succeeds");
    assert_eq!(role, expected);
}

#[rstest]
#[tokio::test]
async fn register_maps_duplicate_username_to_conflict(credentials: LoginCredentials) {
    let mut users = MockUserRepository::new();
    users.expect_count().return_once(|| Ok(1));
    users
        .expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate_username("budi")));
    let service = make_service(users, hashing_hasher(), MockSessionTokenCodec::new());

    let err = service.register(&credentials).await.expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn register_maps_connection_failure_to_unavailable(credentials: LoginCredentials) {
    let mut users = MockUserRepository::new();
    users
        .expect_count()
        .return_once(|| Err(UserPersistenceError::connection("pool closed")));
    let service = make_service(users, MockPasswordHasher::new(), MockSessionTokenCodec::new());

    let err = service.register(&credentials).await.expect_err("unavailable");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

fn stored_account() -> UserAccount {
    UserAccount {
        user: User {
            id: UserId::new(4),
            username: name("budi"),
            role: Role::User,
        },
        password_hash: PasswordHash::new("stored"),
    }
}

#[rstest]
#[tokio::test]
async fn login_issues_token_with_identity_claims(credentials: LoginCredentials) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .return_once(|_| Ok(Some(stored_account())));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().return_once(|_, _| Ok(true));
    let mut tokens = MockSessionTokenCodec::new();
    tokens
        .expect_issue()
        .withf(|identity, issued_at| {
            identity.id == UserId::new(4)
                && identity.username.as_ref() == "budi"
                && identity.role == Role::User
                && *issued_at == fixture_now()
        })
        .return_once(|_, _| Ok(SessionToken::new("signed")));
    let service = make_service(users, hasher, tokens);

    let session = service.login(&credentials).await.expect("login succeeds");
    assert_eq!(session.token.as_str(), "signed");
    assert_eq!(session.username.as_ref(), "budi");
    assert_eq!(session.role, Role::User);
}

#[rstest]
#[tokio::test]
async fn login_failures_are_indistinguishable(credentials: LoginCredentials) {
    let mut unknown_users = MockUserRepository::new();
    unknown_users
        .expect_find_by_username()
        .return_once(|_| Ok(None));
    let unknown = make_service(
        unknown_users,
        MockPasswordHasher::new(),
        MockSessionTokenCodec::new(),
    );

    let mut known_users = MockUserRepository::new();
    known_users
        .expect_find_by_username()
        .return_once(|_| Ok(Some(stored_account())));
    let mut rejecting = MockPasswordHasher::new();
    rejecting.expect_verify().return_once(|_, _| Ok(false));
    let wrong_password = make_service(known_users, rejecting, MockSessionTokenCodec::new());

    let first = unknown.login(&credentials).await.expect_err("unknown user");
    let second = wrong_password
        .login(&credentials)
        .await
        .expect_err("wrong password");
    assert_eq!(first.code(), ErrorCode::Unauthorized);
    assert_eq!(first.code(), second.code());
    assert_eq!(first.message(), second.message());
}

#[rstest]
#[case(SessionTokenError::expired())]
#[case(SessionTokenError::invalid("bad signature"))]
fn authenticate_rejects_bad_tokens(#[case] failure: SessionTokenError) {
    let mut tokens = MockSessionTokenCodec::new();
    tokens.expect_verify().return_once(move |_, _| Err(failure));
    let service = make_service(MockUserRepository::new(), MockPasswordHasher::new(), tokens);

    let err = service.authenticate("token").expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
fn authenticate_checks_expiry_against_clock() {
    let mut tokens = MockSessionTokenCodec::new();
    tokens
        .expect_verify()
        .withf(|token, now| token == "token" && *now == fixture_now())
        .return_once(|_, _| Ok(identity(Role::User)));
    let service = make_service(MockUserRepository::new(), MockPasswordHasher::new(), tokens);

    let resolved = service.authenticate("token").expect("valid token");
    assert_eq!(resolved.role, Role::User);
}

#[rstest]
#[tokio::test]
async fn administration_requires_admin() {
    let service = make_service(
        MockUserRepository::new(),
        MockPasswordHasher::new(),
        MockSessionTokenCodec::new(),
    );
    let caller = identity(Role::User);

    let listed = service.list_users(&caller).await.expect_err("forbidden");
    let deleted = service
        .delete_user(&caller, UserId::new(2))
        .await
        .expect_err("forbidden");
    let updated = service
        .update_role(&caller, UserId::new(2), Role::Admin)
        .await
        .expect_err("forbidden");

    for err in [listed, deleted, updated] {
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn delete_user_reports_missing_accounts(
    #[case] matched: bool,
    #[case] expected: Option<ErrorCode>,
) {
    let mut users = MockUserRepository::new();
    users
        .expect_delete()
        .withf(|id| *id == UserId::new(2))
        .return_once(move |_| Ok(matched));
    let service = make_service(users, MockPasswordHasher::new(), MockSessionTokenCodec::new());

    let result = service.delete_user(&identity(Role::Admin), UserId::new(2)).await;
    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[rstest]
#[tokio::test]
async fn update_role_passes_new_role_through() {
    let mut users = MockUserRepository::new();
    users
        .expect_update_role()
        .withf(|id, role| *id == UserId::new(3) && *role == Role::Admin)
        .return_once(|_, _| Ok(true));
    let service = make_service(users, MockPasswordHasher::new(), MockSessionTokenCodec::new());

    service
        .update_role(&identity(Role::Admin), UserId::new(3), Role::Admin)
        .await
        .expect("role updated");
}
