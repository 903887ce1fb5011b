//! Account flows against the in-memory store.

use jotter_core::{
    AccountService, AuthConfig, AuthError, Error, HashParams, MemoryStore, RevocationLedger,
    RevokeOutcome, SignupRequest, Store,
};

fn service() -> AccountService {
    let config =
        AuthConfig::new("accounts-test-secret").with_hash_params(HashParams::insecure_fast());
    AccountService::new(&config).unwrap()
}

fn signup_req(username: &str, email: &str, password: &str) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_signup_then_login_resolves_to_same_user() {
    let store = MemoryStore::new();
    let accounts = service();

    let mut uow = store.begin().await.unwrap();
    let user = accounts
        .signup(uow.as_mut(), &signup_req("alice", "Alice@X.com", "Secret123"))
        .await
        .unwrap();
    uow.commit().await.unwrap();
    assert_eq!(user.email, "alice@x.com");

    let mut uow = store.begin().await.unwrap();
    let token = accounts
        .login(uow.as_mut(), "alice@x.com", "Secret123")
        .await
        .unwrap();
    let header = format!("Bearer {}", token);
    let subject = accounts
        .validator()
        .authenticate(uow.as_mut(), Some(&header))
        .await
        .unwrap();
    assert_eq!(subject, user.id);
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let store = MemoryStore::new();
    let accounts = service();
    let mut uow = store.begin().await.unwrap();
    accounts
        .signup(uow.as_mut(), &signup_req("alice", "alice@x.com", "Secret123"))
        .await
        .unwrap();

    assert!(accounts
        .login(uow.as_mut(), "  ALICE@x.com ", "Secret123")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let store = MemoryStore::new();
    let accounts = service();
    let mut uow = store.begin().await.unwrap();
    accounts
        .signup(uow.as_mut(), &signup_req("alice", "alice@x.com", "Secret123"))
        .await
        .unwrap();

    for req in [
        signup_req("alice", "new@x.com", "Secret123"),
        signup_req("bob", "ALICE@x.com", "Secret123"),
    ] {
        let err = accounts.signup(uow.as_mut(), &req).await.unwrap_err();
        match err {
            Error::Conflict(msg) => assert_eq!(msg, "Username or email already exists"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_signup_validation() {
    let store = MemoryStore::new();
    let accounts = service();
    let mut uow = store.begin().await.unwrap();

    for req in [
        signup_req("al", "alice@x.com", "Secret123"),
        signup_req("alice", "not-an-email", "Secret123"),
        signup_req("alice", "alice@x.com", "short"),
        signup_req("alice", "alice@x.com", "nouppercase"),
    ] {
        let err = accounts.signup(uow.as_mut(), &req).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{:?}", err);
    }
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let store = MemoryStore::new();
    let accounts = service();
    let mut uow = store.begin().await.unwrap();
    accounts
        .signup(uow.as_mut(), &signup_req("alice", "alice@x.com", "Secret123"))
        .await
        .unwrap();

    let wrong_password = accounts
        .login(uow.as_mut(), "alice@x.com", "Wrong1234")
        .await
        .unwrap_err();
    let unknown_email = accounts
        .login(uow.as_mut(), "nobody@x.com", "Secret123")
        .await
        .unwrap_err();

    assert!(matches!(
        wrong_password,
        Error::Auth(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        unknown_email,
        Error::Auth(AuthError::InvalidCredentials)
    ));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let store = MemoryStore::new();
    let accounts = service();
    let mut uow = store.begin().await.unwrap();
    accounts
        .signup(uow.as_mut(), &signup_req("alice", "alice@x.com", "Secret123"))
        .await
        .unwrap();
    let token = accounts
        .login(uow.as_mut(), "alice@x.com", "Secret123")
        .await
        .unwrap();
    let header = format!("Bearer {}", token);

    let outcome = accounts.logout(uow.as_mut(), Some(&header)).await.unwrap();
    assert_eq!(outcome, RevokeOutcome::Revoked);
    assert!(uow.is_revoked(&token).await.unwrap());

    let err = accounts
        .logout(uow.as_mut(), Some(&header))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::Revoked)));

    let err = accounts
        .validator()
        .authenticate(uow.as_mut(), Some(&header))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::Revoked)));
}

#[tokio::test]
async fn test_logout_with_malformed_header_is_rejected() {
    let store = MemoryStore::new();
    let accounts = service();
    let mut uow = store.begin().await.unwrap();

    let err = accounts
        .logout(uow.as_mut(), Some("Token abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::MalformedHeader)));
}

#[tokio::test]
async fn test_change_password() {
    let store = MemoryStore::new();
    let accounts = service();
    let mut uow = store.begin().await.unwrap();
    let user = accounts
        .signup(uow.as_mut(), &signup_req("alice", "alice@x.com", "Secret123"))
        .await
        .unwrap();
    let old_token = accounts
        .login(uow.as_mut(), "alice@x.com", "Secret123")
        .await
        .unwrap();

    let err = accounts
        .change_password(uow.as_mut(), user.id, "Wrong1234", "Newpass123")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::IncorrectPassword)));

    let err = accounts
        .change_password(uow.as_mut(), user.id, "Secret123", "weak")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    accounts
        .change_password(uow.as_mut(), user.id, "Secret123", "Newpass123")
        .await
        .unwrap();

    assert!(accounts
        .login(uow.as_mut(), "alice@x.com", "Secret123")
        .await
        .is_err());
    assert!(accounts
        .login(uow.as_mut(), "alice@x.com", "Newpass123")
        .await
        .is_ok());

    // Tokens issued before the change stay valid.
    let header = format!("Bearer {}", old_token);
    assert_eq!(
        accounts
            .validator()
            .authenticate(uow.as_mut(), Some(&header))
            .await
            .unwrap(),
        user.id
    );
}
