//! User directory behaviour end to end over the in-memory repository,
//! including the login → token → gated access scenarios.

use std::sync::Arc;

use chrono::Utc;

use rolegate_auth::{
    provision_superuser, AuthService, AuthzError, AutoProvisioningBackend, CreateUserInput,
    DirectoryError, EmailAddress, LocalPasswordBackend, Principal, Role, StubExternalAuthenticator,
    TokenConfig, TokenIssuer, TokenType, UserDirectory, UserId, UserRepository, UserUpdate,
};
use rolegate_infra::InMemoryUserRepository;

const SECRET: &[u8] = b"directory-test-secret";

struct Fixture {
    repo: Arc<InMemoryUserRepository>,
    directory: UserDirectory<Arc<InMemoryUserRepository>>,
    root: Principal,
}

async fn fixture() -> Fixture {
    let repo = Arc::new(InMemoryUserRepository::new());
    let root_user = provision_superuser(&*repo, "root1", "rootpw").await.unwrap();
    Fixture {
        directory: UserDirectory::new(repo.clone()),
        root: Principal::from_user(&root_user),
        repo,
    }
}

fn issuer() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(SECRET, TokenConfig::default()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn alice_logs_in_as_client_and_is_kept_out_of_the_directory() {
    let fx = fixture().await;
    let backend = Arc::new(AutoProvisioningBackend::new(
        fx.repo.clone(),
        StubExternalAuthenticator,
    ));
    let auth = AuthService::new(backend, issuer());
    let now = Utc::now();

    let pair = auth.login("alice", "anything", now).await.unwrap();
    let claims = auth.issuer().verify(&pair.access, TokenType::Access, now).unwrap();
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.role, Role::Client);

    let alice = auth.resolve_principal(&pair.access, now).await.unwrap();
    assert_eq!(alice.role, Role::Client);

    let stored = fx.repo.find_by_id(alice.user_id).await.unwrap();
    assert!(!stored.has_usable_password());

    let err = fx.directory.list(Some(&alice)).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Authz(AuthzError::Forbidden { .. })));
}

#[tokio::test]
async fn root1_logs_in_locally_and_lists_users_in_id_order() {
    let fx = fixture().await;
    for name in ["zed", "amy"] {
        fx.directory
            .create(Some(&fx.root), CreateUserInput::new(name))
            .await
            .unwrap();
    }

    let backend = Arc::new(LocalPasswordBackend::new(fx.repo.clone()));
    let auth = AuthService::new(backend, issuer());
    let now = Utc::now();

    let pair = auth.login("root1", "rootpw", now).await.unwrap();
    let claims = auth.issuer().verify(&pair.access, TokenType::Access, now).unwrap();
    assert_eq!(claims.role, Role::Root);

    let principal = auth.resolve_principal(&pair.access, now).await.unwrap();
    let users = fx.directory.list(Some(&principal)).await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["root1", "zed", "amy"]);
    assert!(users.windows(2).all(|w| w[0].id < w[1].id));

    let json = serde_json::to_string(&users).unwrap();
    assert!(!json.contains("password"));
    assert!(!json.contains("$argon2"));
}

#[tokio::test]
async fn local_backend_denies_bad_and_passwordless_logins() {
    let fx = fixture().await;
    fx.directory
        .create(Some(&fx.root), CreateUserInput::new("nopass"))
        .await
        .unwrap();
    let auth = AuthService::new(Arc::new(LocalPasswordBackend::new(fx.repo.clone())), issuer());
    let now = Utc::now();

    for (user, pass) in [
        ("root1", "wrong"),
        ("nopass", ""),
        ("nopass", "!"),
        ("ghost", "pw"),
        ("bad name", "pw"),
    ] {
        let err = auth.login(user, pass, now).await.unwrap_err();
        assert_eq!(err, rolegate_auth::AuthError::Denied, "{user}/{pass}");
    }
}

#[tokio::test]
async fn deactivated_user_can_no_longer_use_an_existing_token() {
    let fx = fixture().await;
    let backend = Arc::new(AutoProvisioningBackend::new(
        fx.repo.clone(),
        StubExternalAuthenticator,
    ));
    let auth = AuthService::new(backend, issuer());
    let now = Utc::now();

    let pair = auth.login("dora", "pw", now).await.unwrap();
    let dora = auth.resolve_principal(&pair.access, now).await.unwrap();

    fx.directory
        .update(
            Some(&fx.root),
            dora.user_id,
            UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(auth.resolve_principal(&pair.access, now).await.is_err());
    assert!(auth.login("dora", "pw", now).await.is_err());
}

#[tokio::test]
async fn refresh_requires_a_live_active_user() {
    let fx = fixture().await;
    let backend = Arc::new(AutoProvisioningBackend::new(
        fx.repo.clone(),
        StubExternalAuthenticator,
    ));
    let auth = AuthService::new(backend, issuer());
    let now = Utc::now();

    let eve = auth.login("eve", "pw", now).await.unwrap();
    let frank = auth.login("frank", "pw", now).await.unwrap();
    assert!(auth.refresh(&eve.refresh, now).await.is_ok());

    let eve_id = auth.resolve_principal(&eve.access, now).await.unwrap().user_id;
    fx.directory
        .update(
            Some(&fx.root),
            eve_id,
            UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        auth.refresh(&eve.refresh, now).await.unwrap_err(),
        rolegate_auth::AuthError::Inactive
    );

    let frank_id = auth.resolve_principal(&frank.access, now).await.unwrap().user_id;
    fx.directory.delete(Some(&fx.root), frank_id).await.unwrap();
    assert_eq!(
        auth.refresh(&frank.refresh, now).await.unwrap_err(),
        rolegate_auth::AuthError::NotFound
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Gate
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_operation_distinguishes_unauthenticated_from_forbidden() {
    let fx = fixture().await;
    let target = fx.root.user_id;

    let admin = {
        let created = fx
            .directory
            .create(Some(&fx.root), CreateUserInput::new("adm"))
            .await
            .unwrap();
        let updated = fx
            .directory
            .update(
                Some(&fx.root),
                created.id,
                UserUpdate {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        Principal::from_user(&fx.repo.find_by_id(created.id).await.unwrap())
    };

    for principal in [None, Some(&admin)] {
        let results = [
            fx.directory.list(principal).await.map(|_| ()),
            fx.directory.retrieve(principal, target).await.map(|_| ()),
            fx.directory
                .create(principal, CreateUserInput::new("sneaky"))
                .await
                .map(|_| ()),
            fx.directory
                .update(principal, target, UserUpdate::default())
                .await
                .map(|_| ()),
            fx.directory.delete(principal, target).await,
        ];
        for result in results {
            let err = result.unwrap_err();
            match principal {
                None => assert_eq!(err, DirectoryError::Authz(AuthzError::Unauthenticated)),
                Some(_) => assert!(matches!(
                    err,
                    DirectoryError::Authz(AuthzError::Forbidden { .. })
                )),
            }
        }
    }

    assert_eq!(fx.repo.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// CRUD
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_derives_role_from_superuser_flag_only() {
    let fx = fixture().await;

    let mut input = CreateUserInput::new("boss");
    input.is_superuser = true;
    input.password = Some("pw".into());
    input.email = Some("Boss@Example.COM".into());
    let boss = fx.directory.create(Some(&fx.root), input).await.unwrap();
    assert_eq!(boss.role, Role::Root);
    assert_eq!(boss.email, "Boss@example.com");

    let plain = fx
        .directory
        .create(Some(&fx.root), CreateUserInput::new("plain"))
        .await
        .unwrap();
    assert_eq!(plain.role, Role::Client);
    assert!(plain.is_active);
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let fx = fixture().await;
    let err = fx
        .directory
        .create(Some(&fx.root), CreateUserInput::new("root1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::Conflict(_)));
    assert_eq!(fx.repo.len(), 1);
}

#[tokio::test]
async fn toggling_superuser_after_creation_keeps_the_role() {
    let fx = fixture().await;
    let user = fx
        .directory
        .create(Some(&fx.root), CreateUserInput::new("eve"))
        .await
        .unwrap();

    fx.directory
        .update(
            Some(&fx.root),
            user.id,
            UserUpdate {
                is_superuser: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let stored = fx.repo.find_by_id(user.id).await.unwrap();
    assert!(stored.is_superuser);
    assert_eq!(stored.role, Role::Client);

    fx.directory
        .update(
            Some(&fx.root),
            fx.root.user_id,
            UserUpdate {
                is_superuser: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let root = fx.repo.find_by_id(fx.root.user_id).await.unwrap();
    assert!(!root.is_superuser);
    assert_eq!(root.role, Role::Root);
}

#[tokio::test]
async fn update_edits_profile_fields() {
    let fx = fixture().await;
    let user = fx
        .directory
        .create(Some(&fx.root), CreateUserInput::new("pat"))
        .await
        .unwrap();

    let view = fx
        .directory
        .update(
            Some(&fx.root),
            user.id,
            UserUpdate {
                email: Some(Some(EmailAddress::parse("pat@example.com").unwrap())),
                first_name: Some("Pat".into()),
                last_name: Some("Doe".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(view.email, "pat@example.com");
    assert_eq!(view.first_name, "Pat");
    assert_eq!(view.last_name, "Doe");
    assert_eq!(view.username, "pat");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let fx = fixture().await;
    let missing = UserId::new(999);

    assert_eq!(
        fx.directory.retrieve(Some(&fx.root), missing).await.unwrap_err(),
        DirectoryError::NotFound
    );
    assert_eq!(
        fx.directory
            .update(Some(&fx.root), missing, UserUpdate::default())
            .await
            .unwrap_err(),
        DirectoryError::NotFound
    );
    assert_eq!(
        fx.directory.delete(Some(&fx.root), missing).await.unwrap_err(),
        DirectoryError::NotFound
    );
}

#[tokio::test]
async fn delete_removes_the_record() {
    let fx = fixture().await;
    let user = fx
        .directory
        .create(Some(&fx.root), CreateUserInput::new("temp"))
        .await
        .unwrap();

    fx.directory.delete(Some(&fx.root), user.id).await.unwrap();
    assert_eq!(
        fx.directory.retrieve(Some(&fx.root), user.id).await.unwrap_err(),
        DirectoryError::NotFound
    );
}

#[tokio::test]
async fn provision_superuser_is_idempotent() {
    let fx = fixture().await;
    let before = fx.repo.find_by_id(fx.root.user_id).await.unwrap();

    let again = provision_superuser(&*fx.repo, "root1", "a-new-password").await.unwrap();
    assert_eq!(again, before);
    assert!(again.check_password("rootpw"));
    assert_eq!(fx.repo.len(), 1);
}
