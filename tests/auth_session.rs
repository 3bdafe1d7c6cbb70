mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{expired_token, user_json, valid_token, Harness};
use recrutamento_client::auth::{GuardDecision, SessionPhase};
use recrutamento_client::error::MSG_EMAIL_JA_CADASTRADO;
use recrutamento_client::navigation::{DASHBOARD_PATH, LOGIN_PATH};
use recrutamento_client::storage::{Storage, TOKEN_KEY, USER_KEY};

async fn mount_validate(h: &Harness, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": true })))
        .expect(times)
        .mount(&h.server)
        .await;
}

async fn mount_me(h: &Harness, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(times)
        .mount(&h.server)
        .await;
}

#[tokio::test]
async fn test_check_auth_twice_within_interval_hits_server_once() {
    let token = valid_token();
    let h = Harness::builder().with_token(&token).build().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;
    mount_me(&h, 1).await;

    assert!(h.state.session.check_auth().await);

    // sem cache de validação, só a janela de 3 s evita a segunda chamada
    h.state.session.gateway().cache().clear();
    h.advance(Duration::from_millis(2_999));
    assert!(h.state.session.check_auth().await);

    let session = h.state.session.snapshot().await;
    assert_eq!(session.phase(), SessionPhase::Authenticated);
    assert_eq!(session.user.unwrap().email, "ana@exemplo.com");
}

#[tokio::test]
async fn test_check_auth_at_interval_boundary_validates_again() {
    let h = Harness::builder().with_token(&valid_token()).build().await;
    mount_validate(&h, 2).await;
    mount_me(&h, 1).await;

    assert!(h.state.session.check_auth().await);

    h.state.session.gateway().cache().clear();
    h.advance(Duration::from_millis(3_000));
    assert!(h.state.session.check_auth().await);

    assert_eq!(h.requests_to("/api/auth/validate").await, 2);
}

#[tokio::test]
async fn test_token_change_within_interval_is_checked_again() {
    let first = valid_token();
    let second = common::make_token(json!({ "sub": "43", "exp": common::NOW_MILLIS / 1000 + 7200 }));
    let h = Harness::builder().with_token(&first).build().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .and(header("authorization", format!("Bearer {}", first).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .and(header("authorization", format!("Bearer {}", second).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;
    mount_me(&h, 2).await;

    assert!(h.state.session.check_auth().await);

    h.state.session.set_token(Some(second.clone())).await.unwrap();
    h.advance(Duration::from_millis(1_000));
    assert!(h.state.session.check_auth().await);

    let session = h.state.session.snapshot().await;
    assert_eq!(session.token.as_deref(), Some(second.as_str()));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_response_elsewhere_ends_session() {
    let token = valid_token();
    let h = Harness::builder().at("/vagas").build().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": token, "user": user_json() })),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/vagas"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    mount_validate(&h, 0).await;

    h.state
        .session
        .login("ana@exemplo.com", "segredo")
        .await
        .unwrap();
    assert!(h.state.session.check_auth().await);

    let error = h.state.vagas.listar_vagas().await.unwrap_err();
    assert!(error.is_unauthorized());

    // ainda dentro da janela de 3 s da verificação anterior
    h.advance(Duration::from_millis(100));
    assert!(!h.state.session.is_authenticated().await);
    assert!(!h.state.session.check_auth().await);

    let guard = h.state.auth_required_guard();
    assert_eq!(
        guard.verify(&CancellationToken::new()).await,
        GuardDecision::Redirect(LOGIN_PATH.to_string())
    );
    assert_eq!(h.navigator.redirects(), vec![LOGIN_PATH, LOGIN_PATH]);
}

#[tokio::test]
async fn test_check_after_interval_uses_validation_cache() {
    let h = Harness::builder().with_token(&valid_token()).build().await;
    mount_validate(&h, 1).await;
    mount_me(&h, 1).await;

    assert!(h.state.session.check_auth().await);

    // fora da janela de 3 s, dentro dos 5 min do cache; usuário já persistido
    h.advance(Duration::from_secs(10));
    assert!(h.state.session.check_auth().await);
}

#[tokio::test]
async fn test_cache_expiry_triggers_remote_validation() {
    let h = Harness::builder()
        .with_token(&valid_token())
        .with_user(user_json())
        .build()
        .await;
    mount_validate(&h, 2).await;
    mount_me(&h, 0).await;

    assert!(h.state.session.check_auth().await);
    h.advance(Duration::from_secs(5 * 60));
    assert!(h.state.session.check_auth().await);
}

#[tokio::test]
async fn test_logout_clears_cache_and_old_token_is_revalidated() {
    let token = valid_token();
    let h = Harness::builder().with_token(&token).build().await;
    mount_validate(&h, 2).await;
    mount_me(&h, 2).await;

    assert!(h.state.session.check_auth().await);

    h.state.session.logout().await;
    assert!(h.storage.get(TOKEN_KEY).is_none());
    assert!(h.storage.get(USER_KEY).is_none());
    assert!(!h.state.session.gateway().cache().is_cached(&token));

    h.state.session.set_token(Some(token)).await.unwrap();
    assert!(h.state.session.check_auth().await);
}

#[tokio::test]
async fn test_without_token_returns_false_without_calls() {
    let h = Harness::new().await;
    mount_validate(&h, 0).await;

    assert!(!h.state.session.check_auth().await);
    let session = h.state.session.snapshot().await;
    assert!(session.verified);
    assert_eq!(session.phase(), SessionPhase::Unauthenticated);
}

#[tokio::test]
async fn test_locally_expired_token_skips_server_and_clears_session() {
    let h = Harness::builder()
        .with_token(&expired_token())
        .with_user(user_json())
        .build()
        .await;
    mount_validate(&h, 0).await;

    assert!(!h.state.session.check_auth().await);

    let session = h.state.session.snapshot().await;
    assert!(session.token.is_none());
    assert!(session.user.is_none());
    assert!(session.verified);
    assert!(h.storage.get(TOKEN_KEY).is_none());
    assert!(h.storage.get(USER_KEY).is_none());
}

#[tokio::test]
async fn test_rejected_token_clears_session_and_redirects() {
    let h = Harness::builder()
        .with_token(&valid_token())
        .with_user(user_json())
        .at("/vagas")
        .build()
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token inválido" })))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(!h.state.session.check_auth().await);
    assert_eq!(h.navigator.redirects(), vec![LOGIN_PATH]);
    assert!(h.storage.get(TOKEN_KEY).is_none());
    assert!(h.storage.get(USER_KEY).is_none());

    let session = h.state.session.snapshot().await;
    assert!(session.token.is_none());
    assert!(session.verified);

    // sem token, a próxima verificação não sai do processo
    h.advance(Duration::from_millis(500));
    assert!(!h.state.session.check_auth().await);
}

#[tokio::test]
async fn test_login_seeds_session_and_cache() {
    let token = valid_token();
    let h = Harness::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "ana@exemplo.com", "password": "segredo" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": token, "user": user_json() })),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    mount_validate(&h, 0).await;
    mount_me(&h, 0).await;

    let user = h
        .state
        .session
        .login("ana@exemplo.com", "segredo")
        .await
        .unwrap();
    assert_eq!(user.id, "42");
    assert_eq!(h.storage.get(TOKEN_KEY).as_deref(), Some(token.as_str()));

    let session = h.state.session.snapshot().await;
    assert!(session.is_authenticated());
    assert!(!session.loading);

    // validação em cache e usuário persistido: nenhuma chamada remota
    assert!(h.state.session.check_auth().await);
}

#[tokio::test]
async fn test_login_failure_sets_error_message() {
    let h = Harness::builder().at(LOGIN_PATH).build().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Credenciais inválidas" })),
        )
        .mount(&h.server)
        .await;

    let error = h
        .state
        .session
        .login("ana@exemplo.com", "errada")
        .await
        .unwrap_err();
    assert!(error.is_unauthorized());

    let session = h.state.session.snapshot().await;
    assert_eq!(session.error.as_deref(), Some("Credenciais inválidas"));
    assert!(!session.email_already_exists);
    assert!(!session.loading);
    // já na tela de login: sem redirecionamento
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email_sets_flag() {
    let h = Harness::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "errors": { "email": ["já cadastrado"] } })),
        )
        .mount(&h.server)
        .await;

    let error = h
        .state
        .session
        .register("ana@exemplo.com", "segredo", Some("Ana"))
        .await
        .unwrap_err();
    assert!(error.is_email_exists());

    let session = h.state.session.snapshot().await;
    assert!(session.email_already_exists);
    assert_eq!(session.error.as_deref(), Some(MSG_EMAIL_JA_CADASTRADO));

    h.state.session.clear_errors().await;
    let session = h.state.session.snapshot().await;
    assert!(!session.email_already_exists);
    assert!(session.error.is_none());
}

#[tokio::test]
async fn test_register_validation_error_is_not_duplicate() {
    let h = Harness::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "errors": [{ "message": "Senha muito curta" }] })),
        )
        .mount(&h.server)
        .await;

    let error = h
        .state
        .session
        .register("ana@exemplo.com", "123", None)
        .await
        .unwrap_err();
    assert!(!error.is_email_exists());

    let session = h.state.session.snapshot().await;
    assert!(!session.email_already_exists);
    assert_eq!(session.error.as_deref(), Some("Dados inválidos. Verifique as informações fornecidas."));
}

#[tokio::test]
async fn test_concurrent_check_makes_single_remote_call() {
    let h = Harness::builder()
        .with_token(&valid_token())
        .with_user(user_json())
        .build()
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = h.state.session.clone();
    let (first, second) = tokio::join!(session.check_auth(), session.check_auth());

    // um deles fez a verificação; o outro devolveu o último resultado conhecido
    assert!(first || second);
    assert!(h.state.session.is_authenticated().await);
}

#[tokio::test]
async fn test_cancelled_check_discards_result() {
    let token = valid_token();
    let h = Harness::builder().with_token(&token).build().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&h.server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let outcome = h.state.session.check_auth_cancellable(&cancel).await;
    assert_eq!(outcome, None);

    let session = h.state.session.snapshot().await;
    assert_eq!(session.token.as_deref(), Some(token.as_str()));
    assert!(session.user.is_none());
    assert!(!session.verified);
    assert!(!session.loading);
}

#[tokio::test]
async fn test_auth_required_guard_allows_valid_session() {
    let h = Harness::builder()
        .with_token(&valid_token())
        .at("/vagas")
        .build()
        .await;
    mount_validate(&h, 1).await;
    mount_me(&h, 1).await;

    let guard = h.state.auth_required_guard();
    assert_eq!(guard.verify(&CancellationToken::new()).await, GuardDecision::Allow);
    // sessão já verificada: sem nova chamada
    assert_eq!(guard.verify(&CancellationToken::new()).await, GuardDecision::Allow);
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn test_auth_required_guard_redirects_on_invalid_session() {
    let h = Harness::builder()
        .with_token(&expired_token())
        .at("/vagas")
        .build()
        .await;

    let guard = h.state.auth_required_guard();
    let decision = guard.verify(&CancellationToken::new()).await;

    assert_eq!(decision, GuardDecision::Redirect(LOGIN_PATH.to_string()));
    assert_eq!(h.navigator.redirects(), vec![LOGIN_PATH]);
}

#[tokio::test]
async fn test_public_guard_sends_authenticated_user_to_dashboard() {
    let h = Harness::builder()
        .with_token(&valid_token())
        .with_user(user_json())
        .at(LOGIN_PATH)
        .build()
        .await;
    mount_validate(&h, 1).await;

    let guard = h.state.redirect_if_authenticated_guard();
    let decision = guard.verify(&CancellationToken::new()).await;

    assert_eq!(decision, GuardDecision::Redirect(DASHBOARD_PATH.to_string()));
    assert_eq!(h.navigator.redirects(), vec![DASHBOARD_PATH]);
}

#[tokio::test]
async fn test_guard_cancelled_does_not_navigate() {
    let h = Harness::builder()
        .with_token(&valid_token())
        .at("/vagas")
        .build()
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/validate"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_secs(2)))
        .mount(&h.server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let guard = h.state.auth_required_guard();
    assert_eq!(guard.verify(&cancel).await, GuardDecision::Cancelled);
    assert!(h.navigator.redirects().is_empty());
}
