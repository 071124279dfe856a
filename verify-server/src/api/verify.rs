// verify-server/src/api/verify.rs
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use common::privy::{AuthTokenClaims, TokenVerifier};
use common::token::{bearer_token, select_token, PRIVY_TOKEN_COOKIE};
use common::{describe_token, AuthError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VerifySuccessResponse {
    pub claims: AuthTokenClaims,
}

/// Verify the caller's Privy token and echo its claims.
///
/// The `privy-token` cookie wins over the `Authorization` header. Errors
/// render as `401 {"error": ...}` through `AuthError`'s `ResponseError` impl.
pub async fn verify(
    req: HttpRequest,
    verifier: web::Data<dyn TokenVerifier>,
) -> Result<HttpResponse, AuthError> {
    let header_token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);
    let cookie_token = req
        .cookie(PRIVY_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string());

    tracing::info!("Header auth token: {}", describe_token(header_token.as_deref()));
    tracing::info!("Cookie auth token: {}", describe_token(cookie_token.as_deref()));

    let token = select_token(cookie_token, header_token).ok_or(AuthError::MissingToken)?;

    match verifier.verify_auth_token(&token).await {
        Ok(claims) => {
            tracing::info!(
                user_id = %claims.user_id,
                session_id = %claims.session_id,
                "Verified claims"
            );
            Ok(HttpResponse::Ok().json(VerifySuccessResponse { claims }))
        }
        Err(e) => {
            tracing::error!("Token verification error: {}", e);
            // Lookup and network failures are reported as rejections too
            Err(AuthError::Verification(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use common::privy::{PrivyClient, PRIVY_ISSUER};
    use common::PrivyConfig;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::{SystemTime, UNIX_EPOCH};

    const PRIVATE_KEY: &str = include_str!("../../../fixtures/privy_es256_private.pem");
    const PUBLIC_KEY: &str = include_str!("../../../fixtures/privy_es256_public.pem");
    const APP_ID: &str = "test-app";

    /// Accepts any token and remembers which one it was handed
    #[derive(Default)]
    struct RecordingVerifier {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TokenVerifier for RecordingVerifier {
        async fn verify_auth_token(&self, token: &str) -> Result<AuthTokenClaims, AuthError> {
            self.seen.lock().unwrap().push(token.to_string());
            Ok(AuthTokenClaims {
                app_id: APP_ID.to_string(),
                issuer: PRIVY_ISSUER.to_string(),
                issued_at: 0,
                expiration: 0,
                session_id: "session-1".to_string(),
                user_id: format!("user-for-{}", token),
                linked_accounts: None,
            })
        }
    }

    struct RejectingVerifier;

    #[async_trait]
    impl TokenVerifier for RejectingVerifier {
        async fn verify_auth_token(&self, _token: &str) -> Result<AuthTokenClaims, AuthError> {
            Err(AuthError::Verification("Authentication token expired".to_string()))
        }
    }

    fn data(verifier: Arc<dyn TokenVerifier>) -> web::Data<dyn TokenVerifier> {
        web::Data::from(verifier)
    }

    macro_rules! init_app {
        ($verifier:expr) => {
            test::init_service(
                App::new()
                    .app_data(data($verifier))
                    .configure(crate::api::configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let verifier = Arc::new(RecordingVerifier::default());
        let app = init_app!(verifier.clone());

        let req = test::TestRequest::get().uri("/api/verify").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Missing auth token" }));
        assert!(verifier.seen.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_cookie_token_is_used() {
        let verifier = Arc::new(RecordingVerifier::default());
        let app = init_app!(verifier.clone());

        let req = test::TestRequest::get()
            .uri("/api/verify")
            .cookie(Cookie::new(PRIVY_TOKEN_COOKIE, "abc"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["claims"]["userId"], "user-for-abc");
        assert_eq!(*verifier.seen.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[actix_web::test]
    async fn test_cookie_takes_precedence_over_header() {
        let verifier = Arc::new(RecordingVerifier::default());
        let app = init_app!(verifier.clone());

        let req = test::TestRequest::post()
            .uri("/api/verify")
            .cookie(Cookie::new(PRIVY_TOKEN_COOKIE, "from-cookie"))
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(*verifier.seen.lock().unwrap(), vec!["from-cookie".to_string()]);
    }

    #[actix_web::test]
    async fn test_header_token_is_used_without_cookie() {
        let verifier = Arc::new(RecordingVerifier::default());
        let app = init_app!(verifier.clone());

        let req = test::TestRequest::post()
            .uri("/api/verify")
            .insert_header((header::AUTHORIZATION, "Bearer def"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(*verifier.seen.lock().unwrap(), vec!["def".to_string()]);
    }

    #[actix_web::test]
    async fn test_verification_failure_reason_is_propagated() {
        let app = init_app!(Arc::new(RejectingVerifier));

        let req = test::TestRequest::get()
            .uri("/api/verify")
            .insert_header((header::AUTHORIZATION, "Bearer stale"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Authentication token expired" }));
    }

    #[actix_web::test]
    async fn test_signed_privy_token_round_trip() {
        let privy = PrivyClient::new(PrivyConfig {
            app_id: APP_ID.to_string(),
            verification_key: Some(PUBLIC_KEY.to_string()),
            ..PrivyConfig::default()
        })
        .unwrap();
        let app = init_app!(Arc::new(privy));

        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
        let token = encode(
            &Header::new(Algorithm::ES256),
            &json!({
                "sid": "session-9",
                "iss": PRIVY_ISSUER,
                "iat": now,
                "exp": now + 600,
                "aud": APP_ID,
                "sub": "did:privy:player"
            }),
            &EncodingKey::from_ec_pem(PRIVATE_KEY.as_bytes()).unwrap(),
        )
        .unwrap();

        let req = test::TestRequest::get()
            .uri("/api/verify")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["claims"]["appId"], APP_ID);
        assert_eq!(body["claims"]["userId"], "did:privy:player");
        assert_eq!(body["claims"]["sessionId"], "session-9");
    }

    #[actix_web::test]
    async fn test_api_index_describes_service() {
        let app = init_app!(Arc::new(RejectingVerifier));

        let req = test::TestRequest::get().uri("/api/").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "Privy Auth Demo API");
    }
}
