use allerta_db::{models::DbUlid, password};
use axum::extract::State;

use crate::{context::ApiContext, error::ApiError};

pub mod auth;
pub mod emergencies;
pub mod users;

#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    responses((status = 200, description = "Storage is reachable", body = String))
)]
pub async fn health_check(State(ctx): State<ApiContext>) -> Result<&'static str, ApiError> {
    ctx.db.ping().await?;
    Ok("Healthy")
}

/// Path ids that are not ULIDs cannot name a stored document.
fn parse_id(id: &str) -> Option<DbUlid> {
    DbUlid::from_string(id)
}

/// Hashing runs on the blocking pool.
async fn hash_password(ctx: &ApiContext, plain: String) -> Result<String, ApiError> {
    let cost = ctx.config.bcrypt_cost;
    tokio::task::spawn_blocking(move || password::hash_password(&plain, cost))
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))
}

async fn verify_password(plain: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("Password verification task failed: {e}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use allerta_common::caller::{Identity, Role};
    use allerta_db::{
        models::DbUser,
        password::{MIN_COST, hash_password},
        storage::{UserStore, memory::MemoryStorage},
    };
    use axum::{
        Router,
        body::Body,
        http::{HeaderMap, Request, StatusCode, header},
    };
    use clap::Parser;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{config::AllertaApiConfig, context::ApiContext, server};

    pub struct TestApp {
        pub router: Router,
        pub ctx: ApiContext,
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Value,
    }

    impl TestResponse {
        pub fn location(&self) -> &str {
            self.headers
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
        }
    }

    pub fn app() -> TestApp {
        let config = AllertaApiConfig::try_parse_from([
            "allerta-api",
            "--token-secret",
            "test-secret",
            "--bcrypt-cost",
            "4",
        ])
        .unwrap();
        let ctx = ApiContext::new(config, Arc::new(MemoryStorage::new())).unwrap();
        let (router, _) = server::make(ctx.clone()).unwrap();
        TestApp { router, ctx }
    }

    impl TestApp {
        pub async fn seed_user(&self, email: &str, password: &str, role: Role) -> DbUser {
            let hash = hash_password(password, MIN_COST).unwrap();
            UserStore::create(&*self.ctx.db, DbUser::new(email.into(), hash, role))
                .await
                .unwrap()
        }

        pub fn token_for(&self, user: &DbUser) -> String {
            self.ctx
                .tokens
                .issue(&Identity {
                    id: user.id.to_string(),
                    email: user.email.clone(),
                    role: user.role,
                })
                .unwrap()
        }

        pub async fn request(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> TestResponse {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

            TestResponse {
                status,
                headers,
                body,
            }
        }
    }
}
