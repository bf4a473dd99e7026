use allerta_common::views::ApiErrorResponse;
use axum::{
    Router,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Method, Request, header},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{
        Components, Info, License, OpenApi, Ref, RefOr,
        path::Operation,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{context::ApiContext, handlers};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the application router and its OpenAPI document.
pub fn make(ctx: ApiContext) -> anyhow::Result<(Router, OpenApi)> {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                let span = info_span!(
                    "http_request",
                    method = req.method().to_string(),
                    request_id = Option::<&str>::None,
                    path = Option::<&str>::None,
                );

                if let Some(request_id) = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                {
                    span.record("request_id", request_id);
                }

                if let Some(path) = req.extensions().get::<MatchedPath>() {
                    span.record("path", path.as_str())
                } else {
                    span.record("path", req.uri().path())
                };

                span
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_credentials(true)
                .allow_origin(ctx.config.public_url.parse::<HeaderValue>()?)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
                .expose_headers([header::LOCATION]),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id));

    let openapi = OpenApi::builder()
        .info(
            Info::builder()
                .title("Allerta API Reference")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Emergency reports and the users who file them."))
                .license(Some(
                    License::builder()
                        .name("Apache 2.0 License")
                        .identifier(Some(env!("CARGO_PKG_LICENSE")))
                        .build(),
                )),
        )
        .build();

    let (router, mut api) = OpenApiRouter::with_openapi(openapi)
        .routes(routes!(handlers::health_check))
        .routes(routes!(
            handlers::users::list_users,
            handlers::users::create_user
        ))
        .routes(routes!(
            handlers::users::get_user,
            handlers::users::update_user,
            handlers::users::delete_user
        ))
        .routes(routes!(handlers::users::update_password))
        .routes(routes!(
            handlers::emergencies::list_emergencies,
            handlers::emergencies::create_emergency
        ))
        .routes(routes!(
            handlers::emergencies::get_emergency,
            handlers::emergencies::update_emergency,
            handlers::emergencies::delete_emergency
        ))
        .routes(routes!(handlers::auth::auth_login))
        .routes(routes!(handlers::auth::auth_whoami))
        .layer(middleware)
        .with_state(ctx)
        .split_for_parts();

    let components = api.components.get_or_insert_with(Components::default);
    components
        .schemas
        .insert(ApiErrorResponse::name().into(), ApiErrorResponse::schema());
    components.add_security_scheme(
        "bearer",
        SecurityScheme::Http(
            HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .build(),
        ),
    );

    api.paths.paths.iter_mut().for_each(|(_path, item)| {
        apply_default_errors(&mut item.get);
        apply_default_errors(&mut item.post);
        apply_default_errors(&mut item.put);
        apply_default_errors(&mut item.delete);
    });

    Ok((router, api))
}

/// Points the error responses of an operation at the shared error body.
/// Operations that take a bearer token also get a 401.
fn apply_default_errors(item: &mut Option<Operation>) {
    let Some(item) = item else {
        return;
    };

    let error_ref = |summary: &str| {
        RefOr::Ref(
            Ref::builder()
                .summary(summary)
                .ref_location_from_schema_name(ApiErrorResponse::name())
                .build(),
        )
    };

    let responses = &mut item.responses.responses;
    if item.security.is_some() {
        responses.insert("401".into(), error_ref("Unauthorized"));
    }
    responses.insert("500".into(), error_ref("Internal server error"));
    for (status, summary) in [("400", "Bad request"), ("403", "Forbidden"), ("404", "Not found")] {
        if responses.contains_key(status) {
            responses.insert(status.into(), error_ref(summary));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::app;

    use super::*;

    #[tokio::test]
    async fn openapi_lists_every_route() {
        let app = app();
        let (_, api) = make(app.ctx.clone()).unwrap();

        for path in [
            "/health",
            "/api/users",
            "/api/users/{id}",
            "/api/users/{id}/password",
            "/api/emergencies",
            "/api/emergencies/{id}",
            "/api/auth/login",
            "/api/auth/me",
        ] {
            assert!(api.paths.paths.contains_key(path), "missing {path}");
        }

        let emergency = &api.paths.paths["/api/emergencies/{id}"];
        assert!(emergency.get.is_some());
        assert!(emergency.put.is_some());
        assert!(emergency.delete.is_some());
    }

    #[tokio::test]
    async fn bearer_routes_document_401() {
        let app = app();
        let (_, api) = make(app.ctx.clone()).unwrap();

        let create = api.paths.paths["/api/emergencies"].post.as_ref().unwrap();
        assert!(create.responses.responses.contains_key("401"));

        let list = api.paths.paths["/api/emergencies"].get.as_ref().unwrap();
        assert!(!list.responses.responses.contains_key("401"));
        assert!(list.responses.responses.contains_key("500"));
    }

    #[tokio::test]
    async fn health_check_answers() {
        let app = app();
        let res = app.request("GET", "/health", None, None).await;
        assert_eq!(res.status, axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_unparseable_public_url() {
        let mut ctx = app().ctx;
        ctx.config.public_url = "bad\nurl".into();
        assert!(make(ctx).is_err());
    }
}
