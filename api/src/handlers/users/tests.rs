use allerta_common::caller::Role;
use allerta_db::{password, storage::UserStore};
use axum::http::StatusCode;
use serde_json::json;

use crate::handlers::test_support::app;

#[tokio::test]
async fn test_list_users_hides_passwords() {
    let app = app();
    app.seed_user("one@example.com", "secret", Role::User).await;
    app.seed_user("two@example.com", "secret", Role::Operator).await;

    let res = app.request("GET", "/api/users", None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    let users = res.body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());
        assert!(user["self"].as_str().unwrap().starts_with("/api/users/"));
    }
}

#[tokio::test]
async fn test_create_user_sets_location() {
    let app = app();

    let res = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "new@example.com", "password": "pw" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert!(res.body.is_null());
    let location = res.location().to_string();
    assert!(location.starts_with("/api/users/"));

    let res = app.request("GET", &location, None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], "new@example.com");
    assert_eq!(res.body["role"], "user");
    assert_eq!(res.body["self"], location.as_str());
}

#[tokio::test]
async fn test_create_user_stores_hash() {
    let app = app();
    app.request(
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": "hash@example.com", "password": "plain" })),
    )
    .await;

    let stored = app
        .ctx
        .db
        .get_by_email("hash@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "plain");
    assert!(password::verify_password("plain", &stored.password_hash));
}

#[tokio::test]
async fn test_create_user_rejects_invalid_email() {
    let app = app();

    let res = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "not-an-email", "password": "pw" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Invalid email");
}

#[tokio::test]
async fn test_create_user_requires_password() {
    let app = app();

    let res = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "nopw@example.com" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Error in user creation");
}

#[tokio::test]
async fn test_create_user_rejects_duplicate_email() {
    let app = app();
    app.seed_user("dup@example.com", "pw", Role::User).await;

    let res = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "dup@example.com", "password": "pw" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Error in user creation");
}

#[tokio::test]
async fn test_create_user_rejects_unknown_role() {
    let app = app();

    let res = app
        .request(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "r@example.com", "password": "pw", "role": "admin" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_user_unknown_id() {
    let app = app();

    let res = app
        .request("GET", "/api/users/01ARZ3NDEKTSV4RRFFQ69G5FAV", None, None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "User not found");

    let res = app.request("GET", "/api/users/garbage", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user() {
    let app = app();
    let user = app.seed_user("bye@example.com", "pw", Role::User).await;
    let uri = format!("/api/users/{}", user.id);

    let res = app.request("DELETE", &uri, None, None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.request("GET", &uri, None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.request("DELETE", &uri, None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_operator_is_forbidden() {
    let app = app();
    let operator = app.seed_user("op@example.com", "pw", Role::Operator).await;

    let res = app
        .request("DELETE", &format!("/api/users/{}", operator.id), None, None)
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(UserStore::get(&*app.ctx.db, operator.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_update_password() {
    let app = app();
    let user = app.seed_user("pw@example.com", "old", Role::User).await;
    let token = app.token_for(&user);

    let res = app
        .request(
            "PUT",
            &format!("/api/users/{}/password", user.id),
            Some(&token),
            Some(json!({ "oldPassword": "old", "newPassword": "new" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["message"], "Password updated successfully");

    let stored = UserStore::get(&*app.ctx.db, user.id).await.unwrap().unwrap();
    assert!(password::verify_password("new", &stored.password_hash));
    assert!(!password::verify_password("old", &stored.password_hash));
}

#[tokio::test]
async fn test_update_password_with_lowercase_id() {
    let app = app();
    let user = app.seed_user("lower@example.com", "old", Role::User).await;
    let token = app.token_for(&user);

    let res = app
        .request(
            "PUT",
            &format!("/api/users/{}/password", user.id.to_string().to_lowercase()),
            Some(&token),
            Some(json!({ "oldPassword": "old", "newPassword": "new" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let stored = UserStore::get(&*app.ctx.db, user.id).await.unwrap().unwrap();
    assert!(password::verify_password("new", &stored.password_hash));
}

#[tokio::test]
async fn test_update_password_wrong_old_password() {
    let app = app();
    let user = app.seed_user("pw@example.com", "old", Role::User).await;
    let token = app.token_for(&user);

    let res = app
        .request(
            "PUT",
            &format!("/api/users/{}/password", user.id),
            Some(&token),
            Some(json!({ "oldPassword": "wrong", "newPassword": "new" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Incorrect old password");

    let stored = UserStore::get(&*app.ctx.db, user.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, user.password_hash);
}

#[tokio::test]
async fn test_update_password_empty_new_password() {
    let app = app();
    let user = app.seed_user("pw@example.com", "old", Role::User).await;
    let token = app.token_for(&user);

    let res = app
        .request(
            "PUT",
            &format!("/api/users/{}/password", user.id),
            Some(&token),
            Some(json!({ "oldPassword": "old", "newPassword": "" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_password_of_other_user_is_forbidden() {
    let app = app();
    let victim = app.seed_user("victim@example.com", "old", Role::User).await;
    let attacker = app.seed_user("attacker@example.com", "pw", Role::Operator).await;
    let token = app.token_for(&attacker);

    let res = app
        .request(
            "PUT",
            &format!("/api/users/{}/password", victim.id),
            Some(&token),
            Some(json!({ "oldPassword": "old", "newPassword": "new" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let stored = UserStore::get(&*app.ctx.db, victim.id).await.unwrap().unwrap();
    assert_eq!(stored.password_hash, victim.password_hash);
}

#[tokio::test]
async fn test_update_password_requires_token() {
    let app = app();
    let user = app.seed_user("pw@example.com", "old", Role::User).await;

    let res = app
        .request(
            "PUT",
            &format!("/api/users/{}/password", user.id),
            None,
            Some(json!({ "oldPassword": "old", "newPassword": "new" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .request(
            "PUT",
            &format!("/api/users/{}/password", user.id),
            Some("not-a-jwt"),
            Some(json!({ "oldPassword": "old", "newPassword": "new" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_user_alias_changes_password() {
    let app = app();
    let user = app.seed_user("alias@example.com", "old", Role::User).await;
    let token = app.token_for(&user);

    let res = app
        .request(
            "PUT",
            &format!("/api/users/{}", user.id),
            Some(&token),
            Some(json!({ "oldPassword": "old", "newPassword": "fresh" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let stored = UserStore::get(&*app.ctx.db, user.id).await.unwrap().unwrap();
    assert!(password::verify_password("fresh", &stored.password_hash));
}
