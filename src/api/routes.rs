use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    let mut router = Router::new()
        // Gallery
        .route("/api/images", get(handlers::list_images))
        .route("/images/:id", get(handlers::get_image))
        .route(
            "/upload",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/images/:id", put(handlers::update_image))
        .route("/api/images/:id", delete(handlers::delete_image))
        .route("/imageRoute/reorder", put(handlers::reorder_images))
        // Landing-page slideshow
        .route("/api/landing-page-gallery", get(handlers::list_slides))
        .route(
            "/api/landing-page-gallery",
            post(handlers::create_slide).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/landing-page-gallery/:id", put(handlers::update_slide))
        .route(
            "/api/landing-page-gallery/:id",
            delete(handlers::delete_slide),
        )
        // Selected series
        .route("/api/selected-series", get(handlers::list_series))
        .route(
            "/api/selected-series",
            post(handlers::create_series).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/selected-series/:id", get(handlers::get_series))
        .route(
            "/api/selected-series/:id",
            put(handlers::update_series).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/selected-series/:id", delete(handlers::delete_series))
        // Selected works
        .route("/api/selected-works", get(handlers::list_works))
        .route("/api/selected-works", post(handlers::create_work))
        .route(
            "/api/selected-works/upload",
            post(handlers::upload_work).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/selected-works/reorder", put(handlers::reorder_works))
        .route(
            "/api/selected-works/series/:selected_series_id",
            get(handlers::list_works_by_series),
        )
        .route("/api/selected-works/:id", get(handlers::get_work))
        .route("/api/selected-works/:id", put(handlers::update_work))
        .route("/api/selected-works/:id", delete(handlers::delete_work))
        // Bio, settings, profile pictures
        .route("/api/bio", get(handlers::get_bio))
        .route("/api/bio", post(handlers::update_bio))
        .route(
            "/api/settings/background-image",
            get(handlers::get_background_image),
        )
        .route(
            "/api/settings/background-image",
            post(handlers::set_background_image),
        )
        .route(
            "/api/profile-pictures",
            get(handlers::list_profile_pictures),
        )
        .route(
            "/api/profile-picture",
            post(handlers::upload_profile_picture).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/profile-pictures/:id",
            delete(handlers::delete_profile_picture),
        )
        // CV documents
        .route("/api/cv", get(handlers::list_documents))
        .route(
            "/api/cv/upload",
            post(handlers::upload_document).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/cv/:id", delete(handlers::delete_document))
        // Auth + admin probe
        .route("/auth/login", post(handlers::login))
        .route("/auth/register", post(handlers::register))
        .route("/admin/dashboard", get(handlers::dashboard))
        // Contact form
        .route("/api/send-email", post(handlers::send_email))
        // Locally stored blobs
        .route("/media/*name", get(handlers::serve_media))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge route is available.");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router
        .fallback(handlers::spa_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.server.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth;
    use crate::testutil::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> (tempfile::TempDir, Arc<AppState>, Router) {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        (dir, state, app)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const BOUNDARY: &str = "test-boundary";

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let (_dir, _state, app) = test_app();
        let req = Request::get("/_internal/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn login_with_unknown_user_is_rejected() {
        let (_dir, _state, app) = test_app();
        let req = json_request(
            "POST",
            "/auth/login",
            serde_json::json!({ "username": "nobody", "password": "pw" }),
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid Credentials");
    }

    #[tokio::test]
    async fn admin_gate_maps_statuses() {
        let (_dir, state, app) = test_app();

        // No token
        let req = Request::get("/admin/dashboard").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Unverifiable token
        let req = Request::get("/admin/dashboard")
            .header("authorization", "garbage")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Valid token, wrong role
        let visitor = auth::create_token(&state.config.auth.jwt_secret, 1, "visitor").unwrap();
        let req = Request::get("/admin/dashboard")
            .header("authorization", format!("Bearer {visitor}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Admin token
        let admin = auth::create_token(&state.config.auth.jwt_secret, 1, "admin").unwrap();
        let req = Request::get("/admin/dashboard")
            .header("authorization", format!("Bearer {admin}"))
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_is_open_only_for_the_first_account() {
        let (_dir, state, app) = test_app();

        let req = json_request(
            "POST",
            "/auth/register",
            serde_json::json!({ "username": "first", "password": "pw123456", "role": "admin" }),
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "first");
        assert!(body.get("passwordHash").is_none());

        // Second registration without a token is refused at the gate
        let req = json_request(
            "POST",
            "/auth/register",
            serde_json::json!({ "username": "second", "password": "pw123456", "role": "visitor" }),
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // With an admin token it goes through
        let admin = auth::create_token(&state.config.auth.jwt_secret, 1, "admin").unwrap();
        let req = Request::builder()
            .method("POST")
            .uri("/auth/register")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {admin}"))
            .body(Body::from(
                serde_json::json!({ "username": "second", "password": "pw123456", "role": "visitor" })
                    .to_string(),
            ))
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn registered_user_can_login() {
        let (_dir, _state, app) = test_app();

        let req = json_request(
            "POST",
            "/auth/register",
            serde_json::json!({ "username": "artist", "password": "brushes", "role": "admin" }),
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);

        let req = json_request(
            "POST",
            "/auth/login",
            serde_json::json!({ "username": "artist", "password": "brushes" }),
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap();
        let claims = auth::decode_token("test-secret", token).unwrap();
        assert_eq!(claims.role, "admin");

        // Wrong password
        let req = json_request(
            "POST",
            "/auth/login",
            serde_json::json!({ "username": "artist", "password": "wrong" }),
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_list_and_reorder_flow() {
        let (_dir, _state, app) = test_app();

        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            let req = multipart_request(
                "/upload",
                &[
                    ("image", Some("photo.png"), b"fake image bytes"),
                    ("title", None, title.as_bytes()),
                    ("description", None, b""),
                ],
            );
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::CREATED);
            ids.push(body["id"].as_u64().unwrap());
        }

        // Sequential order assignment
        let req = Request::get("/api/images").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        let orders: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["order"].as_u64().unwrap())
            .collect();
        assert_eq!(orders, vec![1, 2, 3]);

        // Reorder C, A, B
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        let req = json_request(
            "PUT",
            "/imageRoute/reorder",
            serde_json::json!({ "reorderedIds": [c, a, b] }),
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Order updated successfully");

        let req = Request::get("/api/images").body(Body::empty()).unwrap();
        let (_, body) = send(&app, req).await;
        let listed: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_u64().unwrap())
            .collect();
        assert_eq!(listed, vec![c, a, b]);
    }

    #[tokio::test]
    async fn reorder_rejects_non_numeric_ids() {
        let (_dir, _state, app) = test_app();
        let req = json_request(
            "PUT",
            "/imageRoute/reorder",
            serde_json::json!({ "reorderedIds": ["one", "two"] }),
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_missing_image_is_not_found() {
        let (_dir, _state, app) = test_app();
        let req = Request::builder()
            .method("DELETE")
            .uri("/api/images/999")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Image not found");
    }

    #[tokio::test]
    async fn uploaded_blob_is_served_from_media_route() {
        let (_dir, _state, app) = test_app();

        let req = multipart_request(
            "/upload",
            &[("image", Some("pic.png"), b"blob-bytes" as &[u8])],
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);

        let image_url = body["imageUrl"].as_str().unwrap();
        let name = image_url.rsplit('/').next().unwrap();
        let req = Request::get(format!("/media/{name}"))
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"blob-bytes");
    }

    #[tokio::test]
    async fn bio_upsert_overwrites_single_row() {
        let (_dir, _state, app) = test_app();

        let req = json_request(
            "POST",
            "/api/bio",
            serde_json::json!({ "bioText": "first", "profilePictureUrl": null }),
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let req = json_request(
            "POST",
            "/api/bio",
            serde_json::json!({ "bioText": "second", "profilePictureUrl": "http://x/p.jpg" }),
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let req = Request::get("/api/bio").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bio"]["bioText"], "second");
        assert_eq!(body["bio"]["profilePictureUrl"], "http://x/p.jpg");
    }

    #[tokio::test]
    async fn series_create_requires_name() {
        let (_dir, _state, app) = test_app();
        let req = multipart_request("/api/selected-series", &[("name", None, b"" as &[u8])]);
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn send_email_unconfigured_is_unavailable() {
        let (_dir, _state, app) = test_app();
        let req = json_request(
            "POST",
            "/api/send-email",
            serde_json::json!({
                "name": "A",
                "email": "a@example.com",
                "message": "hi",
                "captchaToken": "t"
            }),
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn spa_fallback_serves_index_for_client_routes() {
        let (dir, state, app) = test_app();
        let public_dir = std::path::Path::new(&state.config.server.public_dir);
        std::fs::create_dir_all(public_dir).unwrap();
        std::fs::write(public_dir.join("index.html"), "<html>folio</html>").unwrap();

        let req = Request::get("/selected-works/3").body(Body::empty()).unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<html>folio</html>");

        drop(dir);
    }
}
