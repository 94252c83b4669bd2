use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use signalboard::StoreError;

use crate::{pages, AppState};

/// Configure all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        // Users
        .route("/register", web::get().to(register_form))
        .route("/register", web::post().to(register))
        // Pages
        .route("/signals", web::get().to(signals))
        .route("/sites", web::get().to(sites))
        // Sites
        .route("/submit-site", web::get().to(submit_site_form))
        .route("/submit-site", web::post().to(submit_site))
        .route("/like-site/{id}", web::get().to(like_site))
        // Downloads
        .route("/download-python", web::get().to(download_python))
        .route("/download-html", web::get().to(download_html))
        // Admin (token-guarded)
        .route("/admin/broadcast", web::get().to(admin_broadcast))
        .route("/admin/ads", web::get().to(admin_ads))
        .route("/admin/delete-user", web::post().to(admin_delete_user));
}

// ── Envelopes and helpers ───────────────────────────────────────────

/// The `{success, message}` wrapper every mutation endpoint returns.
#[derive(Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes: u64,
}

fn envelope(success: bool, message: impl Into<String>) -> Envelope {
    Envelope {
        success,
        message: message.into(),
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn err_response(e: StoreError) -> HttpResponse {
    match &e {
        // Rejected input keeps the source's contract: HTTP 200, success=false
        StoreError::Validation(_) | StoreError::DuplicateUsername(_) => {
            HttpResponse::Ok().json(envelope(false, e.to_string()))
        }
        StoreError::NotFound { .. } => HttpResponse::NotFound().json(envelope(false, e.to_string())),
        _ => {
            log::error!("store error: {e}");
            HttpResponse::InternalServerError().json(envelope(false, "Internal server error"))
        }
    }
}

/// Admin routes require the shared token in `X-Admin-Token`. With no token
/// configured they are disabled outright, never left open.
fn admin_guard(state: &AppState, req: &HttpRequest) -> Option<HttpResponse> {
    let expected = match state.admin_token.as_deref() {
        Some(t) => t,
        None => {
            return Some(
                HttpResponse::ServiceUnavailable()
                    .json(envelope(false, "Admin routes are disabled")),
            )
        }
    };

    let presented = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|v| v.to_str().ok());

    if presented != Some(expected) {
        return Some(HttpResponse::Unauthorized().json(envelope(false, "Invalid admin token")));
    }

    None
}

// ── Pages ───────────────────────────────────────────────────────────

async fn index() -> HttpResponse {
    html(pages::index())
}

async fn signals(state: web::Data<AppState>) -> HttpResponse {
    match state.store.list_signals() {
        Ok(signals) => html(pages::signals_page(&signals)),
        Err(e) => err_response(e),
    }
}

async fn sites(state: web::Data<AppState>) -> HttpResponse {
    match state.store.list_sites() {
        Ok(sites) => html(pages::sites_page(&sites)),
        Err(e) => err_response(e),
    }
}

// ── Users ───────────────────────────────────────────────────────────

#[derive(Deserialize, Serialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

async fn register_form() -> HttpResponse {
    html(pages::register_form())
}

async fn register(state: web::Data<AppState>, form: web::Form<RegisterForm>) -> HttpResponse {
    match state.store.register_user(&form.username, &form.password) {
        Ok(_) => HttpResponse::Ok().json(envelope(true, "Registration successful")),
        Err(e) => err_response(e),
    }
}

// ── Sites ───────────────────────────────────────────────────────────

#[derive(Deserialize, Serialize)]
pub struct SubmitSiteForm {
    pub site_name: String,
    pub site_url: String,
    pub site_description: String,
}

async fn submit_site_form() -> HttpResponse {
    html(pages::submit_site_form())
}

async fn submit_site(state: web::Data<AppState>, form: web::Form<SubmitSiteForm>) -> HttpResponse {
    match state
        .store
        .submit_site(&form.site_name, &form.site_url, &form.site_description)
    {
        Ok(_) => HttpResponse::Ok().json(envelope(true, "Site submitted")),
        Err(e) => err_response(e),
    }
}

async fn like_site(state: web::Data<AppState>, path: web::Path<u64>) -> HttpResponse {
    match state.store.like_site(path.into_inner()) {
        Ok(likes) => HttpResponse::Ok().json(LikeResponse {
            success: true,
            likes,
        }),
        Err(e) => err_response(e),
    }
}

// ── Downloads ───────────────────────────────────────────────────────

fn download(state: &AppState, file_name: &str) -> HttpResponse {
    let path = state.assets_dir.join(file_name);
    match std::fs::read(&path) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/octet-stream")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ))
            .body(bytes),
        Err(_) => HttpResponse::NotFound().body("File not found"),
    }
}

async fn download_python(state: web::Data<AppState>) -> HttpResponse {
    download(&state, "board.py")
}

async fn download_html(state: web::Data<AppState>) -> HttpResponse {
    download(&state, "board.html")
}

// ── Admin ───────────────────────────────────────────────────────────

async fn admin_broadcast(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Some(denied) = admin_guard(&state, &req) {
        return denied;
    }
    html(pages::admin_broadcast())
}

async fn admin_ads(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Some(denied) = admin_guard(&state, &req) {
        return denied;
    }
    html(pages::admin_ads())
}

#[derive(Deserialize, Serialize)]
pub struct DeleteUserForm {
    pub username: String,
}

async fn admin_delete_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<DeleteUserForm>,
) -> HttpResponse {
    if let Some(denied) = admin_guard(&state, &req) {
        return denied;
    }

    match state.store.delete_user(&form.username) {
        Ok(true) => HttpResponse::Ok().json(envelope(true, "User deleted")),
        Ok(false) => HttpResponse::Ok().json(envelope(false, "No such user")),
        Err(e) => err_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use signalboard::Store;
    use tempfile::TempDir;

    fn test_state(tmp: &TempDir, admin_token: Option<&str>) -> web::Data<AppState> {
        let store = Store::open(tmp.path().to_str().unwrap()).unwrap();
        web::Data::new(AppState {
            store,
            assets_dir: tmp.path().join("assets"),
            admin_token: admin_token.map(|t| t.to_string()),
        })
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn test_register_success_and_duplicate() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp, None);
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(RegisterForm {
                username: "alice".into(),
                password: "hunter2".into(),
            })
            .to_request();
        let body: Envelope = test::call_and_read_body_json(&app, req).await;
        assert!(body.success);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(RegisterForm {
                username: "alice".into(),
                password: "other".into(),
            })
            .to_request();
        let body: Envelope = test::call_and_read_body_json(&app, req).await;
        assert!(!body.success);

        assert_eq!(state.store.list_users().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_register_missing_fields_is_200_envelope() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp, None);
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(RegisterForm {
                username: "".into(),
                password: "pw".into(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Envelope = test::read_body_json(resp).await;
        assert!(!body.success);
    }

    #[actix_web::test]
    async fn test_submit_and_like_site() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp, None);
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/submit-site")
            .set_form(SubmitSiteForm {
                site_name: "Example".into(),
                site_url: "https://example.com".into(),
                site_description: "an example".into(),
            })
            .to_request();
        let body: Envelope = test::call_and_read_body_json(&app, req).await;
        assert!(body.success);

        for expected in 1..=2u64 {
            let req = test::TestRequest::get().uri("/like-site/1").to_request();
            let body: LikeResponse = test::call_and_read_body_json(&app, req).await;
            assert!(body.success);
            assert_eq!(body.likes, expected);
        }

        let req = test::TestRequest::get().uri("/like-site/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_html_pages_render() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp, None);
        let app = test_app!(state);

        for uri in ["/", "/register", "/signals", "/sites", "/submit-site"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string();
            assert!(content_type.starts_with("text/html"), "GET {uri}");
        }
    }

    #[actix_web::test]
    async fn test_admin_routes_disabled_without_token_config() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp, None);
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/admin/broadcast").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_admin_delete_user_requires_token() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp, Some("sekrit"));
        state.store.register_user("alice", "pw").unwrap();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/admin/delete-user")
            .set_form(DeleteUserForm {
                username: "alice".into(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.store.list_users().unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri("/admin/delete-user")
            .insert_header(("X-Admin-Token", "sekrit"))
            .set_form(DeleteUserForm {
                username: "alice".into(),
            })
            .to_request();
        let body: Envelope = test::call_and_read_body_json(&app, req).await;
        assert!(body.success);
        assert_eq!(state.store.list_users().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn test_download_missing_file_is_404() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp, None);
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/download-python").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_download_serves_attachment() {
        let tmp = TempDir::new().unwrap();
        let state = test_state(&tmp, None);
        std::fs::create_dir_all(&state.assets_dir).unwrap();
        std::fs::write(state.assets_dir.join("board.py"), "print('hi')\n").unwrap();
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/download-python").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("board.py"));
        let body = test::read_body(resp).await;
        assert_eq!(&body[..], b"print('hi')\n");
    }
}
