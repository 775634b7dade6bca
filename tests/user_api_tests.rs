use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, Error};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use simbld_accounts::activity::models::ActivityCategory;
use simbld_accounts::auth::JwtService;
use simbld_accounts::config::UploadConfig;
use simbld_accounts::records::RecordCollection;
use simbld_accounts::store::{memory::InMemoryStore, Repositories};
use simbld_accounts::upload::PhotoProcessor;
use simbld_accounts::user::models::{User, UserRole};
use simbld_accounts::user::repository::UserRepository;
use simbld_accounts::user::service::UserService;
use simbld_accounts::{configure_user_routes, AppState};

const BOUNDARY: &str = "----simbld-test-boundary";

struct TestContext {
    store: Arc<InMemoryStore>,
    jwt: Arc<JwtService>,
    upload_dir: PathBuf,
    max_upload_bytes: usize,
}

impl TestContext {
    fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            jwt: Arc::new(JwtService::new("integration_secret", 60)),
            upload_dir: std::env::temp_dir().join(format!("avatars-{}", uuid::Uuid::new_v4())),
            max_upload_bytes: UploadConfig::default().max_bytes,
        }
    }

    fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    fn seed(&self, name: &str, email: &str, username: &str, role: UserRole) -> User {
        let user = User::new(name, email, username, role);
        self.store.insert_user(user.clone()).unwrap();
        user
    }

    fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.jwt.generate_token(user).unwrap()))
    }

    async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
        let photos = PhotoProcessor::new(UploadConfig {
            public_dir: self.upload_dir.clone(),
            max_bytes: self.max_upload_bytes,
            ..UploadConfig::default()
        });
        let state = AppState::new(UserService::new(
            Repositories::in_memory(self.store.clone()),
            photos,
        ));
        let jwt = self.jwt.clone();

        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| configure_user_routes(cfg, jwt)),
        )
        .await
    }

    fn uploaded_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir).map(|entries| entries.count()).unwrap_or(0)
    }
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(40, 40, Rgb([10, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A file part as a browser sends it: field name, filename, content type, contents
type FilePart<'a> = (&'a str, &'a str, &'a str, &'a [u8]);

/// Hand-built multipart body: text parts, then an optional file part
fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_content_type() -> (header::HeaderName, String) {
    (header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
}

#[actix_web::test]
async fn test_admin_lists_and_fetches_users() {
    let ctx = TestContext::new();
    let admin = ctx.seed("Root", "root@example.com", "root", UserRole::Admin);
    let ada = ctx.seed("Ada", "ada@example.com", "ada", UserRole::User);
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["results"], 2);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", ada.id))
        .insert_header(ctx.bearer(&admin))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["user"]["username"], "ada");
    assert!(body["user"].get("password").is_none());
}

#[actix_web::test]
async fn test_unknown_user_is_not_found() {
    let ctx = TestContext::new();
    let admin = ctx.seed("Root", "root@example.com", "root", UserRole::Admin);
    let app = ctx.app().await;

    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{id}"))
            .insert_header(ctx.bearer(&admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "No user found with that ID");
    }
}

#[actix_web::test]
async fn test_admin_routes_forbidden_for_plain_users() {
    let ctx = TestContext::new();
    let ada = ctx.seed("Ada", "ada@example.com", "ada", UserRole::User);
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(ctx.bearer(&ada))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{}", ada.id))
        .insert_header(ctx.bearer(&ada))
        .set_json(json!({ "role": "admin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        ctx.store.find_by_id(&ada.id).await.unwrap().unwrap().role,
        UserRole::User
    );
}

#[actix_web::test]
async fn test_admin_update_returns_new_document() {
    let ctx = TestContext::new();
    let admin = ctx.seed("Root", "root@example.com", "root", UserRole::Admin);
    let ada = ctx.seed("Ada", "ada@example.com", "ada", UserRole::User);
    let app = ctx.app().await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{}", ada.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(json!({ "name": "Ada Lovelace", "role": "admin" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["name"], "Ada Lovelace");
    assert_eq!(body["user"]["role"], "admin");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{}", ada.id))
        .insert_header(ctx.bearer(&admin))
        .set_json(json!({ "email": "not-an-email" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_get_me_returns_own_profile() {
    let ctx = TestContext::new();
    let ada = ctx.seed("Ada", "ada@example.com", "ada", UserRole::User);
    let app = ctx.app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&ada))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["user"]["id"], ada.id.to_string());
}

#[actix_web::test]
async fn test_update_me_json_changes_profile_and_logs_activity() {
    let ctx = TestContext::new();
    let user = ctx.seed("Bobby", "bobby@example.com", "bob", UserRole::User);
    let app = ctx.app().await;

    let req = test::TestRequest::patch()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&user))
        .set_json(json!({ "name": "Bob", "email": "b@x.com", "role": "admin", "admin": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["user"]["name"], "Bob");
    assert_eq!(body["data"]["user"]["email"], "b@x.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("admin").is_none());

    let activities = ctx.store.activities_for(&user.id).unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].category, ActivityCategory::UpdateProfile);
    assert_eq!(activities[0].user_id.id, user.id);
    assert_eq!(activities[0].user_id.username, "bob");
}

#[actix_web::test]
async fn test_update_me_rejects_password_fields() {
    let ctx = TestContext::new();
    let bob = ctx.seed("Bob", "bob@example.com", "bob", UserRole::User);
    let app = ctx.app().await;

    let req = test::TestRequest::patch()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&bob))
        .set_json(json!({ "name": "Robert", "password": "hunter22" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "This route is not for password updates. Please use /updateMyPassword."
    );

    assert_eq!(ctx.store.find_by_id(&bob.id).await.unwrap().unwrap().name, "Bob");
    assert!(ctx.store.activities_for(&bob.id).unwrap().is_empty());
}

#[actix_web::test]
async fn test_multipart_non_image_is_rejected() {
    let ctx = TestContext::new();
    let bob = ctx.seed("Bob", "bob@example.com", "bob", UserRole::User);
    let app = ctx.app().await;

    let body = multipart_body(&[("name", "Robert")], Some(("image", "notes.txt", "text/plain", &b"hello"[..])));
    let req = test::TestRequest::patch()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&bob))
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Not an image! Please upload only images.");

    assert_eq!(ctx.uploaded_files(), 0);
    let stored = ctx.store.find_by_id(&bob.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Bob");
    assert_eq!(stored.image, "default.jpg");
}

#[actix_web::test]
async fn test_multipart_image_updates_avatar_and_profile() {
    let ctx = TestContext::new();
    let bob = ctx.seed("Bob", "bob@example.com", "bob", UserRole::User);
    let app = ctx.app().await;

    let png = png_bytes();
    let body = multipart_body(&[("name", "Robert")], Some(("image", "avatar.png", "image/png", png.as_slice())));
    let req = test::TestRequest::patch()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&bob))
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["name"], "Robert");

    let image = body["data"]["user"]["image"].as_str().unwrap().to_string();
    assert!(image.starts_with(&format!("user-{}-", bob.id)));
    assert!(image.ends_with(".jpeg"));

    let written = image::open(ctx.upload_dir.join(&image)).unwrap();
    assert_eq!((written.width(), written.height()), (349, 708));

    let categories: Vec<ActivityCategory> = ctx
        .store
        .activities_for(&bob.id)
        .unwrap()
        .into_iter()
        .map(|activity| activity.category)
        .collect();
    assert_eq!(categories, vec![ActivityCategory::UploadPhoto, ActivityCategory::UpdateProfile]);

    let _ = std::fs::remove_dir_all(&ctx.upload_dir);
}

#[actix_web::test]
async fn test_delete_me_cascades_owned_records() {
    let ctx = TestContext::new();
    let bob = ctx.seed("Bob", "bob@example.com", "bob", UserRole::User);
    let ada = ctx.seed("Ada", "ada@example.com", "ada", UserRole::User);
    ctx.store.insert_record(RecordCollection::Issues, bob.owner_ref()).unwrap();
    ctx.store.insert_record(RecordCollection::Comments, bob.owner_ref()).unwrap();
    ctx.store.insert_record(RecordCollection::Comments, ada.owner_ref()).unwrap();
    let app = ctx.app().await;

    let req = test::TestRequest::patch()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&bob))
        .set_json(json!({ "name": "Robert" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(test::read_body(resp).await.is_empty());

    assert!(ctx.store.find_by_id(&bob.id).await.unwrap().is_none());
    assert_eq!(ctx.store.records_owned_by(RecordCollection::Issues, &bob.id).unwrap(), 0);
    assert_eq!(ctx.store.records_owned_by(RecordCollection::Comments, &bob.id).unwrap(), 0);
    assert!(ctx.store.activities_for(&bob.id).unwrap().is_empty());
    assert_eq!(ctx.store.records_owned_by(RecordCollection::Comments, &ada.id).unwrap(), 1);

    // A token outliving its account no longer resolves to a profile
    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&bob))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_multipart_without_file_updates_profile_only() {
    let ctx = TestContext::new();
    let bob = ctx.seed("Bob", "bob@example.com", "bob", UserRole::User);
    let app = ctx.app().await;

    let forms = [
        // Text fields only
        multipart_body(&[("name", "Robert")], None),
        // Browser form submitted with no file chosen
        multipart_body(
            &[("name", "Robert")],
            Some(("image", "", "application/octet-stream", &b""[..])),
        ),
        // `image` sent as a plain text field
        multipart_body(&[("name", "Robert"), ("image", "default.jpg")], None),
    ];

    for body in forms {
        let req = test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .insert_header(ctx.bearer(&bob))
            .insert_header(multipart_content_type())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["user"]["name"], "Robert");
        assert_eq!(body["data"]["user"]["image"], "default.jpg");
    }

    assert_eq!(ctx.uploaded_files(), 0);
    let activities = ctx.store.activities_for(&bob.id).unwrap();
    assert_eq!(activities.len(), 3);
    assert!(activities
        .iter()
        .all(|activity| activity.category == ActivityCategory::UpdateProfile));
}

#[actix_web::test]
async fn test_multipart_image_over_limit_is_rejected() {
    let ctx = TestContext::new().with_max_upload_bytes(16);
    let bob = ctx.seed("Bob", "bob@example.com", "bob", UserRole::User);
    let app = ctx.app().await;

    let png = png_bytes();
    assert!(png.len() > 16);
    let body = multipart_body(&[("name", "Robert")], Some(("image", "avatar.png", "image/png", png.as_slice())));
    let req = test::TestRequest::patch()
        .uri("/api/v1/users/me")
        .insert_header(ctx.bearer(&bob))
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert_eq!(ctx.uploaded_files(), 0);
    let stored = ctx.store.find_by_id(&bob.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Bob");
    assert_eq!(stored.image, "default.jpg");
    assert!(ctx.store.activities_for(&bob.id).unwrap().is_empty());
}
