use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::application::auth_service::AuthService;
use crate::application::group_service::GroupService;
use crate::application::pagination::Paginator;
use crate::application::post_service::{PostFilter, PostService};
use crate::data::repositories::memory::MemoryStore;
use crate::domain::post::TINY_GIF;
use crate::domain::user::User;
use crate::infrastructure::jwt::JwtService;
use crate::presentation::AppState;
use crate::server::build_router;

const SECRET: &str = "0123456789abcdef0123456789abcdef";
const BOUNDARY: &str = "yatube-test-boundary";

struct TestApp {
    store: MemoryStore,
    state: AppState,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl TestResponse {
    fn renders(&self, template: &str) -> bool {
        self.body
            .contains(&format!("data-template=\"{template}\""))
    }

    fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    fn post_cards(&self) -> usize {
        self.body.matches("<article class=\"post\"").count()
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("body must be json")
    }
}

impl TestApp {
    fn new() -> Self {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let jwt = Arc::new(JwtService::new(SECRET, 3600));

        let state = AppState::new(
            Arc::new(AuthService::new(shared.clone(), Arc::clone(&jwt))),
            Arc::new(PostService::new(
                shared.clone(),
                shared.clone(),
                shared.clone(),
                shared.clone(),
            )),
            Arc::new(GroupService::new(shared)),
            jwt,
            Paginator::new(10),
            "/media/",
        );

        Self { store, state }
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    fn token(&self, user: &User) -> String {
        self.state
            .jwt
            .generate_token(user.id, &user.username)
            .expect("token must encode")
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body must be readable")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut request = Request::get(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(request.body(Body::empty()).expect("valid request"))
            .await
    }

    async fn post_form(&self, uri: &str, token: Option<&str>, form: FormBody) -> TestResponse {
        let mut request = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(request.body(Body::from(form.finish())).expect("valid request"))
            .await
    }

    async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(
            request
                .body(Body::from(body.to_string()))
                .expect("valid request"),
        )
        .await
    }
}

#[derive(Default)]
struct FormBody {
    bytes: Vec<u8>,
}

impl FormBody {
    fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, file_name: &str, content: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(content);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}

#[tokio::test]
async fn public_pages_use_their_templates() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let group = app.store.seed_group("Тестовая группа", "test-slug", "Тестовое описание");
    let post = app.store.seed_post(&author, "Тестовый пост", Some(&group), Utc::now());

    let cases = [
        ("/".to_string(), "posts/index.html"),
        ("/group/test-slug/".to_string(), "posts/group_list.html"),
        ("/profile/auth/".to_string(), "posts/profile.html"),
        (format!("/posts/{}/", post.id), "posts/post_detail.html"),
    ];

    for (uri, template) in cases {
        let response = app.get(&uri, None).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert!(response.renders(template), "{uri} must render {template}");
    }
}

#[tokio::test]
async fn private_pages_use_form_template() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let post = app.store.seed_post(&author, "Тестовый пост", None, Utc::now());
    let token = app.token(&author);

    for uri in ["/create/".to_string(), format!("/posts/{}/edit/", post.id)] {
        let response = app.get(&uri, Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert!(response.renders("posts/create_post.html"), "{uri}");
    }
}

#[tokio::test]
async fn unknown_route_renders_404_page() {
    let app = TestApp::new();

    let response = app.get("/unexisting_page/", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.renders("core/404.html"));
}

#[tokio::test]
async fn unknown_post_is_404_for_anonymous_and_authenticated() {
    let app = TestApp::new();
    let user = app.store.seed_user("auth");
    let token = app.token(&user);

    for token in [None, Some(token.as_str())] {
        for uri in ["/posts/999/", "/posts/not-a-number/"] {
            let response = app.get(uri, token).await;
            assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
            assert!(response.renders("core/404.html"));
        }
    }
}

#[tokio::test]
async fn unknown_group_and_profile_are_404() {
    let app = TestApp::new();

    assert_eq!(
        app.get("/group/missing/", None).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/profile/nobody/", None).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn create_page_requires_identity() {
    let app = TestApp::new();
    app.store.seed_user("auth");

    assert_eq!(app.get("/create/", None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get("/create/", Some("garbage-token")).await.status,
        StatusCode::UNAUTHORIZED
    );

    let response = app
        .post_form("/create/", None, FormBody::default().text("text", "анонимный"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.post_count(), 0);
}

#[tokio::test]
async fn identity_is_read_from_cookie() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let token = app.token(&author);

    let request = Request::get("/create/")
        .header(header::COOKIE, format!("access_token={token}"))
        .body(Body::empty())
        .expect("valid request");
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.renders("posts/create_post.html"));
}

#[tokio::test]
async fn create_post_redirects_to_author_profile() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let someone = app.store.seed_user("someone");
    let group = app.store.seed_group("Тестовая группа", "test-slug", "");
    let token = app.token(&author);

    let form = FormBody::default()
        .text("text", "Вот такой текст")
        .text("group", &group.id.to_string())
        .text("author", &someone.id.to_string())
        .file("image", "small.gif", TINY_GIF);
    let response = app.post_form("/create/", Some(&token), form).await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/profile/auth/"));
    assert_eq!(app.store.post_count(), 1);

    let posts = app
        .state
        .post_service
        .list_posts(&PostFilter::All)
        .await
        .expect("posts must list");
    let created = &posts[0];
    assert_eq!(created.text, "Вот такой текст");
    assert_eq!(created.author.id, author.id);
    assert_eq!(created.group.as_ref().map(|g| g.slug.as_str()), Some("test-slug"));
    assert_eq!(app.store.stored_media().len(), 1);

    let detail = app.get(&format!("/posts/{}/", created.id), None).await;
    assert!(detail.body.contains("<img src=\"/media/posts/"));
}

#[tokio::test]
async fn post_with_group_appears_on_its_pages_only() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let group = app.store.seed_group("Тестовая группа", "test-slug", "");
    app.store.seed_group("Другая группа", "other-slug", "");
    let token = app.token(&author);

    let form = FormBody::default()
        .text("text", "Вот такой текст")
        .text("group", &group.id.to_string());
    let response = app.post_form("/create/", Some(&token), form).await;
    assert_eq!(response.status, StatusCode::FOUND);

    for uri in ["/", "/group/test-slug/", "/profile/auth/"] {
        let page = app.get(uri, None).await;
        assert_eq!(page.post_cards(), 1, "{uri}");
        assert!(page.body.contains("Вот такой текст"), "{uri}");
    }

    let group_page = app.get("/group/test-slug/", None).await;
    assert!(group_page.body.contains("все записи группы «Тестовая группа»"));
    assert!(group_page.body.contains("href=\"/profile/auth/\""));

    let other = app.get("/group/other-slug/", None).await;
    assert_eq!(other.status, StatusCode::OK);
    assert_eq!(other.post_cards(), 0);
}

#[tokio::test]
async fn invalid_form_is_rendered_again_with_errors() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let token = app.token(&author);

    let form = FormBody::default()
        .text("text", "   ")
        .text("group", "12345")
        .file("image", "fake.gif", b"definitely not an image");
    let response = app.post_form("/create/", Some(&token), form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.renders("posts/create_post.html"));
    assert!(response.body.contains("Обязательное поле."));
    assert!(response.body.contains("Загрузите правильное изображение."));
    assert_eq!(app.store.post_count(), 0);
}

#[tokio::test]
async fn unknown_group_is_a_form_error() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let token = app.token(&author);

    let form = FormBody::default()
        .text("text", "Текст")
        .text("group", "999");
    let response = app.post_form("/create/", Some(&token), form).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Выберите корректный вариант."));
    assert!(response.body.contains(">Текст</textarea>"));
    assert_eq!(app.store.post_count(), 0);
}

#[tokio::test]
async fn author_edit_redirects_to_post_detail() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let post = app.store.seed_post(&author, "Старый текст", None, Utc::now());
    let token = app.token(&author);

    let response = app
        .post_form(
            &format!("/posts/{}/edit/", post.id),
            Some(&token),
            FormBody::default().text("text", "Новый текст"),
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some(format!("/posts/{}/", post.id).as_str()));

    let edited = app
        .state
        .post_service
        .get_post(post.id)
        .await
        .expect("post must exist");
    assert_eq!(edited.text, "Новый текст");
    assert_eq!(edited.author.id, author.id);
    assert_eq!(app.store.post_count(), 1);
}

#[tokio::test]
async fn non_author_edit_is_forbidden() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let stranger = app.store.seed_user("stranger");
    let post = app.store.seed_post(&author, "Исходный текст", None, Utc::now());
    let token = app.token(&stranger);
    let uri = format!("/posts/{}/edit/", post.id);

    for form in [
        FormBody::default().text("text", "Чужая правка"),
        FormBody::default().text("text", ""),
    ] {
        let response = app.post_form(&uri, Some(&token), form).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert!(response.renders("core/403.html"));
    }

    let unchanged = app
        .state
        .post_service
        .get_post(post.id)
        .await
        .expect("post must exist");
    assert_eq!(unchanged.text, "Исходный текст");
}

#[tokio::test]
async fn non_author_sees_read_only_edit_form() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let stranger = app.store.seed_user("stranger");
    let post = app.store.seed_post(&author, "Исходный текст", None, Utc::now());

    let response = app
        .get(
            &format!("/posts/{}/edit/", post.id),
            Some(&app.token(&stranger)),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Редактировать запись может только её автор."));
    assert!(!response.body.contains("<button type=\"submit\">"));
}

#[tokio::test]
async fn edit_link_is_shown_to_author_only() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let stranger = app.store.seed_user("stranger");
    let post = app.store.seed_post(&author, "Тестовый пост", None, Utc::now());
    let uri = format!("/posts/{}/", post.id);
    let edit_link = format!("/posts/{}/edit/", post.id);

    let as_author = app.get(&uri, Some(&app.token(&author))).await;
    assert!(as_author.body.contains(&edit_link));
    assert!(as_author.body.contains("<span class=\"author-posts-count\">1</span>"));

    let as_stranger = app.get(&uri, Some(&app.token(&stranger))).await;
    assert!(!as_stranger.body.contains(&edit_link));

    let anonymous = app.get(&uri, None).await;
    assert!(!anonymous.body.contains(&edit_link));
}

#[tokio::test]
async fn list_pages_split_thirteen_posts_into_ten_three_and_empty() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let group = app.store.seed_group("Тестовая группа", "test-slug", "");
    let start = Utc::now() - Duration::days(1);
    for i in 0..13 {
        app.store.seed_post(
            &author,
            &format!("Пост {i}"),
            Some(&group),
            start + Duration::minutes(i),
        );
    }

    for base in ["/", "/group/test-slug/", "/profile/auth/"] {
        let first = app.get(base, None).await;
        assert_eq!(first.post_cards(), 10, "{base}");
        assert!(first.body.contains("Пост 12"), "{base} must start with newest");

        let second = app.get(&format!("{base}?page=2"), None).await;
        assert_eq!(second.post_cards(), 3, "{base}?page=2");

        let third = app.get(&format!("{base}?page=3"), None).await;
        assert_eq!(third.status, StatusCode::OK);
        assert_eq!(third.post_cards(), 0, "{base}?page=3");
    }
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = TestApp::new();

    let response = app.get("/healthz", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();

    let response = app.get("/api-docs/openapi.json", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["paths"]["/api/posts"].is_object());
}

#[tokio::test]
async fn login_sets_access_token_cookie() {
    let app = TestApp::new();

    let registered = app
        .post_json(
            "/api/auth/register",
            None,
            json!({ "username": "leo", "password": "very-secure-password" }),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.json()["user"]["username"], "leo");

    let logged_in = app
        .post_json(
            "/api/auth/login",
            None,
            json!({ "username": "leo", "password": "very-secure-password" }),
        )
        .await;
    assert_eq!(logged_in.status, StatusCode::OK);
    let cookie = logged_in
        .headers
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("login must set a cookie");
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));

    let token = logged_in.json()["access_token"]
        .as_str()
        .expect("token in body")
        .to_string();
    let identity = app.state.jwt.identify(&token).expect("token must verify");
    assert_eq!(identity.username, "leo");

    let wrong = app
        .post_json(
            "/api/auth/login",
            None,
            json!({ "username": "leo", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_lists_posts_with_pagination() {
    let app = TestApp::new();
    let author = app.store.seed_user("auth");
    let start = Utc::now() - Duration::days(1);
    for i in 0..13 {
        app.store
            .seed_post(&author, &format!("Пост {i}"), None, start + Duration::minutes(i));
    }

    let first = app.get("/api/posts", None).await.json();
    assert_eq!(first["posts"].as_array().map(Vec::len), Some(10));
    assert_eq!(first["posts"][0]["text"], "Пост 12");
    assert_eq!(first["num_pages"], 2);
    assert_eq!(first["has_next"], true);

    let second = app.get("/api/posts?page=2", None).await.json();
    assert_eq!(second["posts"].as_array().map(Vec::len), Some(3));

    let missing = app.get("/api/posts/999", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_group_creation_requires_identity() {
    let app = TestApp::new();
    let user = app.store.seed_user("auth");
    let body = json!({ "title": "Cats and dogs", "description": "pets" });

    let anonymous = app.post_json("/api/groups", None, body.clone()).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let token = app.token(&user);
    let created = app.post_json("/api/groups", Some(&token), body.clone()).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.json()["slug"], "cats-and-dogs");

    let duplicate = app.post_json("/api/groups", Some(&token), body).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let listed = app.get("/api/groups", None).await.json();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}
