#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use storefront_backend::{AppConfig, AppState, create_app};
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const PREFIX: &str = "/api/v1";

pub const VIEW_YAML: &str = r#"
frontend:
  images:
    - id: product_thumbnail_image
      type: thumbnail
      width: 100
      height: 50
      constrain_only: false
      aspect_ratio: false
      frame: true
      transparency: false
      background: "255,255,255"
"#;

pub const WIDGETS_YAML: &str = r#"
widgets:
  - code: cms_page_link
    type: Cms\Block\Widget\Page\Link
    name: CMS Page Link
"#;

/// 缩略图视图的缓存键（`h: 50_w: 100_q: 80_r: _non proportional_no frame_no transparency_not constrainonly_rgb 255,255,255` 的 MD5）
pub const THUMBNAIL_CACHE_ID: &str = "802af4e5a981e886a93c6cbf0f6d0cdd";

pub struct TestApp {
    _tmp: tempfile::TempDir,
    pub app: Router,
    pub state: AppState,
    pub media_root: PathBuf,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let resources = tmp.path().join("resources");
        std::fs::create_dir_all(resources.join("i18n")).expect("resources dir");
        std::fs::write(resources.join("view.yaml"), VIEW_YAML).expect("view.yaml");
        std::fs::write(resources.join("widgets.yaml"), WIDGETS_YAML).expect("widgets.yaml");

        let media_root = tmp.path().join("media");
        std::fs::create_dir_all(&media_root).expect("media root");

        let mut config = AppConfig::default();
        config.resources.base_path = path_string(&resources);
        config.media.root = path_string(&media_root);
        config.widget.sqlite_path = path_string(&tmp.path().join("widgets.db"));
        config.widget.sqlite_wal = false;
        config.admin.tokens = vec![ADMIN_TOKEN.to_string()];
        config.api.prefix = PREFIX.to_string();
        tweak(&mut config);
        std::fs::create_dir_all(
            std::path::Path::new(&config.media.root).join(&config.media.base_media_path),
        )
        .expect("media base dir");

        let state = AppState::build(&config).await.expect("build state");
        let app = create_app(state.clone(), &config.api.prefix);
        Self {
            _tmp: tmp,
            app,
            state,
            media_root,
        }
    }

    pub fn media_path(&self, relative: &str) -> PathBuf {
        self.media_root.join(relative)
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("oneshot")
    }
}

pub fn path_string(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

pub fn admin_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(format!("{PREFIX}{uri}"))
        .header("content-type", "application/json")
        .header("x-admin-token", ADMIN_TOKEN)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(format!("{PREFIX}{uri}"))
        .header("x-admin-token", ADMIN_TOKEN)
        .body(Body::empty())
        .unwrap()
}

pub fn admin_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("{PREFIX}{uri}"))
        .header("content-type", "application/x-www-form-urlencoded")
        .header("x-admin-token", ADMIN_TOKEN)
        .body(Body::from(form.to_string()))
        .unwrap()
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).expect("json body")
}

/// 写入一张纯色 PNG 源图
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("parent dir");
    }
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    img.save(path).expect("save png");
}
