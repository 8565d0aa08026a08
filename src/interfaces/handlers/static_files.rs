use std::path::{Component, Path};

use actix_files::Files;
use actix_web::{
    body::MessageBody,
    dev::{HttpServiceFactory, RequestHead, ServiceRequest, ServiceResponse},
    http::header::{self, HeaderValue},
    middleware::{from_fn, Next},
    web, Error, HttpRequest, HttpResponse,
};

use crate::errors::AppError;

const MODEL_CONTENT_TYPE: &str = "model/gltf-binary";
const LONG_CACHE: &str = "public, max-age=31536000";

/// JSON 404 for unknown API paths and missing assets.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("No resource at {}", req.path())))
}

/// Dotfiles and anything under `api/` never come from disk.
fn is_public_asset(path: &Path, _: &RequestHead) -> bool {
    let under_api = path
        .components()
        .next()
        .and_then(|first| first.as_os_str().to_str())
        .is_some_and(|first| first.eq_ignore_ascii_case("api"));

    !under_api
        && path.components().all(|component| match component {
            Component::Normal(part) => !part.to_string_lossy().starts_with('.'),
            _ => false,
        })
}

fn is_model(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"))
}

/// `.glb` models get their glTF type and a one-year public cache.
async fn model_headers(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let model = is_model(req.path());
    let mut res = next.call(req).await?;

    if model && res.status().is_success() {
        let headers = res.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(MODEL_CONTENT_TYPE));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(LONG_CACHE));
    }

    Ok(res)
}

/// Serves the museum scene, models and uploaded images from `web_root`.
///
/// Matches every path, so it must be registered after all other routes.
pub fn asset_service(web_root: &Path) -> impl HttpServiceFactory + use<> {
    web::scope("")
        .wrap(from_fn(model_headers))
        .service(
            Files::new("/", web_root.to_path_buf())
                .index_file("index.html")
                .use_hidden_files()
                .path_filter(is_public_asset)
                .default_handler(web::to(not_found)),
        )
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{header, StatusCode}, test};
    use std::path::PathBuf;

    use super::*;
    use crate::{
        settings::test_config,
        test_support::{test_app, MockRepos},
    };

    fn web_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("portfolio-static-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("models")).unwrap();
        std::fs::create_dir_all(root.join("museum")).unwrap();
        std::fs::write(root.join("models/pedestal.glb"), b"glTF\x02\x00\x00\x00").unwrap();
        std::fs::write(root.join("index.html"), "<!doctype html><title>Museum</title>").unwrap();
        std::fs::write(root.join("museum/index.html"), "<!doctype html><title>Hall</title>").unwrap();
        std::fs::write(root.join(".env"), "APP_JWT_SECRET=nope").unwrap();
        root
    }

    fn header_str<B>(resp: &ServiceResponse<B>, name: header::HeaderName) -> Option<String> {
        resp.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    }

    #[::core::prelude::v1::test]
    fn asset_filter_rejects_dotfiles_and_api() {
        let head = RequestHead::default();
        assert!(is_public_asset(Path::new("models/pedestal.glb"), &head));
        assert!(is_public_asset(Path::new(""), &head));
        assert!(!is_public_asset(Path::new(".env"), &head));
        assert!(!is_public_asset(Path::new("models/.git/config"), &head));
        assert!(!is_public_asset(Path::new("API/secrets.json"), &head));
    }

    #[actix_rt::test]
    async fn serves_models_with_long_cache() {
        let root = web_root();
        let mut config = test_config();
        config.web_root = root.to_string_lossy().into_owned();
        let app = test_app!(MockRepos::default().into_state_with(&config));

        let req = test::TestRequest::get().uri("/models/pedestal.glb").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header_str(&resp, header::CONTENT_TYPE).as_deref(), Some("model/gltf-binary"));
        assert_eq!(header_str(&resp, header::CACHE_CONTROL).as_deref(), Some("public, max-age=31536000"));
        assert!(resp.headers().contains_key(header::ETAG));
        assert!(resp.headers().contains_key(header::LAST_MODIFIED));

        std::fs::remove_dir_all(root).ok();
    }

    #[actix_rt::test]
    async fn range_requests_get_partial_content() {
        let root = web_root();
        let mut config = test_config();
        config.web_root = root.to_string_lossy().into_owned();
        let app = test_app!(MockRepos::default().into_state_with(&config));

        let req = test::TestRequest::get()
            .uri("/models/pedestal.glb")
            .insert_header((header::RANGE, "bytes=0-3"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header_str(&resp, header::CONTENT_RANGE).as_deref(), Some("bytes 0-3/8"));
        assert_eq!(header_str(&resp, header::CONTENT_TYPE).as_deref(), Some("model/gltf-binary"));

        let body = test::read_body(resp).await;
        assert_eq!(&body[..], b"glTF");

        std::fs::remove_dir_all(root).ok();
    }

    #[actix_rt::test]
    async fn matching_etag_is_not_modified() {
        let root = web_root();
        let mut config = test_config();
        config.web_root = root.to_string_lossy().into_owned();
        let app = test_app!(MockRepos::default().into_state_with(&config));

        let req = test::TestRequest::get().uri("/models/pedestal.glb").to_request();
        let resp = test::call_service(&app, req).await;
        let etag = header_str(&resp, header::ETAG).unwrap();

        let req = test::TestRequest::get()
            .uri("/models/pedestal.glb")
            .insert_header((header::IF_NONE_MATCH, etag))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);

        std::fs::remove_dir_all(root).ok();
    }

    #[actix_rt::test]
    async fn directories_serve_their_index() {
        let root = web_root();
        let mut config = test_config();
        config.web_root = root.to_string_lossy().into_owned();
        let app = test_app!(MockRepos::default().into_state_with(&config));

        for (path, title) in [("/index.html", "Museum"), ("/museum", "Hall"), ("/museum/", "Hall")] {
            let req = test::TestRequest::get().uri(path).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{path}");

            let body = test::read_body(resp).await;
            assert!(body.starts_with(b"<!doctype html>"), "{path}");
            assert!(std::str::from_utf8(&body).unwrap().contains(title), "{path}");
        }

        std::fs::remove_dir_all(root).ok();
    }

    #[actix_rt::test]
    async fn hidden_and_missing_files_are_404() {
        let root = web_root();
        let mut config = test_config();
        config.web_root = root.to_string_lossy().into_owned();
        let app = test_app!(MockRepos::default().into_state_with(&config));

        for path in ["/.env", "/models/missing.glb", "/api/nothing-here", "/api/v1/nothing-here"] {
            let req = test::TestRequest::get().uri(path).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert!(body.get("error").is_some(), "{path}");
        }

        std::fs::remove_dir_all(root).ok();
    }
}
