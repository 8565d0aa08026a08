use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Uri,
    Error,
};
use futures_util::future::{ok, Ready};
use std::task::{Context, Poll};

/// Lowercases request paths under `/api/` so controller routes match
/// regardless of casing (`/api/ProjectsAPI` and `/api/projectsapi` are the same).
/// The query string is left untouched.
pub struct ApiPathCase;

impl<S, B> Transform<S, ServiceRequest> for ApiPathCase
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiPathCaseService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiPathCaseService { service })
    }
}

pub struct ApiPathCaseService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ApiPathCaseService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if let Some(uri) = lowercase_api_uri(req.uri()) {
            req.match_info_mut().get_mut().update(&uri);
            req.head_mut().uri = uri;
        }

        self.service.call(req)
    }
}

fn lowercase_api_uri(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let is_api = path.get(..5).is_some_and(|prefix| prefix.eq_ignore_ascii_case("/api/"))
        || path.eq_ignore_ascii_case("/api");
    if !is_api || !path.bytes().any(|b| b.is_ascii_uppercase()) {
        return None;
    }

    let lowered = path.to_ascii_lowercase();
    let path_and_query = match uri.query() {
        Some(query) => format!("{lowered}?{query}"),
        None => lowered,
    };

    path_and_query.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_api_paths_only() {
        let uri: Uri = "/api/ProjectsAPI/filter?skillId=1&CategoryId=2".parse().unwrap();
        let lowered = lowercase_api_uri(&uri).unwrap();
        assert_eq!(lowered.path(), "/api/projectsapi/filter");
        assert_eq!(lowered.query(), Some("skillId=1&CategoryId=2"));

        let asset: Uri = "/Models/Pedestal.glb".parse().unwrap();
        assert!(lowercase_api_uri(&asset).is_none());
    }

    #[test]
    fn already_lowercase_is_left_alone() {
        let uri: Uri = "/api/skillsapi".parse().unwrap();
        assert!(lowercase_api_uri(&uri).is_none());

        let upper_prefix: Uri = "/API/SkillsAPI".parse().unwrap();
        assert_eq!(lowercase_api_uri(&upper_prefix).unwrap().path(), "/api/skillsapi");
    }
}
