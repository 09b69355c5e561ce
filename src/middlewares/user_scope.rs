use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use futures_util::future::LocalBoxFuture;
use serde::Deserialize;
use std::future::{Ready, ready};

/// 由身份提供方签发的用户 subject, 中间件解析后放入请求扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

#[derive(Debug, Deserialize)]
struct UserIdQuery {
    #[serde(rename = "userId", alias = "user_id")]
    user_id: Option<String>,
}

// 不需要用户上下文的路径
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec!["/health", "/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }
        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

/// 从 `userId` 查询参数或 `X-User-Id` 请求头解析当前用户 (查询参数优先)
fn extract_user(req: &ServiceRequest) -> Option<String> {
    let from_query = web::Query::<UserIdQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().user_id);

    let from_header = || {
        req.headers()
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    };

    from_query
        .or_else(from_header)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub struct UserScopeMiddleware;

impl<S, B> Transform<S, ServiceRequest> for UserScopeMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = UserScopeMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(UserScopeMiddlewareService {
            service,
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct UserScopeMiddlewareService<S> {
    service: S,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for UserScopeMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS || self.public_paths.is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        match extract_user(&req) {
            Some(user) => {
                req.extensions_mut().insert(CurrentUser(user));
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            None => {
                let error = AppError::ValidationError("userId is required".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/health"));
        assert!(paths.is_public_path("/swagger-ui/index.html"));
        assert!(!paths.is_public_path("/api/creditcards"));
    }

    #[test]
    fn test_extract_user_prefers_query() {
        let req = TestRequest::with_uri("/api/giftcards?userId=user_abc")
            .insert_header(("X-User-Id", "user_header"))
            .to_srv_request();
        assert_eq!(extract_user(&req), Some("user_abc".to_string()));
    }

    #[test]
    fn test_extract_user_from_header() {
        let req = TestRequest::with_uri("/api/giftcards")
            .insert_header(("X-User-Id", " user_header "))
            .to_srv_request();
        assert_eq!(extract_user(&req), Some("user_header".to_string()));

        let req = TestRequest::with_uri("/api/giftcards?userId=").to_srv_request();
        assert_eq!(extract_user(&req), None);
    }
}
