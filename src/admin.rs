use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, state::AppState};

/// 管理员令牌请求头
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// 校验 `X-Admin-Token`，通过时返回令牌
pub fn require_admin(headers: &HeaderMap, tokens: &[String]) -> Result<String, AppError> {
    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim();
    if provided.is_empty() {
        return Err(AppError::Auth("缺少管理员令牌".into()));
    }
    let ok = tokens.iter().any(|t| {
        let t = t.trim();
        !t.is_empty() && t == provided
    });
    if !ok {
        return Err(AppError::Auth("管理员令牌无效".into()));
    }
    Ok(provided.to_string())
}

/// 管理端路由统一鉴权
pub async fn admin_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Err(e) = require_admin(req.headers(), &state.admin_tokens) {
        tracing::warn!("管理端请求被拒绝: {} {}", req.method(), req.uri().path());
        return e.into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(token: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
        h
    }

    #[test]
    fn accepts_only_configured_tokens() {
        let tokens = vec!["secret".to_string(), " ".to_string()];
        assert_eq!(require_admin(&headers(" secret "), &tokens).unwrap(), "secret");
        assert!(matches!(
            require_admin(&headers("wrong"), &tokens),
            Err(AppError::Auth(_))
        ));
        assert!(require_admin(&HeaderMap::new(), &tokens).is_err());
        assert!(require_admin(&headers("x"), &[]).is_err());
    }
}
