use axum::{Extension, extract::Request, http::StatusCode, middleware::Next, response::Response};
use tracing::warn;

use feastlog::TokenVerifier;

pub async fn auth_middleware(
    Extension(verifier): Extension<TokenVerifier>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = bearer_token(auth_header).ok_or(StatusCode::UNAUTHORIZED)?;

    let user = match verifier.verify(token).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Rejected request with unverifiable token: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    request.extensions_mut().insert(user.email);
    Ok(next.run(request).await)
}

// The credential is the second whitespace-delimited segment of the header
// value ("Bearer <token>"); the scheme word itself is not checked.
fn bearer_token(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn extracts_the_second_segment() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
    }

    #[test]
    fn scheme_alone_yields_nothing() {
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn extra_whitespace_is_tolerated() {
        assert_eq!(bearer_token("Bearer   abc123"), Some("abc123"));
    }
}
