use axum::{
    extract::Request,
    http::{
        header::{CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
        HeaderName, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

/// Same-origin policy for the chat UI; inline styles/scripts and the icon
/// stylesheet CDN are the only exceptions.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'self'; \
     style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com; \
     script-src 'self' 'unsafe-inline'; \
     img-src 'self' data: https:; \
     connect-src 'self'";

const HEADERS: [(HeaderName, &str); 4] = [
    (CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY_VALUE),
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (X_FRAME_OPTIONS, "SAMEORIGIN"),
    (REFERRER_POLICY, "no-referrer"),
];

/// Adds browser hardening headers to every response that lacks them
pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    for (name, value) in HEADERS {
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }

    response
}
