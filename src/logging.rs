//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// The number of bytes of a request or response body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return Error::InvalidPayload(error).into_response();
        }
    };

    log_request(&parts, &String::from_utf8_lossy(&body));

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;

    let (parts, body) = response.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return (parts.status, error).into_response();
        }
    };

    log_response(&parts, &String::from_utf8_lossy(&body));

    Response::from_parts(parts, Body::from(body))
}

async fn read_body(body: Body) -> Result<Bytes, String> {
    to_bytes(body, usize::MAX)
        .await
        .map_err(|error| error.to_string())
}

/// Cut `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes on a character boundary.
fn truncate_body(body: &str) -> Option<&str> {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return None;
    }

    let end = (0..=LOG_BODY_LENGTH_LIMIT)
        .rev()
        .find(|&index| body.is_char_boundary(index))
        .unwrap_or(0);

    Some(&body[..end])
}

fn log_request(parts: &request::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!(
                "Received request: {} {}\nbody: {truncated}...",
                parts.method,
                parts.uri
            );
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        ),
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    match truncate_body(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {}\nbody: {truncated}...", parts.status);
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {}\nbody: {body:?}", parts.status),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, truncate_body};

    #[test]
    fn short_bodies_are_not_truncated() {
        assert_eq!(truncate_body("{\"amount\": 10}"), None);
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate_body(&body).expect("body should be truncated");

        assert!(truncated.len() <= LOG_BODY_LENGTH_LIMIT);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn bodies_pass_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = "x".repeat(LOG_BODY_LENGTH_LIMIT * 2);

        let response = server.post("/echo").text(body.clone()).await;

        response.assert_status_ok();
        response.assert_text(body);
    }
}
