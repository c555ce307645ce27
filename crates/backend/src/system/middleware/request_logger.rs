use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::shared::format::format_number;
use crate::shared::time;

/// One request log line: local display time, duration, response size,
/// status, method and path.
fn log_line(
    clock: &str,
    duration: Duration,
    size: Option<usize>,
    status: StatusCode,
    method: &Method,
    path: &str,
) -> String {
    // cyan for 200, brown otherwise
    let color_code = if status == StatusCode::OK { "36" } else { "33" };
    let size = size.map(format_number).unwrap_or_else(|| "error".to_string());
    format!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        clock,
        duration.as_millis(),
        size,
        status.as_u16(),
        method,
        path
    )
}

/// Middleware that logs HTTP requests
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Buffer the body to learn its real size
    let bytes = to_bytes(body, usize::MAX).await;
    let clock = Utc::now()
        .with_timezone(&time::display_offset())
        .format("%H:%M:%S")
        .to_string();

    match bytes {
        Ok(bytes) => {
            println!(
                "{}",
                log_line(&clock, start.elapsed(), Some(bytes.len()), parts.status, &method, &path)
            );
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            println!(
                "{}",
                log_line(&clock, start.elapsed(), None, parts.status, &method, &path)
            );
            tracing::warn!("Failed to buffer response body of {} {}: {}", method, path, e);
            Response::from_parts(parts, Body::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_shows_size_status_and_path() {
        let line = log_line(
            "12:00:00",
            Duration::from_millis(42),
            Some(1_234_567),
            StatusCode::CREATED,
            &Method::POST,
            "/api/work-orders",
        );
        assert!(line.contains("42ms"));
        assert!(line.contains("1.234.567"));
        assert!(line.contains("201"));
        assert!(line.ends_with("POST /api/work-orders"));
        assert!(line.starts_with("\x1b[33m"));
    }

    #[test]
    fn failed_body_is_marked() {
        let line = log_line(
            "08:00:00",
            Duration::from_millis(1),
            None,
            StatusCode::OK,
            &Method::GET,
            "/health",
        );
        assert!(line.contains("error"));
        assert!(line.starts_with("\x1b[36m"));
    }
}
