use axum::{
    body::Bytes,
    http::{
        header::{HeaderMap, HeaderValue, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Greeting {
    pub hello: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/returnContentTypeAsBody", post(return_content_type_as_body))
        .route("/echo", post(echo).put(echo))
        .route("/latin1", get(latin1))
        .route("/malformedContentType", get(malformed_content_type))
        .route("/multiValueHeader", get(multi_value_header))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// JSON greeting with an explicit charset on the content type.
async fn hello() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/json; charset=UTF-8")],
        Json(Greeting {
            hello: "Hello Scalatra".to_string(),
        }),
    )
}

/// Reflects the request's `Content-Type` header verbatim.
async fn return_content_type_as_body(headers: HeaderMap) -> impl IntoResponse {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    debug!(content_type = content_type.as_str(), "reflecting request content type");
    ([(CONTENT_TYPE, "text/plain; charset=UTF-8")], content_type)
}

/// Returns the request body and content type unchanged.
async fn echo(headers: HeaderMap, body: Bytes) -> Response {
    debug!(len = body.len(), "echoing request body");
    let mut response = body.into_response();
    match headers.get(CONTENT_TYPE) {
        Some(content_type) => {
            response.headers_mut().insert(CONTENT_TYPE, content_type.clone());
        }
        None => {
            response.headers_mut().remove(CONTENT_TYPE);
        }
    }
    response
}

/// "Grüß" in ISO-8859-1 with no charset parameter.
async fn latin1() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/plain")], vec![0x47u8, 0x72, 0xFC, 0xDF])
}

async fn malformed_content_type() -> impl IntoResponse {
    ([(CONTENT_TYPE, "nonsense")], "abc")
}

async fn multi_value_header() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.append("x-multi", HeaderValue::from_static("first"));
    headers.append("x-multi", HeaderValue::from_static("second"));
    (StatusCode::OK, headers, "")
}
