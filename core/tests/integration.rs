//! End-to-end content negotiation against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives it through a `ureq`
//! backed `Transport`. The server reflects what it received, so these tests
//! observe the `Content-Type` that actually went over the wire rather than
//! what the request builder believes it sent.

use restspec_core::matchers::{contains_string, equal_to, is};
use restspec_core::{
    DecoderConfig, EncoderConfig, HttpMethod, HttpRequest, HttpResponse, RestClient, RestConfig,
    Selector, SpecError, Transport, TransportError,
};

/// Executes requests with ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = req.body.as_deref();
        let result = match req.method {
            HttpMethod::Get => with_headers(self.agent.get(&req.path), &req.headers).call(),
            HttpMethod::Head => with_headers(self.agent.head(&req.path), &req.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&req.path), &req.headers).call(),
            HttpMethod::Options => with_headers(self.agent.options(&req.path), &req.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&req.path), &req.headers);
                match body {
                    Some(bytes) => builder.send(bytes),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(&req.path), &req.headers);
                match body {
                    Some(bytes) => builder.send(bytes),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Patch => {
                let builder = with_headers(self.agent.patch(&req.path), &req.headers);
                match body {
                    Some(bytes) => builder.send(bytes),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(TransportError::new)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(TransportError::new)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn streaming_config(append: bool) -> EncoderConfig {
    EncoderConfig::default().with_append_charset_for_streaming_content_if_undefined(append)
}

#[test]
fn can_validate_response_content_type() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    let response = client.given().get(&transport, "/hello").unwrap();
    let failures = response.then().content_type("something").failures().unwrap();

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].selector, Selector::ContentType);
    assert_eq!(
        failures[0].message,
        "Expected content-type \"something\" doesn't match actual content-type \"application/json; charset=UTF-8\"."
    );
}

#[test]
fn can_validate_response_content_type_with_matcher() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    client
        .given()
        .get(&transport, "/hello")
        .unwrap()
        .then()
        .status_code(200)
        .content_type(is(equal_to("application/json; charset=UTF-8")))
        .body(contains_string("Hello Scalatra"))
        .verify()
        .unwrap();
}

#[test]
fn no_charset_for_default_streaming_type_when_append_is_off() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    client
        .given()
        .encoder_config(streaming_config(false))
        .body([42u8])
        .post(&transport, "/returnContentTypeAsBody")
        .unwrap()
        .then()
        .body(equal_to("application/octet-stream"))
        .verify()
        .unwrap();
}

#[test]
fn no_charset_for_explicit_streaming_type_when_append_is_off() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    client
        .given()
        .encoder_config(streaming_config(false))
        .content_type("application/zip")
        .body([42u8])
        .post(&transport, "/returnContentTypeAsBody")
        .unwrap()
        .then()
        .body(equal_to("application/zip"))
        .verify()
        .unwrap();
}

#[test]
fn charset_appended_to_explicit_streaming_type_when_append_is_on() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    client
        .given()
        .encoder_config(streaming_config(true).with_default_content_charset("UTF-8"))
        .content_type("application/zip")
        .body([42u8])
        .post(&transport, "/returnContentTypeAsBody")
        .unwrap()
        .then()
        .body(equal_to("application/zip; charset=UTF-8"))
        .verify()
        .unwrap();
}

#[test]
fn charset_appended_to_default_streaming_type_when_append_is_on() {
    let client = RestClient::new(&start_server()).with_config(
        RestConfig::default().with_encoder_config(streaming_config(true)),
    );
    let transport = UreqTransport::new();

    client
        .given()
        .body([42u8])
        .post(&transport, "/returnContentTypeAsBody")
        .unwrap()
        .then()
        .body(equal_to("application/octet-stream; charset=ISO-8859-1"))
        .verify()
        .unwrap();
}

#[test]
fn body_without_charset_uses_decoder_default() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    let response = client.given().get(&transport, "/latin1").unwrap();
    assert_eq!(response.charset().unwrap(), "ISO-8859-1");
    assert_eq!(response.body_as_text().unwrap(), "Grüß");
    assert_eq!(response.body_bytes(), &[0x47, 0x72, 0xFC, 0xDF]);

    let response = client
        .given()
        .decoder_config(DecoderConfig::default().with_default_content_charset("US-ASCII"))
        .get(&transport, "/latin1")
        .unwrap();
    assert_eq!(response.body_as_text().unwrap(), "Gr\u{FFFD}\u{FFFD}");
}

#[test]
fn text_body_round_trips_through_echo() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    let response = client
        .given()
        .content_type("text/plain; charset=UTF-8")
        .body_text("Grüß")
        .post(&transport, "/echo")
        .unwrap();
    assert_eq!(response.header("content-type"), Some("text/plain; charset=UTF-8"));
    assert_eq!(response.body_bytes(), "Grüß".as_bytes());

    let response = client
        .given()
        .body_text("Grüß")
        .put(&transport, "/echo")
        .unwrap();
    assert_eq!(response.header("content-type"), Some("text/plain; charset=ISO-8859-1"));
    assert_eq!(response.body_as_text().unwrap(), "Grüß");
}

#[test]
fn malformed_response_content_type_is_lazy() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    let response = client.given().get(&transport, "/malformedContentType").unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body_bytes(), b"abc");
    response.then().content_type("nonsense").verify().unwrap();

    assert!(matches!(response.content_type(), Err(e) if e.input == "nonsense"));
    let err = response.then().body("abc").verify().unwrap_err();
    assert!(matches!(err, SpecError::Format(_)));
}

#[test]
fn repeated_response_headers_are_kept() {
    let client = RestClient::new(&start_server());
    let transport = UreqTransport::new();

    let response = client.given().get(&transport, "/multiValueHeader").unwrap();
    assert_eq!(
        response.header_values("X-Multi").collect::<Vec<_>>(),
        vec!["first", "second"]
    );
    response.then().header("x-multi", "first").verify().unwrap();
}

#[test]
fn transport_errors_surface_unchanged() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = RestClient::new(&format!("http://127.0.0.1:{port}"));

    let err = client.given().get(&UreqTransport::new(), "/hello").unwrap_err();
    match err {
        SpecError::Transport(inner) => {
            assert!(inner.into_inner().downcast::<ureq::Error>().is_ok());
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}
