//! Local HTTP stub for adapter and end-to-end tests

use std::io::Read as _;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Response, Server};

/// A request as the stub saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serves one canned `(status, body)` per request, in order, then stops.
pub struct StubServer {
    pub base_url: String,
    handle: JoinHandle<Vec<Recorded>>,
}

impl StubServer {
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();

        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(10)) else {
                    break;
                };
                let mut text = String::new();
                let _ = request.as_reader().read_to_string(&mut text);
                seen.push(Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.as_str().to_string(), h.value.as_str().to_string()))
                        .collect(),
                    body: text,
                });
                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(content_type);
                let _ = request.respond(response);
            }
            seen
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            handle,
        }
    }

    /// Wait for the scripted responses to be used up
    pub fn finish(self) -> Vec<Recorded> {
        self.handle.join().unwrap()
    }
}
