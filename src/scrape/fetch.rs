use std::time::Duration;

use crate::error::{Result, ShelfError};
use crate::settings::ExtractorSettings;

const USER_AGENT: &str = concat!("taskshelf/", env!("CARGO_PKG_VERSION"));

/// Something that can hand back the raw markup of one listing page.
pub trait PageSource {
    /// Fails with [`ShelfError::Fetch`] when the page cannot be retrieved.
    fn fetch_page(&mut self, url: &str) -> Result<String>;
}

/// Plain sequential HTTP fetcher. No retries: a failed page stays failed.
pub struct HttpPageSource {
    agent: ureq::Agent,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }

    pub fn from_settings(settings: &ExtractorSettings) -> Self {
        Self::new(Duration::from_secs(settings.timeout_secs))
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&mut self, url: &str) -> Result<String> {
        match self.agent.get(url).call() {
            Ok(response) => response
                .into_string()
                .map_err(|err| ShelfError::fetch(url, format!("failed to read body: {err}"))),
            Err(ureq::Error::Status(code, _)) => {
                Err(ShelfError::fetch(url, format!("HTTP status {code}")))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ShelfError::fetch(url, transport.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer exactly one request on a loopback port with `response`.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/catalogue/page-1.html")
    }

    #[test]
    fn test_success_returns_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\n<p>page</p>",
        );
        let mut source = HttpPageSource::new(Duration::from_secs(5));
        assert_eq!(source.fetch_page(&url).unwrap(), "<p>page</p>");
    }

    #[test]
    fn test_error_status_is_fetch_error() {
        let url = serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let mut source = HttpPageSource::new(Duration::from_secs(5));
        match source.fetch_page(&url) {
            Err(ShelfError::Fetch { url: failed, reason }) => {
                assert_eq!(failed, url);
                assert_eq!(reason, "HTTP status 404");
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[test]
    fn test_refused_connection_is_fetch_error() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let mut source = HttpPageSource::new(Duration::from_secs(5));
        let result = source.fetch_page(&format!("http://{addr}/"));
        assert!(matches!(result, Err(ShelfError::Fetch { .. })));
    }
}
