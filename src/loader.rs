//! Dataset loader: one HTTP GET for the cyclist dataset

use crate::data::Dataset;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::{debug, error, info};
use url::Url;

/// Location of the race dataset
pub const DATA_URL: &str =
    "https://raw.githubusercontent.com/freeCodeCamp/ProjectReferenceData/master/cyclist-data.json";

/// Fetches the dataset from a fixed URL
pub struct DatasetLoader {
    client: reqwest::Client,
    url: Url,
}

impl DatasetLoader {
    /// Create a loader for `url` with the default HTTP client
    pub fn new(url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("doping-scatter"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Self::with_client(url, client)
    }

    /// Create a loader for `url` using a preconfigured client
    pub fn with_client(url: &str, client: reqwest::Client) -> Result<Self> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::ConfigError(format!(
                "Unsupported dataset URL scheme: {}",
                url.scheme()
            )));
        }
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch and parse the dataset, reporting any failure
    pub async fn fetch(&self) -> Result<Dataset> {
        debug!("Fetching dataset from {}", self.url);

        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::StatusError { status });
        }

        let body = response.text().await?;
        let dataset: Dataset = serde_json::from_str(&body)?;
        Ok(dataset)
    }

    /// Fetch the dataset once. Failures are logged and yield an empty dataset.
    pub async fn load(&self) -> Dataset {
        match self.fetch().await {
            Ok(dataset) => {
                info!("Loaded {} records from {}", dataset.len(), self.url);
                dataset
            }
            Err(e) => {
                error!("Error: {}", e);
                Dataset::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Log output shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            std::io::Write::write(&mut *self.0.lock().unwrap(), buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Route this thread's events into a buffer until the guard drops
    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    const BODY: &str = r#"[
        {"Time": "36:50", "Place": 1, "Seconds": 2210, "Name": "Marco Pantani", "Year": 1995,
         "Nationality": "ITA", "Doping": "Alleged drug use during 1995 due to high hematocrit levels"},
        {"Time": "36:55", "Place": 2, "Seconds": 2215, "Name": "Marco Pantani", "Year": 1997,
         "Nationality": "ITA", "Doping": ""}
    ]"#;

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    /// Serve a single canned response and return the URL to request
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/cyclist-data.json", addr)
    }

    fn loader(url: &str) -> DatasetLoader {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        DatasetLoader::with_client(url, client).unwrap()
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            DatasetLoader::new("ftp://example.com/data.json"),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            DatasetLoader::new("not a url"),
            Err(Error::UrlError(_))
        ));
    }

    #[test]
    fn test_default_url_is_valid() {
        let loader = DatasetLoader::new(DATA_URL).unwrap();
        assert_eq!(loader.url().host_str(), Some("raw.githubusercontent.com"));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let url = serve_once(http_response("200 OK", BODY)).await;
        let dataset = loader(&url).load().await;

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(0).unwrap().name, "Marco Pantani");
        assert!(dataset.get(0).unwrap().has_allegation());
        assert!(!dataset.get(1).unwrap().has_allegation());
    }

    #[tokio::test]
    async fn test_non_ok_status_is_an_error() {
        let url = serve_once(http_response("404 Not Found", "")).await;
        let loader = loader(&url);

        let err = loader.fetch().await.unwrap_err();
        assert!(matches!(err, Error::StatusError { status } if status.as_u16() == 404));
    }

    #[tokio::test]
    async fn test_parse_error_yields_empty_dataset() {
        let url = serve_once(http_response("200 OK", r#"{"not": "an array"}"#)).await;
        let (logs, _guard) = capture_logs();

        let dataset = loader(&url).load().await;
        assert!(dataset.is_empty());

        let output = logs.contents();
        assert!(output.contains("ERROR"));
        assert!(output.contains("invalid type"));
    }

    #[tokio::test]
    async fn test_network_error_is_swallowed() {
        // Grab a free port, then close it so the connection is refused
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let loader = loader(&format!("http://{}/cyclist-data.json", addr));
        assert!(matches!(loader.fetch().await, Err(Error::HttpError(_))));

        let (logs, _guard) = capture_logs();
        assert!(loader.load().await.is_empty());

        let output = logs.contents();
        assert!(output.contains("ERROR"));
        assert!(output.contains("error sending request"));
        assert!(output.contains(&addr.to_string()));
    }
}
