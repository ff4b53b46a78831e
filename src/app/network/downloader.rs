//! `Downloader` (spec §4.1): a single GET, streamed to a writer, no retry.

use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::types::NetErr;

#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(client: reqwest::Client) -> Self {
        Downloader { client }
    }

    /// Streams `url`'s body into `writer` in chunks. The URL is parsed up
    /// front so a malformed URL fails as `UrlParse` rather than being
    /// misreported as a connect/send error; non-2xx responses fail as
    /// `HttpStatus`; transport errors are split into connect vs.
    /// send/receive per `NetErr::connect_or_send`. Reports progress the way
    /// the teacher's own `download_file` does: a byte-counted bar when the
    /// server sends `Content-Length`, a spinner otherwise.
    pub async fn download<W>(&self, url: &str, mut writer: W) -> Result<(), NetErr>
    where
        W: AsyncWrite + Unpin,
    {
        let parsed = url::Url::parse(url)?;
        let response = self.client.get(parsed).send().await.map_err(NetErr::connect_or_send)?;
        if !response.status().is_success() {
            return Err(NetErr::HttpStatus(response.status()));
        }

        let filename = url.rsplit('/').next().unwrap_or(url);
        let pb = progress_bar(response.content_length(), filename);

        let mut stream = response.bytes_stream();
        use futures::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(NetErr::connect_or_send)?;
            writer.write_all(&chunk).await.map_err(NetErr::Write)?;
            pb.inc(chunk.len() as u64);
        }
        writer.flush().await.map_err(NetErr::Write)?;
        pb.finish_and_clear();
        Ok(())
    }

    /// Convenience for the two index documents: fetches `url` and returns
    /// the body as a `String`.
    pub async fn download_to_string(&self, url: &str) -> Result<String, NetErr> {
        let parsed = url::Url::parse(url)?;
        let response = self.client.get(parsed).send().await.map_err(NetErr::connect_or_send)?;
        if !response.status().is_success() {
            return Err(NetErr::HttpStatus(response.status()));
        }
        response.text().await.map_err(NetErr::connect_or_send)
    }
}

fn progress_bar(total: Option<u64>, filename: &str) -> ProgressBar {
    let pb = match total {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{msg} {spinner:.green}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    };
    pb.set_message(format!("downloading {filename}"));
    pb
}

/// Builds the shared HTTP client: keep-alive disabled (`pool_max_idle_per_host(0)`),
/// platform proxy discovery left at reqwest's defaults, conservative timeouts.
pub fn create_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("zigup/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(0)
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn malformed_url_fails_as_url_parse() {
        let downloader = Downloader::new(reqwest::Client::new());
        let mut buf = Vec::new();
        let err = downloader.download("not a url", &mut buf).await.unwrap_err();
        assert!(matches!(err, NetErr::UrlParse(_)));
    }

    #[tokio::test]
    async fn streams_body_into_writer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zig-linux-x86_64-0.13.0.tar.xz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"archive-bytes".to_vec()))
            .mount(&server)
            .await;

        let downloader = Downloader::new(reqwest::Client::new());
        let mut buf = Vec::new();
        downloader
            .download(&format!("{}/zig-linux-x86_64-0.13.0.tar.xz", server.uri()), &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, b"archive-bytes");
    }

    #[tokio::test]
    async fn non_2xx_status_fails_as_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.tar.xz"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let downloader = Downloader::new(reqwest::Client::new());
        let mut buf = Vec::new();
        let err = downloader.download(&format!("{}/missing.tar.xz", server.uri()), &mut buf).await.unwrap_err();
        assert!(matches!(err, NetErr::HttpStatus(_)));
    }

    #[tokio::test]
    async fn download_to_string_returns_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"master\":{}}"))
            .mount(&server)
            .await;

        let downloader = Downloader::new(reqwest::Client::new());
        let body = downloader.download_to_string(&format!("{}/index.json", server.uri())).await.unwrap();
        assert_eq!(body, "{\"master\":{}}");
    }
}
