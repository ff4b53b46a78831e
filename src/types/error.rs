use color_eyre::Report;

/// Top-level zigup error type.
#[derive(thiserror::Error, Debug)]
pub enum ZigupError {
    /// The user-supplied version spec could not be parsed.
    #[error("invalid version spec: {0}")]
    InvalidVersion(String),

    /// Host architecture/OS has no known Zig download token.
    #[error("unsupported host platform: {0}")]
    UnsupportedSystem(String),

    /// An operation needing an installed version found none.
    #[error("no Zig versions are installed")]
    NoInstalledVersions,

    #[error("could not determine a data directory for this platform")]
    NoDataDirectory,

    #[error("could not determine a cache directory for this platform")]
    NoCacheDirectory,

    #[error("could not determine a config directory for this platform")]
    NoConfigDirectory,

    #[error("download failed")]
    DownloadFailed(#[from] NetErr),

    #[error("unknown archive extension for {0}")]
    UnknownArchiveExtension(String),

    #[error("zls build failed")]
    FailedCompile(#[source] Report),

    #[error("failed to clone {url}")]
    FailedClone {
        url: String,
        #[source]
        source: Report,
    },

    #[error("failed to fetch origin")]
    FailedFetch(#[source] Report),

    #[error("failed to checkout {reference}")]
    FailedCheckout {
        reference: String,
        #[source]
        source: Report,
    },

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] CfgErr),

    /// Propagated from [`ResolveError`] at the VersionResolver boundary.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    General(#[from] Report),
}

/// Network-layer error taxonomy, matching §4.1/§4.2 of the design.
#[derive(thiserror::Error, Debug)]
pub enum NetErr {
    #[error("invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("failed to connect: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    SendRecv(#[source] reqwest::Error),

    #[error("server responded with {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("failed to write response body: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to write cache file {path}: {source}")]
    WriteCacheFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse index document: {0}")]
    ParseFailed(#[source] serde_json::Error),
}

impl NetErr {
    pub fn connect_or_send(err: reqwest::Error) -> Self {
        if err.is_connect() {
            NetErr::Connect(err)
        } else {
            NetErr::SendRecv(err)
        }
    }
}

/// `zigup.conf` parse/write errors.
#[derive(thiserror::Error, Debug)]
pub enum CfgErr {
    #[error("config file not found or unreadable: {0}")]
    NotFound(#[source] std::io::Error),

    #[error("{path}:{line}: unknown config key {key:?}")]
    UnknownKey {
        path: std::path::PathBuf,
        line: usize,
        key: String,
    },

    #[error("{path}:{line}: expected key=value")]
    MalformedLine {
        path: std::path::PathBuf,
        line: usize,
    },

    #[error("failed to write config to {path}: {source}")]
    WriteFail {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sticky failure mode of [`crate::app::resolver::VersionResolver`].
///
/// `NoDate` is the one variant that is a failure for `date()` but not for
/// `id()`/`url()` — callers that only need `date()` propagate it as an error,
/// callers that called `id()`/`url()` first never see it.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ResolveError {
    #[error("invalid version spec: {0}")]
    InvalidVersion(String),

    #[error("release index is not valid JSON: {0}")]
    InvalidIndexJson(String),

    #[error("unsupported host platform: {0}")]
    UnsupportedSystem(String),

    #[error("no Zig versions are installed")]
    NoInstalledVersions,

    #[error("could not find a matching install for {0}")]
    FailedInstallSearch(String),

    #[error("no release date available for this resolution")]
    NoDate,
}
