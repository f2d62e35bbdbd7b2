use std::path::PathBuf;

use pad_upstream::Paging;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against the
/// public PAD service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8008`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the PAD web service.
    pub pad_api_url: String,
    /// Timeout for each upstream request in seconds (default: `30`).
    pub pad_api_timeout_secs: u64,
    /// `limit` used when paging upstream listings (default: `100`).
    pub pad_page_size: u32,
    /// Upper bound on pages fetched by one listing scan (default: `50`).
    pub pad_max_pages: u32,
    /// Width the card layout is scaled to when no width is requested.
    pub display_width: u32,
    /// Optional JSON file replacing the built-in v2 card layout.
    pub layout_path: Option<PathBuf>,
    /// Optional override of the ontology vocabulary base URI.
    pub ontology_vocab: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8008`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PAD_API_URL`          | `https://pad.crc.nd.edu`   |
    /// | `PAD_API_TIMEOUT_SECS` | `30`                       |
    /// | `PAD_PAGE_SIZE`        | `100`                      |
    /// | `PAD_MAX_PAGES`        | `50`                       |
    /// | `DISPLAY_WIDTH`        | `300`                      |
    /// | `LAYOUT_PATH`          | unset (built-in layout)    |
    /// | `ONTOLOGY_VOCAB`       | unset (PAD vocabulary)     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8008".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let pad_api_url =
            std::env::var("PAD_API_URL").unwrap_or_else(|_| "https://pad.crc.nd.edu".into());

        let pad_api_timeout_secs: u64 = std::env::var("PAD_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("PAD_API_TIMEOUT_SECS must be a valid u64");

        let pad_page_size: u32 = std::env::var("PAD_PAGE_SIZE")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("PAD_PAGE_SIZE must be a valid u32");
        assert!(pad_page_size > 0, "PAD_PAGE_SIZE must be at least 1");

        let pad_max_pages: u32 = std::env::var("PAD_MAX_PAGES")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("PAD_MAX_PAGES must be a valid u32");

        let display_width: u32 = std::env::var("DISPLAY_WIDTH")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("DISPLAY_WIDTH must be a valid u32");

        let layout_path = std::env::var("LAYOUT_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let ontology_vocab = std::env::var("ONTOLOGY_VOCAB")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            pad_api_url,
            pad_api_timeout_secs,
            pad_page_size,
            pad_max_pages,
            display_width,
            layout_path,
            ontology_vocab,
        }
    }

    /// Upstream paging derived from `PAD_PAGE_SIZE` / `PAD_MAX_PAGES`.
    pub fn paging(&self) -> Paging {
        Paging {
            page_size: self.pad_page_size,
            max_pages: self.pad_max_pages,
        }
    }
}
