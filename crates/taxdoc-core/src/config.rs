use std::path::PathBuf;

/// Runtime configuration shared by the ingestion and query paths.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the Google Generative Language API. `None` when the
    /// environment variable is unset; both paths report this distinctly.
    pub api_key: Option<String>,
    /// Directory scanned for source PDFs.
    pub data_dir: PathBuf,
    /// Directory holding the LanceDB vector index.
    pub index_dir: PathBuf,
}

impl Config {
    /// Read configuration from the environment.
    /// `TAXDOC_DATA_DIR` and `TAXDOC_INDEX_DIR` override the relative defaults.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GOOGLE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            data_dir: env_path("TAXDOC_DATA_DIR", "data"),
            index_dir: env_path("TAXDOC_INDEX_DIR", "index"),
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
