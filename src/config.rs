use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CliniDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8070";

/// Runtime settings, resolved once at startup from the environment with
/// filesystem defaults under the app data directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub documents_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// `CLINIDESK_ADDR`, `CLINIDESK_DB`, `CLINIDESK_DOCUMENTS`, and
    /// `CLINIDESK_LOG` override the defaults. A malformed bind address
    /// falls back to the default rather than failing startup.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("CLINIDESK_ADDR")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(default_bind_addr);
        let database_path = std::env::var("CLINIDESK_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir().join("clinidesk.db"));
        let documents_dir = std::env::var("CLINIDESK_DOCUMENTS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| documents_dir());
        let log_filter =
            std::env::var("CLINIDESK_LOG").unwrap_or_else(|_| "clinidesk=info,tower_http=info".into());

        Config {
            bind_addr,
            database_path,
            documents_dir,
            log_filter,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    DEFAULT_BIND_ADDR.parse().unwrap_or(SocketAddr::from(([127, 0, 0, 1], 8070)))
}

/// Get the application data directory
/// ~/CliniDesk/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join("CliniDesk"),
        None => PathBuf::from("CliniDesk"),
    }
}

/// Get the uploaded-documents directory
pub fn documents_dir() -> PathBuf {
    app_data_dir().join("documents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("CliniDesk"));
    }

    #[test]
    fn documents_dir_under_app_data() {
        let documents = documents_dir();
        let app = app_data_dir();
        assert!(documents.starts_with(app));
        assert!(documents.ends_with("documents"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_bind_addr_is_loopback() {
        assert!(default_bind_addr().ip().is_loopback());
    }
}
