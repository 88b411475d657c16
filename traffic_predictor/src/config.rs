use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Settings read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub models_dir: PathBuf,
    pub addr: SocketAddr,
}

impl PredictorConfig {
    pub fn from_env() -> Self {
        let models_dir = env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string());
        let port: u16 = env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8080);
        let host: IpAddr = env::var("BIND_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        Self {
            models_dir: PathBuf::from(models_dir),
            addr: SocketAddr::new(host, port),
        }
    }
}
