use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("petclinic.db")
    }

    /// Clinic settings file, see [`super::ClinicConfig`].
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("petclinic.toml")
    }

    /// Hex-encoded secret used to sign bearer credentials.
    #[must_use]
    pub fn signing_key_path(&self) -> PathBuf {
        self.data_dir.join(".signing_key")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
        }
    }
}
