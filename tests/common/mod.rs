use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

use shamba::config::{Config, SessionBackend};
use shamba::prediction::{HttpPredictionClient, PredictionClient};

/// Config whose prediction endpoint is `<server>/predict`
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.prediction.endpoint = format!("{}/predict", server.uri());
    config.prediction.timeout_seconds = 5;
    config.session.backend = SessionBackend::Memory;
    config.session.login_delay_ms = 0;
    config
}

#[allow(dead_code)]
pub fn http_client(config: &Config) -> Arc<dyn PredictionClient> {
    Arc::new(HttpPredictionClient::new(&config.prediction).expect("failed to build http client"))
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
