use std::{path::Path, time::Duration};

use anyhow::{Result, anyhow};
use langs_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use reqwest::Url;
use tempfile::TempDir;
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::info;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, base_dir: &Path) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let connection = format!("sqlite://{data_dir}");
    let port = random_port()?.to_string();
    let args = [
        "langs-e2e-tests",
        "--data-dir",
        &data_dir,
        "--connection-string",
        &connection,
        "--port",
        &port,
        "--no-cors",
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Test configuration with its data directory under the system temp dir
pub fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    test_config(test_name, &std::env::temp_dir())
}

pub fn base_url(config: &ServerConfig) -> Result<Url> {
    let url = Url::parse(&format!("http://{}:{}/", config.listen_address, config.port))?;
    Ok(url)
}

/// Running server, shut down gracefully when dropped
pub struct ServerGuard {
    shutdown: Option<oneshot::Sender<()>>,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub async fn spawn_server(args: ServerConfig) -> Result<ServerGuard> {
    let state = langs_server::run::build_state(&args).await?;
    let addr: std::net::SocketAddr = format!("{}:{}", args.listen_address, args.port).parse()?;
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        if let Err(e) = langs_server::run::run_graceful_with_state(args, state, shutdown).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let mut retries = 50;
    while tokio::net::TcpStream::connect(addr).await.is_err() {
        retries -= 1;
        if retries == 0 {
            return Err(anyhow!("Server did not start listening on {addr}"));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    info!("Test server listening on {addr}");

    Ok(ServerGuard {
        shutdown: Some(tx),
        handle,
    })
}

pub fn extend_url(url: &Url, segment: impl ToString) -> Url {
    let mut url = url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(&segment.to_string());
    }
    url
}
