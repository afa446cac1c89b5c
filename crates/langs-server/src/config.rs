use crate::error::Result;
pub use clap::Parser;
use langs_types::config::StoreConfig;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "REST API over a collection of programming languages")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "LANGS_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "LANGS_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(long, env = "LANGS_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,

    #[command(flatten)]
    pub store: StoreConfig,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn database_url(&self) -> String {
        self.store.database_url()
    }
}
