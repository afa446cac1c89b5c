use clap::Args;
use std::{fs, path::PathBuf};

const MEMORY_CONNECTION: &str = "sqlite::memory:";

#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    #[arg(
        long,
        env = "LANGS_CONNECTION_STRING",
        help = "Connection string of the document store e.g. sqlite://some/dir or sqlite::memory:, default is sqlite://[data-dir]"
    )]
    connection_string: Option<String>,

    #[arg(
        long,
        env = "LANGS_DATABASE_NAME",
        default_value = "languages",
        help = "Database name, the database file [database-name].db is created under the connection string location"
    )]
    pub database_name: String,

    #[arg(
        long,
        env = "LANGS_COLLECTION_NAME",
        default_value = "languages",
        help = "Name of the collection holding language documents"
    )]
    pub collection_name: String,

    #[arg(
        long,
        env = "LANGS_DATA_DIR",
        help = "Data directory (databases etc.), default is system default like ~/.local/share/langs",
        default_value_t = default_data_dir()
    )]
    data_dir: String,
}

fn default_data_dir() -> String {
    let dir = dirs::data_dir()
        .map(|p| p.join("langs"))
        .unwrap_or_else(|| PathBuf::from("langs"));

    if !fs::exists(&dir).expect("Failed to check if data directory exists") {
        fs::create_dir_all(&dir).expect("Failed to create data directory");
    } else if !dir.is_dir() {
        panic!("Data directory is not a directory",)
    }

    dir.to_string_lossy().to_string()
}

impl StoreConfig {
    pub fn connection_string(&self) -> String {
        self.connection_string
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}", self.data_dir))
    }

    /// URL of the database file, composed from connection string and database name.
    pub fn database_url(&self) -> String {
        let connection = self.connection_string();
        if connection == MEMORY_CONNECTION {
            return connection;
        }
        format!(
            "{}/{}.db",
            connection.trim_end_matches('/'),
            self.database_name
        )
    }
}
