pub mod error;
pub mod filter;
pub mod language;
pub mod object_id;
pub mod repository;

use std::str::FromStr as _;

pub use error::Error;
pub use object_id::ObjectId;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type Pool = sqlx::Pool<ChosenDB>;

const MAX_CONNECTIONS: u32 = 50;

/// Creates the store connection pool. Connections are opened lazily, so
/// reachability of the store is only known after the first round trip.
pub fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool = if in_memory {
        // in-memory database lives only as long as its connection
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_lazy_with(options)
    } else {
        SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy_with(options)
    };
    Ok(pool)
}
