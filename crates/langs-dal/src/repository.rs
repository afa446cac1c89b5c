use std::sync::Arc;

use futures::{TryStreamExt as _, future};
use sqlx::QueryBuilder;
use tracing::debug;

use crate::{
    Error, ObjectId, Pool,
    error::Result,
    filter::Filter,
    language::{Language, LanguagePatch},
};

const MAX_COLLECTION_NAME: usize = 64;
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Handle to one collection of language documents, backed by a table
/// `(_id TEXT PRIMARY KEY, document TEXT)`.
///
/// Cheap to clone, clones share the connection pool.
#[derive(Clone)]
pub struct Collection {
    pool: Pool,
    name: Arc<str>,
    table: Arc<str>,
}

impl Collection {
    /// Handle to the collection without touching the store.
    pub fn new(pool: Pool, name: &str) -> Result<Self> {
        validate_collection_name(name)?;
        Ok(Collection {
            pool,
            name: name.into(),
            table: format!("\"{name}\"").into(),
        })
    }

    /// Opens the collection, creating its table if it does not exist yet.
    pub async fn open(pool: Pool, name: &str) -> Result<Self> {
        let collection = Collection::new(pool, name)?;
        collection.ensure_created().await?;
        Ok(collection)
    }

    pub async fn ensure_created(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (_id TEXT PRIMARY KEY NOT NULL, document TEXT NOT NULL)",
            self.table
        ))
        .execute(&self.pool)
        .await?;
        debug!("Opened collection {}", self.name);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_collection_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid = valid_start
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.len() <= MAX_COLLECTION_NAME
        && !name.to_ascii_lowercase().starts_with("sqlite_");
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidCollectionName(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceResult {
    pub matched: u64,
    /// Set when the replace created a new document
    pub upserted_id: Option<ObjectId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: u64,
}

pub struct LanguageRepository {
    collection: Collection,
}

impl LanguageRepository {
    pub fn new(collection: Collection) -> Self {
        Self { collection }
    }

    fn table(&self) -> &str {
        &self.collection.table
    }

    fn pool(&self) -> &Pool {
        &self.collection.pool
    }

    /// Cheapest possible round trip to the store
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<Language>> {
        let mut query = QueryBuilder::new(format!("SELECT _id, document FROM {}", self.table()));
        filter.push_where(&mut query);
        debug!("Find query: {}", query.sql());

        let records = query
            .build_query_as::<(String, String)>()
            .fetch(self.pool())
            .map_err(Error::from)
            .and_then(|(id, document)| future::ready(decode(&id, &document)))
            .try_collect::<Vec<_>>()
            .await?;
        Ok(records)
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Option<Language>> {
        let row: Option<(String,)> = sqlx::query_as(&format!(
            "SELECT document FROM {} WHERE _id = ?",
            self.table()
        ))
        .bind(id.to_hex())
        .fetch_optional(self.pool())
        .await?;

        row.map(|(document,)| Language::from_document(*id, &document))
            .transpose()
    }

    /// Stores a new document. A fresh id is generated if the record carries none.
    pub async fn insert(&self, language: &Language) -> Result<ObjectId> {
        let id = language.id.unwrap_or_default();
        let document = language.to_document()?;
        sqlx::query(&format!(
            "INSERT INTO {} (_id, document) VALUES (?, ?)",
            self.table()
        ))
        .bind(id.to_hex())
        .bind(document.to_string())
        .execute(self.pool())
        .await?;
        Ok(id)
    }

    /// Replaces the whole document stored under `id`.
    /// With `upsert` a missing document is created under that id.
    pub async fn replace(
        &self,
        id: &ObjectId,
        language: &Language,
        upsert: bool,
    ) -> Result<ReplaceResult> {
        let document = language.to_document()?.to_string();
        let mut transaction = self.pool().begin_with(BEGIN_WRITE).await?;

        let result = sqlx::query(&format!(
            "UPDATE {} SET document = ? WHERE _id = ?",
            self.table()
        ))
        .bind(&document)
        .bind(id.to_hex())
        .execute(&mut *transaction)
        .await?;

        let outcome = if result.rows_affected() > 0 {
            ReplaceResult {
                matched: result.rows_affected(),
                upserted_id: None,
            }
        } else if upsert {
            sqlx::query(&format!(
                "INSERT INTO {} (_id, document) VALUES (?, ?)",
                self.table()
            ))
            .bind(id.to_hex())
            .bind(&document)
            .execute(&mut *transaction)
            .await?;
            ReplaceResult {
                matched: 0,
                upserted_id: Some(*id),
            }
        } else {
            ReplaceResult {
                matched: 0,
                upserted_id: None,
            }
        };

        transaction.commit().await?;
        Ok(outcome)
    }

    /// Merges the patch into the document stored under `id`, read and write
    /// happen in one transaction. Missing documents are left missing.
    pub async fn update(&self, id: &ObjectId, patch: LanguagePatch) -> Result<UpdateResult> {
        if patch.is_empty() {
            let matched = u64::from(self.get(id).await?.is_some());
            return Ok(UpdateResult {
                matched,
                modified: 0,
            });
        }

        // take the write lock before reading
        let mut transaction = self.pool().begin_with(BEGIN_WRITE).await?;

        let row: Option<(String,)> = sqlx::query_as(&format!(
            "SELECT document FROM {} WHERE _id = ?",
            self.table()
        ))
        .bind(id.to_hex())
        .fetch_optional(&mut *transaction)
        .await?;

        let Some((document,)) = row else {
            return Ok(UpdateResult {
                matched: 0,
                modified: 0,
            });
        };

        let original = Language::from_document(*id, &document)?;
        let mut language = original.clone();
        patch.apply(&mut language);

        let modified = if language != original {
            sqlx::query(&format!(
                "UPDATE {} SET document = ? WHERE _id = ?",
                self.table()
            ))
            .bind(language.to_document()?.to_string())
            .bind(id.to_hex())
            .execute(&mut *transaction)
            .await?
            .rows_affected()
        } else {
            0
        };

        transaction.commit().await?;
        Ok(UpdateResult {
            matched: 1,
            modified,
        })
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<DeleteResult> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE _id = ?", self.table()))
            .bind(id.to_hex())
            .execute(self.pool())
            .await?;
        Ok(DeleteResult {
            deleted: result.rows_affected(),
        })
    }
}

fn decode(id: &str, document: &str) -> Result<Language> {
    Language::from_document(id.parse()?, document)
}
