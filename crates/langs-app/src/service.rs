use std::time::Duration;

use axum::extract::FromRequestParts;
use http::request::Parts;
use langs_dal::{
    error::Result,
    filter::Filter,
    language::{Language, LanguageFilter, LanguagePatch},
    repository::{Collection, LanguageRepository},
    ObjectId,
};
use tracing::{debug, warn};

use crate::state::AppState;

pub const PING_TIMEOUT: Duration = Duration::from_millis(1000);

/// Outcome of an operation addressing a single record by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Found,
    NotFound,
    InvalidId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Language),
    NotFound,
    InvalidId,
}

/// Replace upserts, so it never reports a missing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    InvalidId,
    Found,
    Created(ObjectId),
}

/// CRUD operations over the languages collection.
///
/// Holds no state of its own beyond the shared collection handle, so it is
/// created per request.
pub struct LanguageService {
    repository: LanguageRepository,
}

impl LanguageService {
    pub fn new(collection: Collection) -> Self {
        LanguageService {
            repository: LanguageRepository::new(collection),
        }
    }

    /// True only if the store answered within [`PING_TIMEOUT`]
    pub async fn ping(&self) -> bool {
        match tokio::time::timeout(PING_TIMEOUT, self.repository.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Store ping failed: {e}");
                false
            }
            Err(_) => {
                warn!("Store ping timed out after {PING_TIMEOUT:?}");
                false
            }
        }
    }

    pub async fn find_many(&self, template: &LanguageFilter) -> Result<Vec<Language>> {
        let filter = Filter::from_template(template)?;
        self.repository.find(&filter).await
    }

    pub async fn find_one(&self, id: &str) -> Result<Lookup> {
        let Some(id) = parse_id(id) else {
            return Ok(Lookup::InvalidId);
        };
        let lookup = match self.repository.get(&id).await? {
            Some(language) => Lookup::Found(language),
            None => Lookup::NotFound,
        };
        Ok(lookup)
    }

    /// Stores the record under a newly generated id, any id it carries is discarded.
    pub async fn insert_one(&self, mut language: Language) -> Result<ObjectId> {
        language.id = Some(ObjectId::new());
        let id = self.repository.insert(&language).await?;
        debug!("Inserted language {id}");
        Ok(id)
    }

    pub async fn replace_one(&self, id: &str, mut language: Language) -> Result<ReplaceOutcome> {
        let Some(id) = parse_id(id) else {
            return Ok(ReplaceOutcome::InvalidId);
        };
        language.id = Some(id);
        let result = self.repository.replace(&id, &language, true).await?;
        Ok(match result.upserted_id {
            Some(created) => {
                debug!("Replace created language {created}");
                ReplaceOutcome::Created(created)
            }
            None => ReplaceOutcome::Found,
        })
    }

    /// Merge patch, does not create missing records.
    pub async fn update_one(&self, id: &str, patch: LanguagePatch) -> Result<ResponseCode> {
        let Some(id) = parse_id(id) else {
            return Ok(ResponseCode::InvalidId);
        };
        let result = self.repository.update(&id, patch).await?;
        Ok(if result.matched == 1 {
            ResponseCode::Found
        } else {
            ResponseCode::NotFound
        })
    }

    pub async fn delete_one(&self, id: &str) -> Result<ResponseCode> {
        let Some(id) = parse_id(id) else {
            return Ok(ResponseCode::InvalidId);
        };
        let result = self.repository.delete(&id).await?;
        Ok(if result.deleted == 0 {
            ResponseCode::NotFound
        } else {
            ResponseCode::Found
        })
    }
}

fn parse_id(id: &str) -> Option<ObjectId> {
    id.parse()
        .inspect_err(|e| debug!("Rejected id: {e}"))
        .ok()
}

impl FromRequestParts<AppState> for LanguageService {
    type Rejection = http::StatusCode;

    fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = std::result::Result<Self, Self::Rejection>>
           + core::marker::Send {
        futures::future::ready(Ok(LanguageService::new(state.collection().clone())))
    }
}
