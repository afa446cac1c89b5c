use axum::{
    extract::{rejection::QueryRejection, Path, Query},
    response::IntoResponse,
    routing::get,
    Json,
};
use http::{header, StatusCode};
use langs_dal::language::{
    check_timestamp, Language, LanguageField, LanguageFilter, LanguagePatch,
};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    service::{LanguageService, Lookup, ReplaceOutcome, ResponseCode},
    state::AppState,
    validate::ValidJson,
};

/// Envelope of the listing response
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Languages {
    pub languages: Vec<Language>,
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(paths(list, get_one, create, replace, update, delete_one))]
struct ModuleDocs;

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    ModuleDocs::openapi()
}

fn invalid_query(detail: impl ToString) -> ApiError {
    ApiError::InvalidQuery(detail.to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds a search template from query string pairs. Keys are matched
/// case-insensitively against the language fields, empty values are absent.
pub fn parse_template(params: Vec<(String, String)>) -> ApiResult<LanguageFilter> {
    let mut template = LanguageFilter::default();
    for (key, value) in params {
        let field: LanguageField = key.parse().map_err(invalid_query)?;
        if value.is_empty() {
            continue;
        }
        match field {
            LanguageField::Name => template.name = Some(value),
            LanguageField::Creators => template.creators = Some(split_list(&value)),
            LanguageField::Extensions => template.extensions = Some(split_list(&value)),
            LanguageField::FirstAppeared => {
                let ts = OffsetDateTime::parse(&value, &Rfc3339).map_err(invalid_query)?;
                check_timestamp(&ts).map_err(invalid_query)?;
                template.first_appeared = Some(ts);
            }
            LanguageField::Year => template.year = Some(value.parse().map_err(invalid_query)?),
            LanguageField::Wiki => template.wiki = Some(value),
        }
    }
    Ok(template)
}

fn created_at(id: impl std::fmt::Display) -> impl IntoResponse {
    (StatusCode::CREATED, [(header::LOCATION, format!("/{id}"))])
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/", tag = "Languages", operation_id = "listLanguages",
    params(
        ("name" = Option<String>, Query, description = "Exact name"),
        ("creators" = Option<String>, Query, description = "Comma separated, all must be present"),
        ("extensions" = Option<String>, Query, description = "Comma separated, all must be present"),
        ("firstAppeared" = Option<String>, Query, description = "RFC 3339 timestamp"),
        ("year" = Option<i32>, Query, description = "Year, 0 means any"),
        ("wiki" = Option<String>, Query, description = "Exact wiki link"),
    ),
    responses((status = StatusCode::OK, description = "Matching languages", body = Languages),
    (status = StatusCode::BAD_REQUEST, description = "Invalid query string"))))]
pub async fn list(
    service: LanguageService,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(params) = query.map_err(|e| invalid_query(e.body_text()))?;
    let template = parse_template(params)?;
    debug!("Search template: {template:?}");
    let languages = service.find_many(&template).await?;
    Ok((StatusCode::OK, Json(Languages { languages })))
}

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = "Languages", operation_id = "getLanguage",
    responses((status = StatusCode::OK, description = "Get one", body = Language),
    (status = StatusCode::BAD_REQUEST, description = "The given id is not a valid id"),
    (status = StatusCode::NOT_FOUND, description = "No language found with that id"))))]
pub async fn get_one(
    Path(id): Path<String>,
    service: LanguageService,
) -> ApiResult<impl IntoResponse> {
    match service.find_one(&id).await? {
        Lookup::Found(language) => Ok((StatusCode::OK, Json(language))),
        Lookup::NotFound => Err(ApiError::NotFound("No language found with that id")),
        Lookup::InvalidId => Err(ApiError::InvalidId),
    }
}

#[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/", tag = "Languages", operation_id = "createLanguage",
    request_body = Language,
    responses((status = StatusCode::CREATED, description = "Created, new record path in Location header"),
    (status = StatusCode::BAD_REQUEST, description = "Invalid request body"))))]
pub async fn create(
    service: LanguageService,
    ValidJson(language): ValidJson<Language>,
) -> ApiResult<impl IntoResponse> {
    let id = service.insert_one(language).await?;
    Ok(created_at(id))
}

#[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Languages", operation_id = "replaceLanguage",
    request_body = Language,
    responses((status = StatusCode::OK, description = "Replaced"),
    (status = StatusCode::CREATED, description = "Created under the given id"),
    (status = StatusCode::BAD_REQUEST, description = "Invalid id or request body"))))]
pub async fn replace(
    Path(id): Path<String>,
    service: LanguageService,
    ValidJson(language): ValidJson<Language>,
) -> ApiResult<axum::response::Response> {
    match service.replace_one(&id, language).await? {
        ReplaceOutcome::Found => Ok(StatusCode::OK.into_response()),
        ReplaceOutcome::Created(id) => Ok(created_at(id).into_response()),
        ReplaceOutcome::InvalidId => Err(ApiError::InvalidId),
    }
}

#[cfg_attr(feature = "openapi",  utoipa::path(patch, path = "/{id}", tag = "Languages", operation_id = "updateLanguage",
    request_body = LanguagePatch,
    responses((status = StatusCode::OK, description = "Updated"),
    (status = StatusCode::BAD_REQUEST, description = "Invalid id or request body"),
    (status = StatusCode::NOT_FOUND, description = "No language found with that id to update"))))]
pub async fn update(
    Path(id): Path<String>,
    service: LanguageService,
    ValidJson(patch): ValidJson<LanguagePatch>,
) -> ApiResult<impl IntoResponse> {
    match service.update_one(&id, patch).await? {
        ResponseCode::Found => Ok(StatusCode::OK),
        ResponseCode::NotFound => Err(ApiError::NotFound(
            "No language found with that id to update",
        )),
        ResponseCode::InvalidId => Err(ApiError::InvalidId),
    }
}

#[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}", tag = "Languages", operation_id = "deleteLanguage",
    responses((status = StatusCode::NO_CONTENT, description = "Deleted successfully"),
    (status = StatusCode::BAD_REQUEST, description = "The given id is not a valid id"),
    (status = StatusCode::NOT_FOUND, description = "No language found with that id to delete"))))]
pub async fn delete_one(
    Path(id): Path<String>,
    service: LanguageService,
) -> ApiResult<impl IntoResponse> {
    match service.delete_one(&id).await? {
        ResponseCode::Found => Ok(StatusCode::NO_CONTENT),
        ResponseCode::NotFound => Err(ApiError::NotFound(
            "No language found with that id to delete",
        )),
        ResponseCode::InvalidId => Err(ApiError::InvalidId),
    }
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{id}",
            get(get_one).put(replace).patch(update).delete(delete_one),
        )
}
