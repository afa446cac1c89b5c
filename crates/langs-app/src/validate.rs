use axum::extract::{FromRequest, Request};
use bytes::Bytes;
use garde::Validate;
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};

use crate::error::ApiError;

/// JSON body extractor that also runs `garde` validation.
///
/// The body is decoded whatever the `Content-Type` says. Malformed JSON,
/// unknown or mistyped fields and failed validation are all rejected
/// with [`ApiError::InvalidBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<T> Deref for ValidJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ValidJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> ValidJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate<Context = ()>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidBody(e.body_text()))?;
        let value = decode::<T>(&body)?;
        Ok(ValidJson(value))
    }
}

pub(crate) fn decode<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate<Context = ()>,
{
    let value: T =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    value
        .validate()
        .map_err(|report| ApiError::InvalidBody(report.to_string()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use langs_dal::language::{Language, LanguagePatch};

    #[test]
    fn test_decode_language() {
        let language: Language =
            decode(br#"{"name": "Go", "creators": ["Pike"], "year": 2009}"#).unwrap();
        assert_eq!(language.name.as_deref(), Some("Go"));
        assert_eq!(language.year, Some(2009));
    }

    #[test]
    fn test_decode_rejects() {
        let invalid: [&[u8]; 6] = [
            b"",
            b"not json",
            br#"{"name": 42}"#,
            br#"{"year": -1}"#,
            br#"{"_id": "xyz"}"#,
            br#"{"firstAppeared": "yesterday"}"#,
        ];
        for body in invalid {
            assert!(
                matches!(decode::<Language>(body), Err(ApiError::InvalidBody(_))),
                "{}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_decode_patch() {
        let patch: LanguagePatch = decode(br#"{"wiki": null}"#).unwrap();
        assert_eq!(patch.wiki, Some(None));
        assert!(matches!(
            decode::<LanguagePatch>(br#"{"_id": "65a1f0c2e4b0a1b2c3d4e5f6"}"#),
            Err(ApiError::InvalidBody(_))
        ));
    }
}
