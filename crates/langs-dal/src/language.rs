use std::str::FromStr;

use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

use crate::{Error, ObjectId, error::Result};

/// Persisted fields of a language document.
///
/// The variants double as the closed set of keys a search may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageField {
    Name,
    Creators,
    Extensions,
    FirstAppeared,
    Year,
    Wiki,
}

impl LanguageField {
    pub const ALL: [LanguageField; 6] = [
        LanguageField::Name,
        LanguageField::Creators,
        LanguageField::Extensions,
        LanguageField::FirstAppeared,
        LanguageField::Year,
        LanguageField::Wiki,
    ];

    /// Key under which the field is stored in the document
    pub fn document_key(&self) -> &'static str {
        match self {
            LanguageField::Name => "name",
            LanguageField::Creators => "creators",
            LanguageField::Extensions => "extensions",
            LanguageField::FirstAppeared => "firstAppeared",
            LanguageField::Year => "year",
            LanguageField::Wiki => "wiki",
        }
    }
}

impl FromStr for LanguageField {
    type Err = Error;

    /// Case insensitive lookup by document key
    fn from_str(s: &str) -> Result<Self> {
        LanguageField::ALL
            .into_iter()
            .find(|f| f.document_key().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Language {
    #[serde(rename = "_id", default)]
    #[garde(skip)]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "65a1f0c2e4b0a1b2c3d4e5f6"))]
    pub id: Option<ObjectId>,
    #[serde(default)]
    #[garde(length(max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    #[garde(length(max = 100))]
    pub creators: Option<Vec<String>>,
    #[serde(default)]
    #[garde(length(max = 100))]
    pub extensions: Option<Vec<String>>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[garde(custom(storable_timestamp))]
    pub first_appeared: Option<OffsetDateTime>,
    #[serde(default)]
    #[garde(range(min = 0))]
    pub year: Option<i32>,
    #[serde(default)]
    #[garde(length(max = 2048))]
    pub wiki: Option<String>,
}

impl Language {
    /// Builds the stored document. The id is kept out of it, as it lives in its own column.
    pub(crate) fn to_document(&self) -> Result<Value> {
        let mut doc = Map::new();
        let mut put = |field: LanguageField, value: Value| {
            doc.insert(field.document_key().to_string(), value);
        };
        if let Some(name) = &self.name {
            put(LanguageField::Name, Value::from(name.as_str()));
        }
        if let Some(creators) = &self.creators {
            put(LanguageField::Creators, Value::from(creators.clone()));
        }
        if let Some(extensions) = &self.extensions {
            put(LanguageField::Extensions, Value::from(extensions.clone()));
        }
        if let Some(first_appeared) = &self.first_appeared {
            put(
                LanguageField::FirstAppeared,
                Value::from(format_timestamp(first_appeared)?),
            );
        }
        if let Some(year) = self.year {
            put(LanguageField::Year, Value::from(year));
        }
        if let Some(wiki) = &self.wiki {
            put(LanguageField::Wiki, Value::from(wiki.as_str()));
        }
        Ok(Value::Object(doc))
    }

    pub(crate) fn from_document(id: ObjectId, document: &str) -> Result<Self> {
        let mut doc: Map<String, Value> = serde_json::from_str(document)?;
        let first_appeared = take::<String>(&mut doc, LanguageField::FirstAppeared)?
            .map(|ts| parse_timestamp(&ts))
            .transpose()?;
        Ok(Language {
            id: Some(id),
            name: take(&mut doc, LanguageField::Name)?,
            creators: take(&mut doc, LanguageField::Creators)?,
            extensions: take(&mut doc, LanguageField::Extensions)?,
            first_appeared,
            year: take(&mut doc, LanguageField::Year)?,
            wiki: take(&mut doc, LanguageField::Wiki)?,
        })
    }
}

fn take<T: DeserializeOwned>(doc: &mut Map<String, Value>, field: LanguageField) -> Result<Option<T>> {
    match doc.remove(field.document_key()) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

/// Timestamps are stored as RFC 3339 strings in UTC, so equal instants compare equal as text
pub(crate) fn format_timestamp(ts: &OffsetDateTime) -> Result<String> {
    ts.checked_to_offset(UtcOffset::UTC)
        .ok_or_else(|| Error::InvalidTimestamp(format!("{ts} is out of range in UTC")))?
        .format(&Rfc3339)
        .map_err(|e| Error::InvalidTimestamp(e.to_string()))
}

/// Fails for instants that cannot be stored, i.e. that fall outside
/// years 0000-9999 once converted to UTC.
pub fn check_timestamp(ts: &OffsetDateTime) -> Result<()> {
    format_timestamp(ts).map(|_| ())
}

fn storable_timestamp(value: &Option<OffsetDateTime>, _ctx: &()) -> garde::Result {
    match value {
        Some(ts) => check_timestamp(ts).map_err(|e| garde::Error::new(e.to_string())),
        None => Ok(()),
    }
}

fn storable_timestamp_patch(value: &Option<Option<OffsetDateTime>>, ctx: &()) -> garde::Result {
    storable_timestamp(&value.flatten(), ctx)
}

pub(crate) fn parse_timestamp(ts: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(ts, &Rfc3339).map_err(|e| Error::InvalidTimestamp(e.to_string()))
}

/// Search template: record shaped, every field optional.
/// Absent (or empty) fields do not constrain the search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageFilter {
    pub name: Option<String>,
    pub creators: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub first_appeared: Option<OffsetDateTime>,
    pub year: Option<i32>,
    pub wiki: Option<String>,
}

/// Partial update. Outer `None` leaves the field untouched,
/// `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LanguagePatch {
    #[serde(default, deserialize_with = "present")]
    #[garde(length(max = 255))]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[garde(length(max = 100))]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<String>>))]
    pub creators: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    #[garde(length(max = 100))]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Vec<String>>))]
    pub extensions: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present_timestamp")]
    #[garde(custom(storable_timestamp_patch))]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = DateTime))]
    pub first_appeared: Option<Option<OffsetDateTime>>,
    #[serde(default, deserialize_with = "present")]
    #[garde(range(min = 0))]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<i32>))]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    #[garde(length(max = 2048))]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub wiki: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn present_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(deserializer).map(Some)
}

impl LanguagePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.creators.is_none()
            && self.extensions.is_none()
            && self.first_appeared.is_none()
            && self.year.is_none()
            && self.wiki.is_none()
    }

    /// Merges present fields into the record. The id is never touched.
    pub fn apply(self, language: &mut Language) {
        if let Some(name) = self.name {
            language.name = name;
        }
        if let Some(creators) = self.creators {
            language.creators = creators;
        }
        if let Some(extensions) = self.extensions {
            language.extensions = extensions;
        }
        if let Some(first_appeared) = self.first_appeared {
            language.first_appeared = first_appeared;
        }
        if let Some(year) = self.year {
            language.year = year;
        }
        if let Some(wiki) = self.wiki {
            language.wiki = wiki;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn go() -> Language {
        Language {
            id: None,
            name: Some("Go".to_string()),
            creators: Some(vec![
                "Pike".to_string(),
                "Thompson".to_string(),
                "Griesemer".to_string(),
            ]),
            extensions: Some(vec![".go".to_string()]),
            first_appeared: Some(datetime!(2009-11-10 00:00 UTC)),
            year: Some(2009),
            wiki: Some("https://en.wikipedia.org/wiki/Go_(programming_language)".to_string()),
        }
    }

    #[test]
    fn test_field_names() {
        assert_eq!(
            "firstappeared".parse::<LanguageField>().unwrap(),
            LanguageField::FirstAppeared
        );
        assert_eq!("Name".parse::<LanguageField>().unwrap(), LanguageField::Name);
        assert!(matches!(
            "_id".parse::<LanguageField>(),
            Err(Error::UnknownField(_))
        ));
        assert!("first_appeared".parse::<LanguageField>().is_err());
    }

    #[test]
    fn test_document_keys() {
        let doc = go().to_document().unwrap();
        assert_eq!(
            doc,
            json!({
                "name": "Go",
                "creators": ["Pike", "Thompson", "Griesemer"],
                "extensions": [".go"],
                "firstAppeared": "2009-11-10T00:00:00Z",
                "year": 2009,
                "wiki": "https://en.wikipedia.org/wiki/Go_(programming_language)"
            })
        );

        let sparse = Language {
            name: Some("B".to_string()),
            ..Default::default()
        };
        assert_eq!(sparse.to_document().unwrap(), json!({"name": "B"}));
    }

    #[test]
    fn test_document_normalizes_offset() {
        let language = Language {
            first_appeared: Some(datetime!(1972-01-01 02:00 +02:00)),
            ..Default::default()
        };
        let doc = language.to_document().unwrap();
        assert_eq!(doc["firstAppeared"], "1972-01-01T00:00:00Z");
    }

    #[test]
    fn test_from_document() {
        let id = ObjectId::new();
        let doc = go().to_document().unwrap().to_string();
        let language = Language::from_document(id, &doc).unwrap();
        assert_eq!(language.id, Some(id));
        assert_eq!(Language { id: None, ..language }, go());

        let res = Language::from_document(id, r#"{"year": "not a number"}"#);
        assert!(matches!(res, Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_api_json() {
        let json = json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "name": "C",
            "creators": ["Ritchie"],
            "firstAppeared": "1972-01-01T00:00:00Z",
            "year": 1972
        });
        let language: Language = serde_json::from_value(json).unwrap();
        assert_eq!(language.id.unwrap().to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(language.creators, Some(vec!["Ritchie".to_string()]));
        assert_eq!(language.extensions, None);
        assert_eq!(language.first_appeared, Some(datetime!(1972-01-01 00:00 UTC)));

        let out = serde_json::to_value(&language).unwrap();
        assert_eq!(out["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(out["firstAppeared"], "1972-01-01T00:00:00Z");
    }

    #[test]
    fn test_validation() {
        assert!(go().validate().is_ok());
        let invalid = Language {
            year: Some(-1),
            ..go()
        };
        assert!(invalid.validate().is_err());
        let invalid = Language {
            name: Some("x".repeat(256)),
            ..go()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_timestamps_outside_utc_range() {
        for text in ["0000-01-01T00:30:00+01:00", "9999-12-31T23:30:00-01:00"] {
            let ts = OffsetDateTime::parse(text, &Rfc3339).unwrap();
            assert!(
                matches!(check_timestamp(&ts), Err(Error::InvalidTimestamp(_))),
                "{text}"
            );
            let language = Language {
                first_appeared: Some(ts),
                ..go()
            };
            assert!(language.validate().is_err(), "{text}");
            let patch: LanguagePatch =
                serde_json::from_value(json!({ "firstAppeared": text })).unwrap();
            assert!(patch.validate().is_err(), "{text}");
        }

        let edge = OffsetDateTime::parse("0000-01-01T00:30:00+00:30", &Rfc3339).unwrap();
        assert!(check_timestamp(&edge).is_ok());
        let cleared: LanguagePatch = serde_json::from_value(json!({ "firstAppeared": null })).unwrap();
        assert!(cleared.validate().is_ok());
    }

    #[test]
    fn test_patch_deserialize() {
        let patch: LanguagePatch =
            serde_json::from_value(json!({"name": "Golang", "wiki": null})).unwrap();
        assert_eq!(patch.name, Some(Some("Golang".to_string())));
        assert_eq!(patch.wiki, Some(None));
        assert_eq!(patch.year, None);
        assert!(!patch.is_empty());

        let empty: LanguagePatch = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_empty());

        assert!(serde_json::from_value::<LanguagePatch>(json!({"_id": "x"})).is_err());
        assert!(serde_json::from_value::<LanguagePatch>(json!({"color": "blue"})).is_err());
        assert!(serde_json::from_value::<LanguagePatch>(json!({"year": "2009"})).is_err());
    }

    #[test]
    fn test_patch_apply() {
        let id = ObjectId::new();
        let mut language = Language {
            id: Some(id),
            ..go()
        };
        let patch: LanguagePatch = serde_json::from_value(json!({
            "name": "Golang",
            "extensions": [".go", ".mod"],
            "wiki": null
        }))
        .unwrap();
        patch.apply(&mut language);

        assert_eq!(language.id, Some(id));
        assert_eq!(language.name.as_deref(), Some("Golang"));
        assert_eq!(
            language.extensions,
            Some(vec![".go".to_string(), ".mod".to_string()])
        );
        assert_eq!(language.wiki, None);
        assert_eq!(language.year, Some(2009));
        assert_eq!(language.creators, go().creators);
    }
}
