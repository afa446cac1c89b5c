use sqlx::QueryBuilder;

use crate::{
    ChosenDB,
    error::Result,
    language::{LanguageField, LanguageFilter, format_timestamp},
};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value exactly
    Equals(LanguageField, FilterValue),
    /// List field contains every one of the values, in any order
    ContainsAll(LanguageField, Vec<String>),
}

/// Store predicate over language documents. Conditions are combined with AND,
/// no conditions match every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn from_template(template: &LanguageFilter) -> Result<Self> {
        let mut conditions = Vec::new();

        if let Some(name) = non_empty(&template.name) {
            conditions.push(Condition::Equals(
                LanguageField::Name,
                FilterValue::Text(name.to_string()),
            ));
        }
        if let Some(creators) = non_empty_list(&template.creators) {
            conditions.push(Condition::ContainsAll(LanguageField::Creators, creators));
        }
        if let Some(extensions) = non_empty_list(&template.extensions) {
            conditions.push(Condition::ContainsAll(LanguageField::Extensions, extensions));
        }
        if let Some(first_appeared) = &template.first_appeared {
            conditions.push(Condition::Equals(
                LanguageField::FirstAppeared,
                FilterValue::Text(format_timestamp(first_appeared)?),
            ));
        }
        if let Some(year) = template.year.filter(|y| *y != 0) {
            conditions.push(Condition::Equals(
                LanguageField::Year,
                FilterValue::Integer(year.into()),
            ));
        }
        if let Some(wiki) = non_empty(&template.wiki) {
            conditions.push(Condition::Equals(
                LanguageField::Wiki,
                FilterValue::Text(wiki.to_string()),
            ));
        }

        Ok(Filter { conditions })
    }

    pub(crate) fn push_where(&self, query: &mut QueryBuilder<'_, ChosenDB>) {
        let mut separator = " WHERE ";
        for condition in &self.conditions {
            match condition {
                Condition::Equals(field, value) => {
                    query.push(separator);
                    separator = " AND ";
                    query.push(format!(
                        "json_extract(document, '$.{}') = ",
                        field.document_key()
                    ));
                    match value {
                        FilterValue::Text(text) => query.push_bind(text.clone()),
                        FilterValue::Integer(number) => query.push_bind(*number),
                    };
                }
                Condition::ContainsAll(field, values) => {
                    for value in values {
                        query.push(separator);
                        separator = " AND ";
                        query.push(format!(
                            "EXISTS (SELECT 1 FROM json_each(document, '$.{}') WHERE json_each.value = ",
                            field.document_key()
                        ));
                        query.push_bind(value.clone());
                        query.push(")");
                    }
                }
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn non_empty_list(values: &Option<Vec<String>>) -> Option<Vec<String>> {
    let values: Vec<String> = values
        .iter()
        .flatten()
        .filter(|v| !v.is_empty())
        .cloned()
        .collect();
    if values.is_empty() { None } else { Some(values) }
}
