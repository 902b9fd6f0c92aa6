//! Pieces shared by tags and ingredients, which are both a user-owned name.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::error::{too_long, FieldErrors, BLANK, REQUIRED};
use super::filters::parse_flag;
use super::ApiError;

pub const MAX_NAME_LENGTH: usize = 255;

/// A tag or ingredient as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NamedItem {
    pub id: i32,
    pub name: String,
}

impl From<crate::models::Tag> for NamedItem {
    fn from(tag: crate::models::Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

impl From<crate::models::Ingredient> for NamedItem {
    fn from(ingredient: crate::models::Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

/// A tag or ingredient referenced by name inside a recipe payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NameInput {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body for updating a tag or ingredient
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NamePayload {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignedOnlyParams {
    /// When truthy (`1`, `true`), only return items attached to at least one recipe
    pub assigned_only: Option<String>,
}

impl AssignedOnlyParams {
    pub fn assigned_only(&self) -> Result<bool, ApiError> {
        match self.assigned_only.as_deref() {
            Some(raw) => parse_flag("assigned_only", raw),
            None => Ok(false),
        }
    }
}

/// Trim and check a name. Problems are recorded under `field`.
pub fn clean_name(field: &str, raw: Option<&str>, errors: &mut FieldErrors) -> Option<String> {
    let Some(raw) = raw else {
        errors.add(field, REQUIRED);
        return None;
    };

    let name = raw.trim();
    if name.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        errors.add(field, too_long(MAX_NAME_LENGTH));
        return None;
    }

    Some(name.to_string())
}

/// Validate a list of nested `{name}` objects, keyed as `field[i].name`.
pub fn clean_name_list(field: &str, items: &[NameInput], errors: &mut FieldErrors) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let key = format!("{}[{}].name", field, i);
        if let Some(name) = clean_name(&key, item.name.as_deref(), errors) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
