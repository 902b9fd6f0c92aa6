//! Wire shapes for recipes and the validation that turns a payload into
//! storable fields.

use std::collections::HashMap;

use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{too_long, ApiError, FieldErrors, BLANK, REQUIRED};
use crate::api::named::{clean_name_list, NameInput, NamedItem};
use crate::media::MediaStorage;
use crate::models::Recipe;
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_LINK_LENGTH: usize = 255;
pub const PRICE_MAX_DIGITS: usize = 5;
pub const PRICE_DECIMAL_PLACES: usize = 2;

/// Create/update body. Every field is optional at the wire level; which ones
/// are required depends on the method.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipePayload {
    #[schema(example = "Thai Prawn Curry")]
    pub title: Option<String>,
    #[schema(example = 30)]
    pub time_minutes: Option<i32>,
    /// Decimal with at most 5 digits, 2 of them after the point
    #[schema(value_type = Option<String>, example = "5.50")]
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    /// Present (even empty) replaces the recipe's tags; absent leaves them alone
    pub tags: Option<Vec<NameInput>>,
    pub ingredients: Option<Vec<NameInput>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST and PUT: scalar fields are required
    Full,
    /// PATCH
    Partial,
}

/// A validated payload. `None` means "not supplied".
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecipeFields {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    /// Canonical two-place string
    pub price: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

impl RecipePayload {
    pub fn validate(self, mode: WriteMode) -> Result<RecipeFields, ApiError> {
        let mut errors = FieldErrors::new();
        let required = mode == WriteMode::Full;

        if required {
            for (field, missing) in [
                ("title", self.title.is_none()),
                ("time_minutes", self.time_minutes.is_none()),
                ("price", self.price.is_none()),
            ] {
                if missing {
                    errors.add(field, REQUIRED);
                }
            }
        }

        let title = self.title.and_then(|raw| {
            let title = raw.trim();
            if title.is_empty() {
                errors.add("title", BLANK);
                None
            } else if title.chars().count() > MAX_TITLE_LENGTH {
                errors.add("title", too_long(MAX_TITLE_LENGTH));
                None
            } else {
                Some(title.to_string())
            }
        });

        let price = self.price.and_then(|price| match normalize_price(price) {
            Ok(price) => Some(price),
            Err(message) => {
                errors.add("price", message);
                None
            }
        });

        let link = self.link.and_then(|raw| {
            let link = raw.trim();
            if link.chars().count() > MAX_LINK_LENGTH {
                errors.add("link", too_long(MAX_LINK_LENGTH));
                None
            } else {
                Some(link.to_string())
            }
        });

        let tags = self
            .tags
            .map(|items| clean_name_list("tags", &items, &mut errors));
        let ingredients = self
            .ingredients
            .map(|items| clean_name_list("ingredients", &items, &mut errors));

        errors.into_result()?;

        Ok(RecipeFields {
            title,
            time_minutes: self.time_minutes,
            price,
            description: self.description.map(|d| d.trim().to_string()),
            link,
            tags,
            ingredients,
        })
    }
}

/// Check a price against the column's precision and render it with exactly
/// two decimal places.
pub fn normalize_price(price: Decimal) -> Result<String, String> {
    let scale = price.scale() as usize;
    let digits = price.mantissa().unsigned_abs().to_string();
    let significant = digits.trim_start_matches('0').len();
    let total = significant.max(scale);
    let whole = total - scale;

    if total > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {} digits in total.",
            PRICE_MAX_DIGITS
        ));
    }
    if scale > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            PRICE_DECIMAL_PLACES
        ));
    }
    if whole > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
        ));
    }

    let mut price = price;
    price.rescale(PRICE_DECIMAL_PLACES as u32);
    Ok(price.to_string())
}

/// Recipe as shown in lists
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    #[schema(example = "5.50")]
    pub price: String,
    pub link: String,
    pub tags: Vec<NamedItem>,
    pub ingredients: Vec<NamedItem>,
}

/// Recipe as shown on its own
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    #[schema(example = "5.50")]
    pub price: String,
    pub link: String,
    pub tags: Vec<NamedItem>,
    pub ingredients: Vec<NamedItem>,
    pub description: String,
    /// Absolute URL path of the uploaded image, if any
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeImageResponse {
    pub id: i32,
    #[schema(example = "/media/uploads/recipe/3f0c2f5e.png")]
    pub image: String,
}

/// Tags and ingredients for a batch of recipes, keyed by recipe ID.
#[derive(Debug, Default)]
pub struct Related {
    tags: HashMap<i32, Vec<NamedItem>>,
    ingredients: HashMap<i32, Vec<NamedItem>>,
}

impl Related {
    /// Two queries regardless of how many recipes are being rendered.
    pub fn load(conn: &mut SqliteConnection, recipe_ids: &[i32]) -> QueryResult<Self> {
        let mut related = Self::default();
        if recipe_ids.is_empty() {
            return Ok(related);
        }

        let tag_rows: Vec<(i32, i32, String)> = recipe_tags::table
            .inner_join(tags::table)
            .filter(recipe_tags::recipe_id.eq_any(recipe_ids))
            .select((recipe_tags::recipe_id, tags::id, tags::name))
            .order(tags::id.asc())
            .load(conn)?;
        for (recipe_id, id, name) in tag_rows {
            related
                .tags
                .entry(recipe_id)
                .or_default()
                .push(NamedItem { id, name });
        }

        let ingredient_rows: Vec<(i32, i32, String)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
            .select((
                recipe_ingredients::recipe_id,
                ingredients::id,
                ingredients::name,
            ))
            .order(ingredients::id.asc())
            .load(conn)?;
        for (recipe_id, id, name) in ingredient_rows {
            related
                .ingredients
                .entry(recipe_id)
                .or_default()
                .push(NamedItem { id, name });
        }

        Ok(related)
    }

    fn take(&mut self, recipe_id: i32) -> (Vec<NamedItem>, Vec<NamedItem>) {
        (
            self.tags.remove(&recipe_id).unwrap_or_default(),
            self.ingredients.remove(&recipe_id).unwrap_or_default(),
        )
    }
}

impl RecipeSummary {
    pub fn render(recipe: Recipe, related: &mut Related) -> Self {
        let (tags, ingredients) = related.take(recipe.id);
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags,
            ingredients,
        }
    }
}

impl RecipeDetail {
    pub fn render(recipe: Recipe, related: &mut Related, media: &MediaStorage) -> Self {
        let (tags, ingredients) = related.take(recipe.id);
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags,
            ingredients,
            description: recipe.description,
            image: recipe.image.as_deref().map(|path| media.url(path)),
        }
    }

    /// Load associations for a single recipe and render it.
    pub fn load(
        conn: &mut SqliteConnection,
        recipe: Recipe,
        media: &MediaStorage,
    ) -> QueryResult<Self> {
        let mut related = Related::load(conn, &[recipe.id])?;
        Ok(Self::render(recipe, &mut related, media))
    }
}
