//! Recipe persistence, including get-or-create reconciliation of the nested
//! tag and ingredient lists.
//!
//! Tags and ingredients are scoped per user and unique by name within that
//! scope. Writing a recipe never touches another user's rows.

use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::serializer::RecipeFields;
use crate::api::ApiError;
use crate::models::{
    Ingredient, NewIngredient, NewRecipe, NewRecipeIngredient, NewRecipeTag, NewTag, Recipe, Tag,
};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};

/// Look up a recipe belonging to `user_id`. Someone else's recipe is
/// indistinguishable from a missing one.
pub fn find_owned_recipe(
    conn: &mut SqliteConnection,
    user_id: i32,
    id: i32,
) -> Result<Recipe, ApiError> {
    recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::user_id.eq(user_id))
        .select(Recipe::as_select())
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound("Recipe"))
}

pub fn get_or_create_tag(
    conn: &mut SqliteConnection,
    user_id: i32,
    name: &str,
) -> QueryResult<Tag> {
    let find = |conn: &mut SqliteConnection| {
        tags::table
            .filter(tags::user_id.eq(user_id))
            .filter(tags::name.eq(name))
            .select(Tag::as_select())
            .first(conn)
            .optional()
    };

    if let Some(tag) = find(conn)? {
        return Ok(tag);
    }

    match diesel::insert_into(tags::table)
        .values(NewTag { user_id, name })
        .returning(Tag::as_returning())
        .get_result(conn)
    {
        Ok(tag) => {
            tracing::debug!(tag_id = tag.id, user_id, "created tag");
            Ok(tag)
        }
        // Another writer created it between our lookup and insert
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            find(conn)?.ok_or(DieselError::NotFound)
        }
        Err(e) => Err(e),
    }
}

pub fn get_or_create_ingredient(
    conn: &mut SqliteConnection,
    user_id: i32,
    name: &str,
) -> QueryResult<Ingredient> {
    let find = |conn: &mut SqliteConnection| {
        ingredients::table
            .filter(ingredients::user_id.eq(user_id))
            .filter(ingredients::name.eq(name))
            .select(Ingredient::as_select())
            .first(conn)
            .optional()
    };

    if let Some(ingredient) = find(conn)? {
        return Ok(ingredient);
    }

    match diesel::insert_into(ingredients::table)
        .values(NewIngredient { user_id, name })
        .returning(Ingredient::as_returning())
        .get_result(conn)
    {
        Ok(ingredient) => {
            tracing::debug!(ingredient_id = ingredient.id, user_id, "created ingredient");
            Ok(ingredient)
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            find(conn)?.ok_or(DieselError::NotFound)
        }
        Err(e) => Err(e),
    }
}

/// Attach tags by name, creating any the user doesn't have yet.
pub fn assign_tags(
    conn: &mut SqliteConnection,
    user_id: i32,
    recipe_id: i32,
    names: &[String],
) -> QueryResult<()> {
    for name in names {
        let tag = get_or_create_tag(conn, user_id, name)?;
        diesel::insert_or_ignore_into(recipe_tags::table)
            .values(NewRecipeTag {
                recipe_id,
                tag_id: tag.id,
            })
            .execute(conn)?;
    }
    Ok(())
}

pub fn assign_ingredients(
    conn: &mut SqliteConnection,
    user_id: i32,
    recipe_id: i32,
    names: &[String],
) -> QueryResult<()> {
    for name in names {
        let ingredient = get_or_create_ingredient(conn, user_id, name)?;
        diesel::insert_or_ignore_into(recipe_ingredients::table)
            .values(NewRecipeIngredient {
                recipe_id,
                ingredient_id: ingredient.id,
            })
            .execute(conn)?;
    }
    Ok(())
}

/// Drop every tag association of a recipe. The tags themselves remain.
pub fn clear_tags(conn: &mut SqliteConnection, recipe_id: i32) -> QueryResult<usize> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id))).execute(conn)
}

pub fn clear_ingredients(conn: &mut SqliteConnection, recipe_id: i32) -> QueryResult<usize> {
    diesel::delete(
        recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
    )
    .execute(conn)
}

/// Insert a recipe from a fully validated payload. Missing nested lists mean
/// no tags or ingredients.
///
/// Run inside a transaction; a failure part way leaves rows behind otherwise.
pub fn insert_recipe(
    conn: &mut SqliteConnection,
    user_id: i32,
    fields: &RecipeFields,
) -> QueryResult<Recipe> {
    let recipe = diesel::insert_into(recipes::table)
        .values(NewRecipe {
            user_id,
            title: fields.title.as_deref().unwrap_or_default(),
            time_minutes: fields.time_minutes.unwrap_or_default(),
            price: fields.price.as_deref().unwrap_or("0.00"),
            description: fields.description.as_deref().unwrap_or_default(),
            link: fields.link.as_deref().unwrap_or_default(),
        })
        .returning(Recipe::as_returning())
        .get_result(conn)?;

    if let Some(names) = &fields.tags {
        assign_tags(conn, user_id, recipe.id, names)?;
    }
    if let Some(names) = &fields.ingredients {
        assign_ingredients(conn, user_id, recipe.id, names)?;
    }

    Ok(recipe)
}

#[derive(AsChangeset)]
#[diesel(table_name = recipes)]
struct RecipeChangeset<'a> {
    title: Option<&'a str>,
    time_minutes: Option<i32>,
    price: Option<&'a str>,
    description: Option<&'a str>,
    link: Option<&'a str>,
    updated_at: chrono::NaiveDateTime,
}

/// Apply supplied fields to an existing recipe. A present tag or ingredient
/// list (even an empty one) replaces the current associations; an absent one
/// leaves them untouched.
pub fn update_recipe(
    conn: &mut SqliteConnection,
    recipe: &Recipe,
    fields: &RecipeFields,
) -> QueryResult<Recipe> {
    let changeset = RecipeChangeset {
        title: fields.title.as_deref(),
        time_minutes: fields.time_minutes,
        price: fields.price.as_deref(),
        description: fields.description.as_deref(),
        link: fields.link.as_deref(),
        updated_at: Utc::now().naive_utc(),
    };

    let updated = diesel::update(recipes::table.find(recipe.id))
        .set(&changeset)
        .returning(Recipe::as_returning())
        .get_result(conn)?;

    if let Some(names) = &fields.tags {
        clear_tags(conn, recipe.id)?;
        assign_tags(conn, recipe.user_id, recipe.id, names)?;
    }
    if let Some(names) = &fields.ingredients {
        clear_ingredients(conn, recipe.id)?;
        assign_ingredients(conn, recipe.user_id, recipe.id, names)?;
    }

    Ok(updated)
}
