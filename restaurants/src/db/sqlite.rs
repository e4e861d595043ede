// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Implementation of the database abstraction using SQLite.

use crate::db::{Criteria, Query, RestaurantStore};
use crate::model::*;
use async_trait::async_trait;
use futures::TryStreamExt;
use restaurants_core::db::sqlite::{connect, map_sqlx_error, run_schema, SqliteOptions};
use restaurants_core::db::{DbError, DbResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};

/// Schema to use to initialize the database.
const SCHEMA: &str = include_str!("sqlite.sql");

/// Columns to select when reading full restaurants, in the order `row_to_restaurant` expects.
const COLUMNS: &str = "id, name, address, city, lat, lng, menu, cuisine";

/// Condition implementing `Criteria::Search`.  Takes the same lowercased LIKE pattern twice.
const SEARCH_CONDITION: &str = "
    name_key LIKE ? ESCAPE '\\'
    OR EXISTS (
        SELECT 1 FROM json_each(restaurants.cuisine_key) WHERE json_each.value LIKE ? ESCAPE '\\'
    )";

/// Length of the identifiers generated by `RestaurantId::generate`.
const ID_LENGTH: usize = 24;

/// Converts an unsigned count into the integer type SQLite understands, saturating on overflow.
fn to_sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Builds a LIKE pattern that matches `term` as a literal substring.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if ch == '\\' || ch == '%' || ch == '_' {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Returns the SQL condition that implements `criteria` along with the arguments to bind to it.
fn criteria_to_sql(criteria: &Criteria) -> (&'static str, Vec<String>) {
    match criteria {
        Criteria::All => ("1 = 1", vec![]),
        Criteria::Search(term) => {
            let pattern = like_pattern(&term.to_lowercase());
            (SEARCH_CONDITION, vec![pattern.clone(), pattern])
        }
        Criteria::City(city) => ("city_key = ?", vec![city.to_lowercase()]),
    }
}

/// Serializes a structured column into its JSON representation.
fn to_json<T: Serialize>(value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|e| DbError::BackendError(e.to_string()))
}

/// Deserializes the structured `column` of restaurant `id` from its JSON representation.
fn from_json<T: DeserializeOwned>(id: &str, column: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        DbError::DataIntegrityError(format!("Invalid {} for restaurant {}: {}", column, id, e))
    })
}

/// Lowercased versions of the fields of a restaurant that queries match against.
struct MatchKeys {
    /// Lowercased name.
    name: String,

    /// Lowercased city, if any.
    city: Option<String>,

    /// JSON array with the lowercased cuisine tags.
    cuisine: String,
}

impl MatchKeys {
    /// Computes the match keys of `restaurant`.
    fn of(restaurant: &Restaurant) -> DbResult<Self> {
        let cuisine =
            restaurant.cuisine().iter().map(|tag| tag.to_lowercase()).collect::<Vec<String>>();
        Ok(Self {
            name: restaurant.name().to_lowercase(),
            city: restaurant.city().as_ref().map(|c| c.to_lowercase()),
            cuisine: to_json(&cuisine)?,
        })
    }
}

/// Returns an error unless exactly one row was affected by a write.
fn check_one_row_affected(affected: u64) -> DbResult<()> {
    if affected != 1 {
        return Err(DbError::BackendError(format!(
            "Expected exactly one row to be affected, got {}",
            affected
        )));
    }
    Ok(())
}

/// Converts a row obtained by selecting `COLUMNS` into a restaurant.
fn row_to_restaurant(row: &SqliteRow) -> DbResult<Restaurant> {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let name: String = row.try_get("name").map_err(map_sqlx_error)?;
    let address: Option<String> = row.try_get("address").map_err(map_sqlx_error)?;
    let city: Option<String> = row.try_get("city").map_err(map_sqlx_error)?;
    let lat: Option<f64> = row.try_get("lat").map_err(map_sqlx_error)?;
    let lng: Option<f64> = row.try_get("lng").map_err(map_sqlx_error)?;
    let menu: String = row.try_get("menu").map_err(map_sqlx_error)?;
    let cuisine: String = row.try_get("cuisine").map_err(map_sqlx_error)?;

    let location = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Location { lat, lng }),
        (None, None) => None,
        _ => {
            return Err(DbError::DataIntegrityError(format!(
                "Restaurant {} has a partial location",
                id
            )));
        }
    };
    let menu = from_json(&id, "menu", &menu)?;
    let cuisine = from_json(&id, "cuisine", &cuisine)?;

    let input = RestaurantInput { name, address, city, location, menu, cuisine };
    Ok(Restaurant::new(RestaurantId::new(id), input))
}

/// Restaurant store backed by an SQLite database.
#[derive(Clone)]
pub(crate) struct SqliteStore {
    /// Shared connection pool.
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to the database described by `opts` and initializes its schema.
    pub(crate) async fn connect(opts: &SqliteOptions) -> DbResult<Self> {
        let pool = connect(opts).await?;
        Self::attach(pool).await
    }

    /// Creates a store on top of an existing `pool`, initializing the schema if necessary.
    pub(crate) async fn attach(pool: SqlitePool) -> DbResult<Self> {
        run_schema(&pool, SCHEMA).await?;
        Ok(Self { pool })
    }

    /// Fetches restaurant `id` as part of transaction `tx`.
    async fn get_in_tx(
        tx: &mut Transaction<'static, Sqlite>,
        id: &RestaurantId,
    ) -> DbResult<Restaurant> {
        let query_str = format!("SELECT {} FROM restaurants WHERE id = ?", COLUMNS);
        let row = sqlx::query(&query_str)
            .bind(id.as_ref())
            .fetch_one(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
        row_to_restaurant(&row)
    }
}

#[async_trait]
impl RestaurantStore for SqliteStore {
    fn parse_id(&self, raw: &str) -> DbResult<RestaurantId> {
        if raw.len() != ID_LENGTH || !raw.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(DbError::InvalidIdentifier(format!(
                "Invalid restaurant identifier '{}'",
                raw
            )));
        }
        Ok(RestaurantId::new(raw.to_ascii_lowercase()))
    }

    async fn find(&self, query: &Query) -> DbResult<Vec<Restaurant>> {
        let (condition, args) = criteria_to_sql(&query.criteria);
        let query_str = format!(
            "SELECT {} FROM restaurants WHERE {} ORDER BY id LIMIT ? OFFSET ?",
            COLUMNS, condition
        );
        let mut q = sqlx::query(&query_str);
        for arg in args {
            q = q.bind(arg);
        }
        q = q.bind(to_sql_int(query.limit)).bind(to_sql_int(query.offset));

        let mut rows = q.fetch(&self.pool);
        let mut restaurants = vec![];
        while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
            restaurants.push(row_to_restaurant(&row)?);
        }
        Ok(restaurants)
    }

    async fn count(&self, criteria: &Criteria) -> DbResult<u64> {
        let (condition, args) = criteria_to_sql(criteria);
        let query_str = format!("SELECT COUNT(*) AS count FROM restaurants WHERE {}", condition);
        let mut q = sqlx::query(&query_str);
        for arg in args {
            q = q.bind(arg);
        }

        let row = q.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;
        let count: i64 = row.try_get("count").map_err(map_sqlx_error)?;
        u64::try_from(count).map_err(|e| DbError::BackendError(e.to_string()))
    }

    async fn find_by_id(&self, id: &RestaurantId) -> DbResult<Restaurant> {
        let query_str = format!("SELECT {} FROM restaurants WHERE id = ?", COLUMNS);
        let row = sqlx::query(&query_str)
            .bind(id.as_ref())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row_to_restaurant(&row)
    }

    async fn find_by_id_and_update(
        &self,
        id: &RestaurantId,
        patch: RestaurantPatch,
    ) -> DbResult<Restaurant> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let mut restaurant = Self::get_in_tx(&mut tx, id).await?;
        restaurant.apply(patch);
        let keys = MatchKeys::of(&restaurant)?;

        let query_str = "
            UPDATE restaurants
            SET name = ?, address = ?, city = ?, lat = ?, lng = ?, menu = ?, cuisine = ?,
                name_key = ?, city_key = ?, cuisine_key = ?
            WHERE id = ?
        ";
        let done = sqlx::query(query_str)
            .bind(restaurant.name())
            .bind(restaurant.address().as_deref())
            .bind(restaurant.city().as_deref())
            .bind(restaurant.location().map(|l| l.lat))
            .bind(restaurant.location().map(|l| l.lng))
            .bind(to_json(restaurant.menu())?)
            .bind(to_json(restaurant.cuisine())?)
            .bind(keys.name)
            .bind(keys.city)
            .bind(keys.cuisine)
            .bind(restaurant.id().as_ref())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        check_one_row_affected(done.rows_affected())?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(restaurant)
    }

    async fn save(&self, input: RestaurantInput) -> DbResult<Restaurant> {
        let restaurant = Restaurant::new(RestaurantId::generate(), input);
        let keys = MatchKeys::of(&restaurant)?;

        let query_str = "
            INSERT INTO restaurants
                (id, name, address, city, lat, lng, menu, cuisine, name_key, city_key, cuisine_key)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ";
        let done = sqlx::query(query_str)
            .bind(restaurant.id().as_ref())
            .bind(restaurant.name())
            .bind(restaurant.address().as_deref())
            .bind(restaurant.city().as_deref())
            .bind(restaurant.location().map(|l| l.lat))
            .bind(restaurant.location().map(|l| l.lng))
            .bind(to_json(restaurant.menu())?)
            .bind(to_json(restaurant.cuisine())?)
            .bind(keys.name)
            .bind(keys.city)
            .bind(keys.cuisine)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        check_one_row_affected(done.rows_affected())?;

        Ok(restaurant)
    }
}
