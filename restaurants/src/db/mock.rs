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

//! In-memory implementation of the database abstraction for tests.

use crate::db::{Criteria, Query, RestaurantStore};
use crate::model::*;
use async_trait::async_trait;
use futures::lock::Mutex;
use restaurants_core::db::{DbError, DbResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns true if `restaurant` is selected by `criteria`.
fn matches(criteria: &Criteria, restaurant: &Restaurant) -> bool {
    match criteria {
        Criteria::All => true,
        Criteria::Search(term) => {
            let term = term.to_lowercase();
            restaurant.name().to_lowercase().contains(&term)
                || restaurant.cuisine().iter().any(|tag| tag.to_lowercase().contains(&term))
        }
        Criteria::City(city) => restaurant
            .city()
            .as_ref()
            .map(|c| c.to_lowercase() == city.to_lowercase())
            .unwrap_or(false),
    }
}

/// Restaurant store that keeps all data in memory.
///
/// Identifiers are accepted as long as they are made of alphanumeric characters, dashes and
/// underscores.  Tests can make every storage operation fail and can count how many storage
/// operations were issued.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    /// All known restaurants keyed by their identifier.
    restaurants: Arc<Mutex<BTreeMap<RestaurantId, Restaurant>>>,

    /// Error to return from all storage operations, if any.
    failure: Arc<Mutex<Option<DbError>>>,

    /// Number of storage operations issued so far.
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Makes all future storage operations fail with `error`.
    pub(crate) async fn fail_with(&self, error: DbError) {
        *self.failure.lock().await = Some(error);
    }

    /// Returns the number of storage operations issued so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stores `restaurant` as is, bypassing identifier generation.
    pub(crate) async fn insert(&self, restaurant: Restaurant) {
        let mut restaurants = self.restaurants.lock().await;
        let previous = restaurants.insert(restaurant.id().clone(), restaurant);
        assert!(previous.is_none(), "Restaurant already present");
    }

    /// Records a storage operation and returns the injected failure, if any.
    async fn enter(&self) -> DbResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().await.as_ref() {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RestaurantStore for MemoryStore {
    fn parse_id(&self, raw: &str) -> DbResult<RestaurantId> {
        let valid_char = |ch: char| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
        if raw.is_empty() || !raw.chars().all(valid_char) {
            return Err(DbError::InvalidIdentifier(format!(
                "Invalid restaurant identifier '{}'",
                raw
            )));
        }
        Ok(RestaurantId::new(raw))
    }

    async fn find(&self, query: &Query) -> DbResult<Vec<Restaurant>> {
        self.enter().await?;
        let restaurants = self.restaurants.lock().await;
        Ok(restaurants
            .values()
            .filter(|r| matches(&query.criteria, r))
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, criteria: &Criteria) -> DbResult<u64> {
        self.enter().await?;
        let restaurants = self.restaurants.lock().await;
        let count = restaurants.values().filter(|r| matches(criteria, r)).count();
        Ok(count as u64)
    }

    async fn find_by_id(&self, id: &RestaurantId) -> DbResult<Restaurant> {
        self.enter().await?;
        let restaurants = self.restaurants.lock().await;
        restaurants.get(id).cloned().ok_or(DbError::NotFound)
    }

    async fn find_by_id_and_update(
        &self,
        id: &RestaurantId,
        patch: RestaurantPatch,
    ) -> DbResult<Restaurant> {
        self.enter().await?;
        let mut restaurants = self.restaurants.lock().await;
        let restaurant = restaurants.get_mut(id).ok_or(DbError::NotFound)?;
        restaurant.apply(patch);
        Ok(restaurant.clone())
    }

    async fn save(&self, input: RestaurantInput) -> DbResult<Restaurant> {
        self.enter().await?;
        let restaurant = Restaurant::new(RestaurantId::generate(), input);
        let mut restaurants = self.restaurants.lock().await;
        if restaurants.contains_key(restaurant.id()) {
            return Err(DbError::AlreadyExists);
        }
        restaurants.insert(restaurant.id().clone(), restaurant.clone());
        Ok(restaurant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::generate_db_tests;

    generate_db_tests!(MemoryStore::default());

    #[test]
    fn test_parse_id_is_permissive() {
        let store = MemoryStore::default();
        for raw in ["adefgew", "invalid_id", "60fea0d36423db7aa4440b29", "A-1"] {
            assert_eq!(RestaurantId::new(raw), store.parse_id(raw).unwrap());
        }
    }

    #[test]
    fn test_parse_id_errors() {
        let store = MemoryStore::default();
        for raw in ["", "bad.id", "has space", "ñ"] {
            match store.parse_id(raw) {
                Err(DbError::InvalidIdentifier(msg)) => assert!(msg.contains(raw)),
                e => panic!("Unexpected result for {}: {:?}", raw, e),
            }
        }
        assert_eq!(0, store.calls());
    }

    #[tokio::test]
    async fn test_fail_with() {
        let store = MemoryStore::default();
        store.fail_with(DbError::Unavailable).await;

        assert_eq!(DbError::Unavailable, store.count(&Criteria::All).await.unwrap_err());
        assert_eq!(
            DbError::Unavailable,
            store.save(RestaurantInput::named("Test Hotel")).await.unwrap_err()
        );
        assert_eq!(2, store.calls());
    }

    #[tokio::test]
    async fn test_insert_keeps_id() {
        let store = MemoryStore::default();
        let restaurant = Restaurant::new(RestaurantId::new("adefgew"), RestaurantInput::named("a"));
        store.insert(restaurant.clone()).await;

        assert_eq!(restaurant, store.find_by_id(&RestaurantId::new("adefgew")).await.unwrap());
        assert_eq!(1, store.calls());
    }
}
