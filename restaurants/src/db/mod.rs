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

//! Database abstraction in terms of the operations needed by the server.

use crate::model::*;
use async_trait::async_trait;
use restaurants_core::db::DbResult;

#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod sqlite;

/// Selection of restaurants to operate on, independent of pagination.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Criteria {
    /// Matches every restaurant.
    All,

    /// Matches restaurants whose name or any cuisine tag contains the given term, ignoring case.
    Search(String),

    /// Matches restaurants located in the given city, ignoring case.
    City(String),
}

/// A fully-resolved request for a page of restaurants.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Query {
    /// Which restaurants to return.
    pub(crate) criteria: Criteria,

    /// Number of matching restaurants to skip.
    pub(crate) offset: u64,

    /// Maximum number of restaurants to return.
    pub(crate) limit: u64,
}

/// Persistence port for restaurants.
///
/// Operations that return restaurants always return them ordered by identifier, so that
/// pagination is stable for a given snapshot of the data.
#[async_trait]
pub(crate) trait RestaurantStore {
    /// Checks that `raw` has the shape of an identifier in this store and returns it in its
    /// canonical form.  Never touches the underlying storage.
    fn parse_id(&self, raw: &str) -> DbResult<RestaurantId>;

    /// Gets the restaurants selected by `query`.
    async fn find(&self, query: &Query) -> DbResult<Vec<Restaurant>>;

    /// Counts all restaurants matching `criteria`.
    async fn count(&self, criteria: &Criteria) -> DbResult<u64>;

    /// Gets the restaurant identified by `id`.
    async fn find_by_id(&self, id: &RestaurantId) -> DbResult<Restaurant>;

    /// Merges `patch` into the restaurant identified by `id` and returns the updated restaurant.
    async fn find_by_id_and_update(
        &self,
        id: &RestaurantId,
        patch: RestaurantPatch,
    ) -> DbResult<Restaurant>;

    /// Stores a new restaurant built out of `input`, assigning it a fresh identifier.
    async fn save(&self, input: RestaurantInput) -> DbResult<Restaurant>;
}
