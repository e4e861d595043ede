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

//! Operations on collections of restaurants.

use crate::db::{Criteria, Query};
use crate::driver::Driver;
use crate::model::*;
use log::debug;
use restaurants_core::driver::DriverResult;

impl Driver {
    /// Gets all restaurants selected by `query`.
    pub(crate) async fn list_restaurants(self, query: &Query) -> DriverResult<Vec<Restaurant>> {
        Ok(self.store.find(query).await?)
    }

    /// Counts all restaurants matching `criteria`, ignoring pagination.
    pub(crate) async fn count_restaurants(self, criteria: &Criteria) -> DriverResult<u64> {
        Ok(self.store.count(criteria).await?)
    }

    /// Gets one page of the restaurants that match the client-supplied `filter`.
    pub(crate) async fn find_restaurants(
        self,
        filter: QueryFilter,
    ) -> DriverResult<Page<Restaurant>> {
        let query = filter.resolve(&self.opts)?;
        debug!("Finding restaurants with {:?}", query);

        let items = self.clone().list_restaurants(&query).await?;
        let total = self.count_restaurants(&query.criteria).await?;
        Ok(Page { items, total, offset: query.offset, limit: query.limit })
    }
}
