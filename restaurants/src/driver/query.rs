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

//! Translation of client-supplied query filters into storage queries.

use crate::db::{Criteria, Query};
use crate::driver::DriverOptions;
use crate::model::QueryFilter;
use restaurants_core::driver::{DriverError, DriverResult};

impl QueryFilter {
    /// Resolves this filter into a storage query, applying the pagination policy in `opts`.
    ///
    /// Searching by term and filtering by city are mutually exclusive.  A blank search term is
    /// the same as no search term, but a blank city is an error because the client explicitly
    /// asked to filter by it.
    pub(crate) fn resolve(self, opts: &DriverOptions) -> DriverResult<Query> {
        let search = self.search.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());

        let city = match self.city {
            Some(city) => {
                let city = city.trim();
                if city.is_empty() {
                    return Err(DriverError::InvalidInput("City cannot be empty".to_owned()));
                }
                Some(city.to_owned())
            }
            None => None,
        };

        let criteria = match (search, city) {
            (Some(_), Some(_)) => {
                return Err(DriverError::InvalidInput(
                    "Cannot search and filter by city at the same time".to_owned(),
                ));
            }
            (Some(term), None) => Criteria::Search(term),
            (None, Some(city)) => Criteria::City(city),
            (None, None) => Criteria::All,
        };

        let limit = match self.limit {
            Some(0) => {
                return Err(DriverError::InvalidInput("Limit must be greater than zero".to_owned()))
            }
            Some(limit) => limit.min(opts.max_page_size),
            None => opts.default_page_size,
        };

        Ok(Query { criteria, offset: self.offset.unwrap_or(0), limit })
    }
}
