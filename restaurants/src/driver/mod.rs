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

//! Business logic for the service.

use crate::db::RestaurantStore;
use restaurants_core::env::get_optional_var;
use std::sync::Arc;

mod query;
mod restaurant;
mod restaurants;
#[cfg(test)]
pub(crate) mod testutils;

/// Default value for the `DEFAULT_PAGE_SIZE` setting when not specified.
const DEFAULT_DEFAULT_PAGE_SIZE: u64 = 20;

/// Default value for the `MAX_PAGE_SIZE` setting when not specified.
const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Configuration options for the restaurants driver.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct DriverOptions {
    /// Number of restaurants returned by list operations when the client does not ask for a
    /// specific amount.
    pub default_page_size: u64,

    /// Maximum number of restaurants returned by list operations.  Larger requests are clamped.
    pub max_page_size: u64,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self { default_page_size: DEFAULT_DEFAULT_PAGE_SIZE, max_page_size: DEFAULT_MAX_PAGE_SIZE }
    }
}

impl DriverOptions {
    /// Creates a new set of options from environment variables.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let opts = Self {
            default_page_size: get_optional_var::<u64>(prefix, "DEFAULT_PAGE_SIZE")?
                .unwrap_or(DEFAULT_DEFAULT_PAGE_SIZE),
            max_page_size: get_optional_var::<u64>(prefix, "MAX_PAGE_SIZE")?
                .unwrap_or(DEFAULT_MAX_PAGE_SIZE),
        };
        if opts.default_page_size == 0 || opts.default_page_size > opts.max_page_size {
            return Err(format!(
                "{}_DEFAULT_PAGE_SIZE must be between 1 and {}_MAX_PAGE_SIZE ({})",
                prefix, prefix, opts.max_page_size
            ));
        }
        Ok(opts)
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": each is a complete unit of
/// work against the persistence layer.  For this reason, these operations consume the driver in
/// an attempt to minimize the possibility of executing two operations by mistake.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The persistence port that the driver uses to access restaurants.
    store: Arc<dyn RestaurantStore + Send + Sync>,

    /// Configuration options.
    opts: DriverOptions,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(store: Arc<dyn RestaurantStore + Send + Sync>, opts: DriverOptions) -> Self {
        Self { store, opts }
    }
}
