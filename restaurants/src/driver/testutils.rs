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

//! Test utilities for the business layer.

use crate::db::mock::MemoryStore;
use crate::driver::{Driver, DriverOptions};
use crate::model::*;
use std::sync::Arc;

/// State of a driver backed by an in-memory store.
pub(crate) struct TestContext {
    /// The store backing the driver, exposed for seeding and inspection.
    store: MemoryStore,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Creates a new driver with default options.
    pub(crate) fn setup() -> Self {
        Self::setup_with_opts(DriverOptions::default())
    }

    /// Creates a new driver with the given `opts`.
    pub(crate) fn setup_with_opts(opts: DriverOptions) -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let store = MemoryStore::default();
        let driver = Driver::new(Arc::new(store.clone()), opts);
        Self { store, driver }
    }

    /// Returns the store backing the driver.
    pub(crate) fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Returns a copy of the driver, ready to execute one operation.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Seeds the store with a restaurant built from `input` under the raw `id`.
    pub(crate) async fn insert(&self, id: &str, input: RestaurantInput) -> Restaurant {
        let restaurant = Restaurant::new(RestaurantId::new(id), input);
        self.store.insert(restaurant.clone()).await;
        restaurant
    }
}
