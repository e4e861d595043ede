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

//! Test utilities for the REST API.

use crate::db::mock::MemoryStore;
use crate::db::RestaurantStore;
use crate::driver::{Driver, DriverOptions};
use crate::model::*;
use crate::rest::app;
use axum::Router;
use std::sync::Arc;

/// Input for the restaurant that most tests operate on.
pub(crate) fn test_hotel() -> RestaurantInput {
    RestaurantInput::named("Test Hotel")
        .with_address("test address")
        .with_city("test city")
        .with_location(1234.0, 1254.0)
        .with_menu_item("test menu", 100.0)
        .with_cuisine("test")
}

/// State of an app backed by an in-memory store.
pub(crate) struct TestContext {
    /// The store backing the app, exposed for seeding and inspection.
    store: MemoryStore,

    /// The router under test.
    app: Router,
}

impl TestContext {
    /// Creates a new app with default options.
    pub(crate) fn setup() -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let store = MemoryStore::default();
        let driver = Driver::new(Arc::new(store.clone()), DriverOptions::default());
        let app = app(driver);
        Self { store, app }
    }

    /// Returns a copy of the router, ready to serve one request.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Returns the store backing the app.
    pub(crate) fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Seeds the store with a restaurant built from `input` under the raw `id`.
    pub(crate) async fn insert(&self, id: &str, input: RestaurantInput) -> Restaurant {
        let restaurant = Restaurant::new(RestaurantId::new(id), input);
        self.store.insert(restaurant.clone()).await;
        restaurant
    }

    /// Fetches the restaurant with the raw `id`, which must exist.
    pub(crate) async fn get(&self, id: &str) -> Restaurant {
        self.store.find_by_id(&RestaurantId::new(id)).await.unwrap()
    }
}
