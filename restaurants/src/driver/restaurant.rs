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

//! Operations on one restaurant.

use crate::driver::Driver;
use crate::model::*;
use log::info;
use restaurants_core::driver::DriverResult;

impl Driver {
    /// Gets the restaurant identified by the client-supplied `raw_id`.
    pub(crate) async fn get_restaurant(self, raw_id: &str) -> DriverResult<Restaurant> {
        let id = self.store.parse_id(raw_id)?;
        Ok(self.store.find_by_id(&id).await?)
    }

    /// Creates a new restaurant out of `input`.  The identifier is assigned by the store.
    pub(crate) async fn create_restaurant(
        self,
        input: RestaurantInput,
    ) -> DriverResult<Restaurant> {
        let input = input.validate()?;
        let restaurant = self.store.save(input).await?;
        info!("Created restaurant {}", restaurant.id());
        Ok(restaurant)
    }

    /// Merges `patch` into the restaurant identified by the client-supplied `raw_id`.
    pub(crate) async fn update_restaurant(
        self,
        raw_id: &str,
        patch: RestaurantPatch,
    ) -> DriverResult<Restaurant> {
        let id = self.store.parse_id(raw_id)?;
        let patch = patch.validate()?;
        let restaurant = self.store.find_by_id_and_update(&id, patch).await?;
        info!("Updated restaurant {}", id);
        Ok(restaurant)
    }
}
