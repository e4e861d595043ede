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

//! High-level data types.

use derive_getters::Getters;
use derive_more::{AsRef, Display};
use restaurants_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use time::OffsetDateTime;

/// Process-wide counter mixed into generated identifiers so that identifiers generated within the
/// same second by the same process never collide.
static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Opaque identifier of a restaurant.
///
/// Identifiers are assigned by the persistence layer when a restaurant is created and never change
/// afterwards.  Which strings are valid identifiers is up to each persistence backend.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub(crate) struct RestaurantId(String);

impl RestaurantId {
    /// Wraps a raw identifier whose shape has already been validated by a persistence backend.
    pub(crate) fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Generates a fresh identifier made of 24 lowercase hexadecimal digits: 4 bytes with the
    /// current UNIX time in seconds, 5 random bytes, and 3 bytes of a per-process counter.
    pub(crate) fn generate() -> Self {
        let secs = (OffsetDateTime::now_utc().unix_timestamp() & 0xffff_ffff) as u32;
        let random = rand::random::<[u8; 5]>();
        let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut id = format!("{:08x}", secs);
        for b in random {
            id.push_str(&format!("{:02x}", b));
        }
        id.push_str(&format!("{:06x}", counter));
        Self(id)
    }
}

/// Returns the trimmed version of `value`, ensuring it is not blank.
fn validate_text(field: &'static str, value: String) -> ModelResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_owned())
}

/// Same as `validate_text` but for fields that may be absent.
fn validate_optional_text(
    field: &'static str,
    value: Option<String>,
) -> ModelResult<Option<String>> {
    value.map(|v| validate_text(field, v)).transpose()
}

/// Geographical coordinates of a restaurant.
///
/// Both coordinates are mandatory, which makes it impossible to represent a partial location.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct Location {
    /// Latitude.
    pub(crate) lat: f64,

    /// Longitude.
    pub(crate) lng: f64,
}

impl Location {
    /// Ensures both coordinates are finite numbers.
    fn validate(self) -> ModelResult<Self> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(ModelError("Location coordinates must be finite numbers".to_owned()));
        }
        Ok(self)
    }
}

/// An entry in the menu of a restaurant.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct MenuItem {
    /// Name of the dish.
    pub(crate) name: String,

    /// Price of the dish.  Never negative.
    pub(crate) price: f64,
}

impl MenuItem {
    /// Normalizes the name of the item and ensures its price is a non-negative number.
    fn validate(self) -> ModelResult<Self> {
        let name = validate_text("Menu item name", self.name)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ModelError(format!(
                "Price of menu item '{}' must be a non-negative number",
                name
            )));
        }
        Ok(Self { name, price: self.price })
    }
}

/// Validates all items in a `menu`, preserving their order.
fn validate_menu(menu: Vec<MenuItem>) -> ModelResult<Vec<MenuItem>> {
    menu.into_iter().map(MenuItem::validate).collect()
}

/// Normalizes all `cuisine` tags, rejecting blank ones.
fn validate_cuisine(cuisine: BTreeSet<String>) -> ModelResult<BTreeSet<String>> {
    cuisine.into_iter().map(|tag| validate_text("Cuisine tag", tag)).collect()
}

/// Full representation of a restaurant as provided by a client that wants to create one.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[cfg_attr(test, derive(Serialize))]
pub(crate) struct RestaurantInput {
    /// Name of the restaurant.  Required.
    pub(crate) name: String,

    /// Street address.
    #[serde(default)]
    pub(crate) address: Option<String>,

    /// City in which the restaurant is located.
    #[serde(default)]
    pub(crate) city: Option<String>,

    /// Geographical coordinates.
    #[serde(default)]
    pub(crate) location: Option<Location>,

    /// Dishes offered by the restaurant, in presentation order.
    #[serde(default)]
    pub(crate) menu: Vec<MenuItem>,

    /// Cuisine tags.
    #[serde(default)]
    pub(crate) cuisine: BTreeSet<String>,
}

impl RestaurantInput {
    /// Validates all fields of the input and returns their normalized form.
    pub(crate) fn validate(self) -> ModelResult<Self> {
        Ok(Self {
            name: validate_text("Name", self.name)?,
            address: validate_optional_text("Address", self.address)?,
            city: validate_optional_text("City", self.city)?,
            location: self.location.map(Location::validate).transpose()?,
            menu: validate_menu(self.menu)?,
            cuisine: validate_cuisine(self.cuisine)?,
        })
    }
}

#[cfg(test)]
impl RestaurantInput {
    /// Creates a minimal input with just a `name`.
    pub(crate) fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            address: None,
            city: None,
            location: None,
            menu: vec![],
            cuisine: BTreeSet::default(),
        }
    }

    /// Sets the address of the input.
    pub(crate) fn with_address<S: Into<String>>(mut self, address: S) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the city of the input.
    pub(crate) fn with_city<S: Into<String>>(mut self, city: S) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Sets the location of the input.
    pub(crate) fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(Location { lat, lng });
        self
    }

    /// Appends an item to the menu of the input.
    pub(crate) fn with_menu_item<S: Into<String>>(mut self, name: S, price: f64) -> Self {
        self.menu.push(MenuItem { name: name.into(), price });
        self
    }

    /// Adds a cuisine tag to the input.
    pub(crate) fn with_cuisine<S: Into<String>>(mut self, tag: S) -> Self {
        self.cuisine.insert(tag.into());
        self
    }
}

/// Partial representation of a restaurant as provided by a client that wants to update one.
///
/// Absent fields are left untouched by the update.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[cfg_attr(test, derive(Serialize))]
pub(crate) struct RestaurantPatch {
    /// New name.
    #[serde(default)]
    pub(crate) name: Option<String>,

    /// New street address.
    #[serde(default)]
    pub(crate) address: Option<String>,

    /// New city.
    #[serde(default)]
    pub(crate) city: Option<String>,

    /// New coordinates.
    #[serde(default)]
    pub(crate) location: Option<Location>,

    /// Replacement menu.
    #[serde(default)]
    pub(crate) menu: Option<Vec<MenuItem>>,

    /// Replacement cuisine tags.
    #[serde(default)]
    pub(crate) cuisine: Option<BTreeSet<String>>,
}

impl RestaurantPatch {
    /// Validates all present fields of the patch and returns their normalized form.
    pub(crate) fn validate(self) -> ModelResult<Self> {
        Ok(Self {
            name: validate_optional_text("Name", self.name)?,
            address: validate_optional_text("Address", self.address)?,
            city: validate_optional_text("City", self.city)?,
            location: self.location.map(Location::validate).transpose()?,
            menu: self.menu.map(validate_menu).transpose()?,
            cuisine: self.cuisine.map(validate_cuisine).transpose()?,
        })
    }
}

/// A restaurant as stored by the service.
#[derive(Clone, Debug, Getters, PartialEq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct Restaurant {
    /// Identifier assigned by the persistence layer.
    id: RestaurantId,

    /// Name of the restaurant.
    name: String,

    /// Street address.
    address: Option<String>,

    /// City in which the restaurant is located.
    city: Option<String>,

    /// Geographical coordinates.
    location: Option<Location>,

    /// Dishes offered by the restaurant, in presentation order.
    menu: Vec<MenuItem>,

    /// Cuisine tags.
    cuisine: BTreeSet<String>,
}

impl Restaurant {
    /// Creates a restaurant with identifier `id` out of the fields in `input`.
    pub(crate) fn new(id: RestaurantId, input: RestaurantInput) -> Self {
        Self {
            id,
            name: input.name,
            address: input.address,
            city: input.city,
            location: input.location,
            menu: input.menu,
            cuisine: input.cuisine,
        }
    }

    /// Merges the fields present in `patch` into this restaurant.  The identifier never changes.
    pub(crate) fn apply(&mut self, patch: RestaurantPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
        if let Some(city) = patch.city {
            self.city = Some(city);
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(menu) = patch.menu {
            self.menu = menu;
        }
        if let Some(cuisine) = patch.cuisine {
            self.cuisine = cuisine;
        }
    }
}

/// Criteria supplied by a client to list restaurants.  Lives for the duration of one request.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct QueryFilter {
    /// Free-text term to look for in names and cuisine tags.
    pub(crate) search: Option<String>,

    /// City that all returned restaurants must be in.
    pub(crate) city: Option<String>,

    /// Number of matching restaurants to skip.
    pub(crate) offset: Option<u64>,

    /// Maximum number of restaurants to return.
    pub(crate) limit: Option<u64>,
}

/// A subset of the items matching a query plus the metadata to fetch the rest.
#[derive(Debug, PartialEq)]
pub(crate) struct Page<T> {
    /// Items in this page.
    pub(crate) items: Vec<T>,

    /// Total number of items matching the query across all pages.
    pub(crate) total: u64,

    /// Number of matching items skipped before this page.
    pub(crate) offset: u64,

    /// Maximum number of items the page could hold.
    pub(crate) limit: u64,
}
