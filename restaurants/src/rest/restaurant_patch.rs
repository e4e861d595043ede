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

//! API to update parts of a restaurant.

use crate::driver::Driver;
use crate::model::RestaurantPatch;
use crate::rest::errors::update_error;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use restaurants_core::rest::{RestError, RestResult};

/// API handler.  Responds with an empty body on success.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(id): Path<String>,
    patch: Result<Json<RestaurantPatch>, JsonRejection>,
) -> RestResult<()> {
    let Json(patch) = patch?;
    driver.update_restaurant(&id, patch).await.map_err(update_error)?;
    Ok(())
}

/// API handler for update requests that do not name a restaurant.
pub(crate) async fn missing_id_handler() -> RestResult<()> {
    Err(RestError::NotFound("Missing restaurant identifier".to_owned()))
}
