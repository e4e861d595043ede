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

//! API to list the restaurants located in a city.

use crate::driver::Driver;
use crate::model::QueryFilter;
use crate::rest::page_response;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use restaurants_core::rest::{get_required_text_header, EmptyBody, RestResult};
use serde::Deserialize;

/// Name of the request header that carries the city to filter by.
const CITY_HEADER: &str = "city";

/// Query parameters accepted by this API.
#[derive(Deserialize)]
pub(crate) struct PageParams {
    /// Number of matching restaurants to skip.
    offset: Option<u64>,

    /// Maximum number of restaurants to return.
    limit: Option<u64>,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    headers: HeaderMap,
    params: Result<Query<PageParams>, QueryRejection>,
    _: EmptyBody,
) -> RestResult<impl IntoResponse> {
    let Query(params) = params?;
    let city = get_required_text_header(&headers, CITY_HEADER)?;
    let filter = QueryFilter {
        search: None,
        city: Some(city.to_owned()),
        offset: params.offset,
        limit: params.limit,
    };
    let page = driver.find_restaurants(filter).await?;
    Ok(page_response(page))
}
