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

//! Endpoint-specific classification of business errors.
//!
//! Most endpoints rely on the generic `From<DriverError>` conversion into `RestError`.  The
//! endpoints that operate on a single restaurant have their own contracts for what a missing
//! restaurant looks like to the client, and these are captured here.

use restaurants_core::driver::DriverError;
use restaurants_core::rest::RestError;

/// Classifies a failure to fetch a restaurant by identifier.
///
/// A lookup that yields nothing is reported as an empty result.  Malformed identifiers are not
/// the client's concern and keep their generic classification.
pub(crate) fn lookup_error(e: DriverError) -> RestError {
    match e {
        DriverError::NotFound(msg) => RestError::EmptyResult(msg),
        e => e.into(),
    }
}

/// Classifies a failure to update a restaurant.
///
/// An identifier that cannot be resolved to a restaurant, whether because it is malformed or
/// because nothing has it, is reported as not found.
pub(crate) fn update_error(e: DriverError) -> RestError {
    match e {
        DriverError::InvalidIdentifier(msg) => RestError::NotFound(msg),
        e => e.into(),
    }
}
