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

//! Entry point to the REST server.

use crate::driver::Driver;
use crate::model::{Page, Restaurant};
use axum::response::IntoResponse;
use axum::{Json, Router};

mod errors;
mod restaurant_get;
mod restaurant_patch;
mod restaurants_filter_post;
mod restaurants_get;
mod restaurants_post;
#[cfg(test)]
mod testutils;

/// Name of the response header carrying the total number of matches across all pages.
pub(crate) const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Name of the response header carrying the offset of the returned page.
pub(crate) const OFFSET_HEADER: &str = "x-offset";

/// Name of the response header carrying the maximum size of the returned page.
pub(crate) const LIMIT_HEADER: &str = "x-limit";

/// Converts a `page` of restaurants into a response: the items go into the body as a JSON array
/// and the pagination details go into headers.
fn page_response(page: Page<Restaurant>) -> impl IntoResponse {
    let headers = [
        (TOTAL_COUNT_HEADER, page.total.to_string()),
        (OFFSET_HEADER, page.offset.to_string()),
        (LIMIT_HEADER, page.limit.to_string()),
    ];
    (headers, Json(page.items))
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::{get, post};
    Router::new()
        .route(
            "/restaurants",
            get(restaurants_get::handler)
                .post(restaurants_post::handler)
                .patch(restaurant_patch::missing_id_handler),
        )
        .route("/restaurants/filter", post(restaurants_filter_post::handler))
        .route("/restaurants/:id", get(restaurant_get::handler).patch(restaurant_patch::handler))
        .with_state(driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::testutils::setup;
    use crate::driver::DriverOptions;
    use crate::model::*;
    use crate::rest::testutils::test_hotel;
    use axum::http;
    use restaurants_core::rest::testutils::*;
    use std::sync::Arc;

    /// Creates an app backed by a fresh SQLite database.
    async fn sqlite_app() -> Router {
        let store = setup().await;
        app(Driver::new(Arc::new(store), DriverOptions::default()))
    }

    #[tokio::test]
    async fn test_end_to_end_with_sqlite() {
        let app = sqlite_app().await;

        let created = OneShotBuilder::new(app.clone(), (http::Method::POST, "/restaurants"))
            .send_json(serde_json::json!({
                "name": "Test Hotel",
                "address": "test address",
                "city": "test city",
                "location": {"lat": 1234.0, "lng": 1254.0},
                "menu": [{"name": "test menu", "price": 100.0}],
                "cuisine": ["test"],
            }))
            .await
            .expect_json::<Restaurant>()
            .await;
        assert_eq!(Restaurant::new(created.id().clone(), test_hotel()), created);
        OneShotBuilder::new(app.clone(), (http::Method::POST, "/restaurants"))
            .send_json(serde_json::json!({"name": "Curry House", "city": "Pune"}))
            .await
            .expect_json::<Restaurant>()
            .await;

        let response = OneShotBuilder::new(app.clone(), (http::Method::GET, "/restaurants"))
            .with_query([("search", "HOTEL")])
            .send_empty()
            .await
            .expect_header(TOTAL_COUNT_HEADER, "1")
            .expect_json::<Vec<Restaurant>>()
            .await;
        assert_eq!(vec![created.clone()], response);

        let path = format!("/restaurants/{}", created.id());
        OneShotBuilder::new(app.clone(), (http::Method::PATCH, &path))
            .send_json(serde_json::json!({"city": "Pune"}))
            .await
            .expect_empty()
            .await;

        let response =
            OneShotBuilder::new(app.clone(), (http::Method::POST, "/restaurants/filter"))
                .with_header("city", "pune")
                .send_empty()
                .await
                .expect_header(TOTAL_COUNT_HEADER, "2")
                .expect_json::<Vec<Restaurant>>()
                .await;
        let mut names = response.iter().map(|r| r.name().as_str()).collect::<Vec<&str>>();
        names.sort();
        assert_eq!(vec!["Curry House", "Test Hotel"], names);

        let response = OneShotBuilder::new(app, (http::Method::GET, &path))
            .send_empty()
            .await
            .expect_json::<Vec<Restaurant>>()
            .await;
        assert_eq!(1, response.len());
        assert_eq!(&Some("Pune".to_owned()), response[0].city());
        assert_eq!(created.name(), response[0].name());
    }

    /// Creates a restaurant through the API and returns the stored record.
    async fn create(app: &Router, body: serde_json::Value) -> Restaurant {
        OneShotBuilder::new(app.clone(), (http::Method::POST, "/restaurants"))
            .send_json(body)
            .await
            .expect_json::<Restaurant>()
            .await
    }

    #[tokio::test]
    async fn test_sqlite_get_by_id_is_idempotent() {
        let app = sqlite_app().await;
        let created = create(&app, serde_json::json!({"name": "Test Hotel", "city": "Pune"})).await;

        let path = format!("/restaurants/{}", created.id());
        let mut responses = vec![];
        for _ in 0..2 {
            let response = OneShotBuilder::new(app.clone(), (http::Method::GET, &path))
                .send_empty()
                .await
                .expect_json::<Vec<Restaurant>>()
                .await;
            responses.push(response);
        }
        assert_eq!(vec![created], responses[0]);
        assert_eq!(responses[0], responses[1]);
    }

    #[tokio::test]
    async fn test_sqlite_search_order_is_stable() {
        let app = sqlite_app().await;
        for name in ["Hotel C", "hotel a", "HOTEL B", "Motel"] {
            create(&app, serde_json::json!({"name": name})).await;
        }

        let mut responses = vec![];
        for _ in 0..3 {
            let response = OneShotBuilder::new(app.clone(), (http::Method::GET, "/restaurants"))
                .with_query([("search", "hotel")])
                .send_empty()
                .await
                .expect_header(TOTAL_COUNT_HEADER, "3")
                .expect_json::<Vec<Restaurant>>()
                .await;
            responses.push(response);
        }
        assert_eq!(responses[0], responses[1]);
        assert_eq!(responses[1], responses[2]);

        let ids = responses[0].iter().map(|r| r.id().to_string()).collect::<Vec<String>>();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(sorted, ids);
    }

    #[tokio::test]
    async fn test_sqlite_filter_utf8_city() {
        let app = sqlite_app().await;
        let created =
            create(&app, serde_json::json!({"name": "Kronenhalle", "city": "Zürich"})).await;
        create(&app, serde_json::json!({"name": "Elsewhere", "city": "Zurich"})).await;
        let cafe = create(&app, serde_json::json!({"name": "Café Zürich"})).await;

        let response =
            OneShotBuilder::new(app.clone(), (http::Method::POST, "/restaurants/filter"))
                .with_header("city", "zürich".as_bytes())
                .send_empty()
                .await
                .expect_header(TOTAL_COUNT_HEADER, "1")
                .expect_json::<Vec<Restaurant>>()
                .await;
        assert_eq!(vec![created.clone()], response);

        let response = OneShotBuilder::new(app, (http::Method::GET, "/restaurants"))
            .with_query([("search", "ZÜRICH")])
            .send_empty()
            .await
            .expect_header(TOTAL_COUNT_HEADER, "1")
            .expect_json::<Vec<Restaurant>>()
            .await;
        assert_eq!(vec![cafe], response);
    }

    #[tokio::test]
    async fn test_sqlite_get_unknown_id_is_empty_result() {
        OneShotBuilder::new(
            sqlite_app().await,
            (http::Method::GET, "/restaurants/60fea0d36423db7aa4440b29"),
        )
        .send_empty()
        .await
        .expect_status(http::StatusCode::FORBIDDEN)
        .expect_error("not found")
        .await;
    }

    #[tokio::test]
    async fn test_sqlite_get_malformed_id_is_internal_error() {
        OneShotBuilder::new(sqlite_app().await, (http::Method::GET, "/restaurants/adefgew"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("Invalid restaurant identifier 'adefgew'")
            .await;
    }

    #[tokio::test]
    async fn test_sqlite_patch_malformed_id_is_not_found() {
        OneShotBuilder::new(sqlite_app().await, (http::Method::PATCH, "/restaurants/invalid_id"))
            .send_json(serde_json::json!({"name": "Test Hotel"}))
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("invalid_id")
            .await;
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = sqlite_app().await;
        let response = OneShotBuilder::new(app, (http::Method::GET, "/nothing/here"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .take_response()
            .await;
        assert_eq!(http::StatusCode::NOT_FOUND, response.status());
    }
}
