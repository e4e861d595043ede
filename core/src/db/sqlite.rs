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

//! Common utilities to interact with an SQLite database.

use crate::db::{DbError, DbResult};
use crate::env::{get_optional_var, get_required_var};
use log::debug;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default maximum amount of time to wait for a connection from the pool.
const DEFAULT_ACQUIRE_TIMEOUT_SECONDS: u64 = 5;

/// Connection string that selects a private in-memory database.
const IN_MEMORY_URI: &str = ":memory:";

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e if e.to_string().contains("UNIQUE constraint failed") => DbError::AlreadyExists,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to establish a connection to an SQLite database.
#[derive(Debug, PartialEq)]
pub struct SqliteOptions {
    /// Connection string: a path, a `sqlite:` URI or `:memory:`.
    pub uri: String,

    /// Maximum number of connections to keep in the pool.
    pub max_connections: u32,

    /// Maximum time to wait for a connection before giving up.
    pub acquire_timeout: Duration,
}

impl SqliteOptions {
    /// Returns options for a private in-memory database, useful for tests.
    pub fn in_memory() -> Self {
        Self {
            uri: IN_MEMORY_URI.to_owned(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECONDS),
        }
    }

    /// Creates a set of options from environment variables whose name is prefixed with the given
    /// `prefix`.
    ///
    /// This will use variables such as `<prefix>_URI`, `<prefix>_MAX_CONNECTIONS` and
    /// `<prefix>_ACQUIRE_TIMEOUT_SECS`.
    pub fn from_env(prefix: &str) -> Result<SqliteOptions, String> {
        Ok(SqliteOptions {
            uri: get_required_var::<String>(prefix, "URI")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout: get_optional_var::<Duration>(prefix, "ACQUIRE_TIMEOUT_SECS")?
                .unwrap_or_else(|| Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECONDS)),
        })
    }
}

/// Opens a connection pool to the database described by `opts`.
///
/// In-memory databases only live as long as their last connection, so the pool is configured to
/// keep exactly one connection open forever in that case.
pub async fn connect(opts: &SqliteOptions) -> DbResult<SqlitePool> {
    let conn_opts =
        SqliteConnectOptions::from_str(&opts.uri).map_err(map_sqlx_error)?.create_if_missing(true);

    let pool_opts = if opts.uri == IN_MEMORY_URI {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(opts.max_connections)
    };

    debug!("Connecting to SQLite database {}", opts.uri);
    pool_opts
        .acquire_timeout(opts.acquire_timeout)
        .connect_with(conn_opts)
        .await
        .map_err(map_sqlx_error)
}

/// Helper function to initialize the database with a schema that may contain multiple
/// statements.
pub async fn run_schema(pool: &SqlitePool, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(pool).await.map_err(map_sqlx_error)?;
    Ok(())
}
