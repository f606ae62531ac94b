use crate::config::Config;
use crate::error::ApiError;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Connects eagerly, so an unreachable store fails here rather than on the first request.
pub fn create_db_connection_pool(config: &Config) -> Result<DbPool, ApiError> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    r2d2::Pool::builder()
        .max_size(config.pool_max_size)
        .connection_timeout(config.connection_timeout)
        .build(manager)
        .map_err(|e| ApiError::StoreUnavailable(format!("Could not create DB Connection Pool: {}", e)))
}

pub fn init_db(pool: &DbPool) -> Result<(), ApiError> {
    let mut pooled = pool.get().map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;
    let conn: &mut PgConnection = &mut pooled;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| ApiError::StoreUnavailable(format!("Could not run migrations: {}", e)))?;
    for version in applied {
        info!("applied migration {}", version);
    }
    Ok(())
}

/// Per-request unit of work.
///
/// Resolving the guard does not touch the store; a connection is checked out only
/// inside [`Db::run`], so payload validation happens before any checkout.
pub struct Db(DbPool);

impl Db {
    /// Runs `f` inside one transaction on one pooled connection, on a blocking thread.
    /// `Ok` commits and `Err` rolls back; the connection goes back to the pool either way.
    pub async fn run<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.0.clone();
        rocket::tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get().map_err(|e| {
                warn!("There was a problem getting a connection: {}", e);
                ApiError::StoreUnavailable(e.to_string())
            })?;
            let conn: &mut PgConnection = &mut pooled;
            conn.transaction(f)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("database task failed: {}", e)))?
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Db {
    type Error = ApiError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match request.rocket().state::<DbPool>() {
            Some(pool) => Outcome::Success(Db(pool.clone())),
            None => Outcome::Error((Status::InternalServerError, ApiError::Internal("no connection pool is managed".to_string()))),
        }
    }
}

impl<'r> OpenApiFromRequest<'r> for Db {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}
