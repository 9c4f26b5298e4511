pub mod models;
pub mod queries;
pub mod store;

pub use store::PgAirStateStore;

/// Applies the embedded migrations.
pub async fn migrate(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
