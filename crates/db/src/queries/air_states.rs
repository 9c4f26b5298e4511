//! Air-state database operations.
//!
//! Rows are immutable once written. The natural key is the primary key, so
//! re-importing the same feed snapshot is a no-op.

use crate::models::AirStateRow;
use airbot_core::air::AirState;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Rows per INSERT statement. Eleven binds per row keeps this far below the
/// Postgres bind-parameter limit.
pub const INSERT_BATCH_SIZE: usize = 500;

/// Insert records whose natural key is not present yet.
///
/// Each batch commits on its own; a failure part-way leaves the earlier
/// batches in place. Returns the number of rows written.
pub async fn insert_missing(pool: &PgPool, states: &[AirState]) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for chunk in states.chunks(INSERT_BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO air_states \
             (natural_key, county, site_name, psi, pm10, pm2_5, o3, co, no2, so2, publish_time) ",
        );
        qb.push_values(chunk, |mut row, state| {
            row.push_bind(state.natural_key())
                .push_bind(state.county.clone())
                .push_bind(state.site_name.clone())
                .push_bind(state.psi.clone())
                .push_bind(state.pm10.clone())
                .push_bind(state.pm2_5.clone())
                .push_bind(state.o3.clone())
                .push_bind(state.co.clone())
                .push_bind(state.no2.clone())
                .push_bind(state.so2.clone())
                .push_bind(state.publish_time.0.with_timezone(&Utc));
        });
        qb.push(" ON CONFLICT (natural_key) DO NOTHING");

        let result = qb.build().execute(pool).await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Newest row for a monitoring site.
pub async fn latest_for_site(
    pool: &PgPool,
    county: &str,
    site_name: &str,
) -> Result<Option<AirStateRow>, sqlx::Error> {
    sqlx::query_as::<_, AirStateRow>(
        r#"
        SELECT natural_key, county, site_name, psi, pm10, pm2_5, o3, co, no2, so2,
               publish_time, created_at
        FROM air_states
        WHERE county = $1 AND site_name = $2
        ORDER BY publish_time DESC
        LIMIT 1
        "#,
    )
    .bind(county)
    .bind(site_name)
    .fetch_optional(pool)
    .await
}
