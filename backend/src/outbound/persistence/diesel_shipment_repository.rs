//! SQLite-backed `ShipmentRepository` implementation using Diesel ORM.
//!
//! Pickups and deliveries live in separate tables keyed by AWB. Bulk
//! ingestion and purges run inside a single transaction; listings build the
//! same boxed filter twice, once for the page and once for the total.

use async_trait::async_trait;
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, pooled_connection::bb8::PooledConnection};
use pagination::PageRequest;
use tracing::debug;

use crate::domain::ports::{RecordSlice, ShipmentPersistenceError, ShipmentRepository};
use crate::domain::{
    Awb, DeliveryRecord, DeliveryStatus, DeliveryTally, PickupRecord, PickupTally, PurgeCounts,
    RecordFilter, RecordKind, SearchTerm, UpsertBatch, Username,
};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{DeliveryRow, PickupRow, RowConversionError};
use super::pool::{DbPool, PoolError, SqliteConn, fold_case};
use super::schema::{delivery, pickup};

/// Diesel-backed implementation of the `ShipmentRepository` port.
#[derive(Clone)]
pub struct DieselShipmentRepository {
    pool: DbPool,
}

impl DieselShipmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<PooledConnection<'_, SqliteConn>, ShipmentPersistenceError> {
        self.pool.get().await.map_err(map_pool_error)
    }
}

fn map_pool_error(error: PoolError) -> ShipmentPersistenceError {
    map_basic_pool_error(error, ShipmentPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ShipmentPersistenceError {
    map_basic_diesel_error(
        error,
        ShipmentPersistenceError::query,
        ShipmentPersistenceError::connection,
    )
}

fn map_insert_error(awb: &Awb) -> impl FnOnce(diesel::result::Error) -> ShipmentPersistenceError {
    move |error| {
        if is_unique_violation(&error) {
            ShipmentPersistenceError::duplicate(awb.as_ref())
        } else {
            map_diesel_error(error)
        }
    }
}

fn map_row_error(error: RowConversionError) -> ShipmentPersistenceError {
    ShipmentPersistenceError::query(error.to_string())
}

fn to_removed(value: usize) -> Result<u64, ShipmentPersistenceError> {
    u64::try_from(value).map_err(|err| ShipmentPersistenceError::query(err.to_string()))
}

fn to_count(value: i64) -> Result<u64, ShipmentPersistenceError> {
    u64::try_from(value).map_err(|err| ShipmentPersistenceError::query(err.to_string()))
}

fn page_bounds(page: PageRequest) -> Result<(i64, i64), ShipmentPersistenceError> {
    let offset = i64::try_from(page.offset())
        .map_err(|err| ShipmentPersistenceError::query(format!("page offset: {err}")))?;
    Ok((i64::from(page.limit()), offset))
}

/// Search pattern matched against `fold_case`d columns.
fn folded_pattern(term: &SearchTerm) -> String {
    term.like_pattern().to_lowercase()
}

fn stored_username(raw: &str) -> Result<Username, ShipmentPersistenceError> {
    Username::new(raw).map_err(|err| ShipmentPersistenceError::query(err.to_string()))
}

fn filtered_pickups(filter: &RecordFilter) -> pickup::BoxedQuery<'static, Sqlite> {
    let mut query = pickup::table.into_boxed();
    if let Some(date) = filter.date {
        query = query.filter(pickup::event_date.eq(date.to_string()));
    }
    if let Some(term) = &filter.search {
        let pattern = folded_pattern(term);
        query = query.filter(
            fold_case(pickup::awb.nullable())
                .like(pattern.clone())
                .escape('\\')
                .or(fold_case(pickup::submitted_by.nullable())
                    .like(pattern.clone())
                    .escape('\\'))
                .or(fold_case(pickup::recipient_name)
                    .like(pattern.clone())
                    .escape('\\'))
                .or(fold_case(pickup::address).like(pattern.clone()).escape('\\'))
                .or(fold_case(pickup::phone).like(pattern.clone()).escape('\\'))
                .or(fold_case(pickup::event_date).like(pattern).escape('\\')),
        );
    }
    query
}

fn filtered_deliveries(filter: &RecordFilter) -> delivery::BoxedQuery<'static, Sqlite> {
    let mut query = delivery::table.into_boxed();
    if let Some(date) = filter.date {
        query = query.filter(delivery::event_date.eq(date.to_string()));
    }
    if let Some(term) = &filter.search {
        let pattern = folded_pattern(term);
        query = query.filter(
            fold_case(delivery::awb.nullable())
                .like(pattern.clone())
                .escape('\\')
                .or(fold_case(delivery::submitted_by.nullable())
                    .like(pattern.clone())
                    .escape('\\'))
                .or(fold_case(delivery::status.nullable())
                    .like(pattern.clone())
                    .escape('\\'))
                .or(fold_case(delivery::event_date).like(pattern).escape('\\')),
        );
    }
    query
}

#[async_trait]
impl ShipmentRepository for DieselShipmentRepository {
    async fn upsert_batch(&self, batch: &UpsertBatch) -> Result<(), ShipmentPersistenceError> {
        let pickup_rows: Vec<PickupRow> = batch.pickups().iter().map(PickupRow::from).collect();
        let delivery_rows: Vec<DeliveryRow> =
            batch.deliveries().iter().map(DeliveryRow::from).collect();
        let mut conn = self.conn().await?;

        conn.transaction(|conn| {
            async move {
                for row in &pickup_rows {
                    diesel::insert_into(pickup::table)
                        .values(row)
                        .on_conflict(pickup::awb)
                        .do_update()
                        .set(row)
                        .execute(conn)
                        .await?;
                }
                for row in &delivery_rows {
                    diesel::insert_into(delivery::table)
                        .values(row)
                        .on_conflict(delivery::awb)
                        .do_update()
                        .set(row)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?;

        debug!(
            pickups = batch.pickups().len(),
            deliveries = batch.deliveries().len(),
            "upserted shipment batch"
        );
        Ok(())
    }

    async fn insert_pickup(&self, record: &PickupRecord) -> Result<(), ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        diesel::insert_into(pickup::table)
            .values(&PickupRow::from(record))
            .execute(&mut conn)
            .await
            .map_err(map_insert_error(&record.awb))?;
        Ok(())
    }

    async fn insert_delivery(
        &self,
        record: &DeliveryRecord,
    ) -> Result<(), ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        diesel::insert_into(delivery::table)
            .values(&DeliveryRow::from(record))
            .execute(&mut conn)
            .await
            .map_err(map_insert_error(&record.awb))?;
        Ok(())
    }

    async fn update_pickup(
        &self,
        record: &PickupRecord,
    ) -> Result<bool, ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        let row = PickupRow::from(record);
        let updated = diesel::update(pickup::table.filter(pickup::awb.eq(&row.awb)))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn update_delivery(
        &self,
        record: &DeliveryRecord,
    ) -> Result<bool, ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        let row = DeliveryRow::from(record);
        let updated = diesel::update(delivery::table.filter(delivery::awb.eq(&row.awb)))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, kind: RecordKind, awb: &Awb) -> Result<bool, ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        let removed = match kind {
            RecordKind::Pickup => {
                diesel::delete(pickup::table.filter(pickup::awb.eq(awb.as_ref())))
                    .execute(&mut conn)
                    .await
            }
            RecordKind::Delivery => {
                diesel::delete(delivery::table.filter(delivery::awb.eq(awb.as_ref())))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn purge(&self, awb: &Awb) -> Result<PurgeCounts, ShipmentPersistenceError> {
        let key = awb.to_string();
        let mut conn = self.conn().await?;

        let (pickup_removed, delivery_removed) = conn
            .transaction(|conn| {
                async move {
                    let pickups = diesel::delete(pickup::table.filter(pickup::awb.eq(&key)))
                        .execute(conn)
                        .await?;
                    let deliveries =
                        diesel::delete(delivery::table.filter(delivery::awb.eq(&key)))
                            .execute(conn)
                            .await?;
                    Ok::<_, diesel::result::Error>((pickups, deliveries))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(PurgeCounts {
            pickup_removed: to_removed(pickup_removed)?,
            delivery_removed: to_removed(delivery_removed)?,
        })
    }

    async fn list_pickups(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<RecordSlice<PickupRecord>, ShipmentPersistenceError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.conn().await?;
        let total: i64 = filtered_pickups(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<PickupRow> = filtered_pickups(filter)
            .order((pickup::event_date.desc(), pickup::awb.asc()))
            .limit(limit)
            .offset(offset)
            .select(PickupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let records = rows
            .into_iter()
            .map(|row| PickupRecord::try_from(row).map_err(map_row_error))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, to_count(total)?))
    }

    async fn list_deliveries(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<RecordSlice<DeliveryRecord>, ShipmentPersistenceError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.conn().await?;
        let total: i64 = filtered_deliveries(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<DeliveryRow> = filtered_deliveries(filter)
            .order((delivery::event_date.desc(), delivery::awb.asc()))
            .limit(limit)
            .offset(offset)
            .select(DeliveryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let records = rows
            .into_iter()
            .map(|row| DeliveryRecord::try_from(row).map_err(map_row_error))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, to_count(total)?))
    }

    async fn all_pickups(&self) -> Result<Vec<PickupRecord>, ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        let rows: Vec<PickupRow> = pickup::table
            .order((pickup::event_date.desc(), pickup::awb.asc()))
            .select(PickupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| PickupRecord::try_from(row).map_err(map_row_error))
            .collect()
    }

    async fn all_deliveries(&self) -> Result<Vec<DeliveryRecord>, ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        let rows: Vec<DeliveryRow> = delivery::table
            .order((delivery::event_date.desc(), delivery::awb.asc()))
            .select(DeliveryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| DeliveryRecord::try_from(row).map_err(map_row_error))
            .collect()
    }

    async fn pickup_tallies(&self) -> Result<Vec<PickupTally>, ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        let groups: Vec<(String, i64)> = pickup::table
            .group_by(pickup::submitted_by)
            .select((pickup::submitted_by, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        groups
            .into_iter()
            .map(|(submitted_by, count)| {
                Ok(PickupTally {
                    submitted_by: stored_username(&submitted_by)?,
                    count: to_count(count)?,
                })
            })
            .collect()
    }

    async fn delivery_tallies(&self) -> Result<Vec<DeliveryTally>, ShipmentPersistenceError> {
        let mut conn = self.conn().await?;
        let groups: Vec<(String, String, i64, Option<f64>)> = delivery::table
            .group_by((delivery::submitted_by, delivery::status))
            .select((
                delivery::submitted_by,
                delivery::status,
                count_star(),
                sum(delivery::cod_amount),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        groups
            .into_iter()
            .map(|(submitted_by, status, count, cod_sum)| {
                Ok(DeliveryTally {
                    submitted_by: stored_username(&submitted_by)?,
                    status: status
                        .parse::<DeliveryStatus>()
                        .map_err(|err| ShipmentPersistenceError::query(err.to_string()))?,
                    count: to_count(count)?,
                    cod_sum: cod_sum.unwrap_or_default(),
                })
            })
            .collect()
    }
}
