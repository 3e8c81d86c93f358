//! PostgreSQL-backed `VtcRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{VtcPersistenceError, VtcRepository};
use crate::domain::{
    MemberStatus, Membership, NewVtc, UserId, VtcDetail, VtcId, VtcMember, VtcRole, VtcSummary,
};

use super::diesel_helpers::{collect_rows, map_diesel_error, map_pool_error, unique_violation};
use super::models::{NewVtcMemberRow, NewVtcRow, VtcMemberRow, VtcRow, shown_name};
use super::pool::{DbPool, PoolError};
use super::schema::{users, vtc_members, vtcs};

const ACTIVE: &str = "active";

/// Diesel-backed implementation of the VTC repository port.
#[derive(Clone)]
pub struct DieselVtcRepository {
    pool: DbPool,
}

impl DieselVtcRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> VtcPersistenceError {
    map_pool_error(error, VtcPersistenceError::connection)
}

fn diesel_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> VtcPersistenceError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            VtcPersistenceError::query,
            VtcPersistenceError::connection,
        )
    }
}

type OwnedVtcRow = (VtcRow, String, Option<String>);

fn summary_from(
    (vtc, owner_username, owner_display_name): OwnedVtcRow,
    counts: &HashMap<i64, i64>,
) -> Result<VtcSummary, String> {
    let member_count = counts.get(&vtc.id).copied().unwrap_or_default();
    vtc.into_summary(shown_name(owner_username, owner_display_name), member_count)
}

fn member_from(
    (row, username, display_name): (VtcMemberRow, String, Option<String>),
) -> Result<VtcMember, String> {
    let role = row.role()?;
    let user_id =
        UserId::new(row.user_id).map_err(|err| format!("member {}: {err}", row.user_id))?;
    Ok(VtcMember {
        user_id,
        name: shown_name(username, display_name),
        role,
        joined_at: row.joined_at,
    })
}

fn membership_from(role: &str, status: &str) -> Result<Membership, String> {
    let role: VtcRole = role.parse().map_err(|err| format!("membership role: {err}"))?;
    let status: MemberStatus = status
        .parse()
        .map_err(|err| format!("membership status: {err}"))?;
    Ok(Membership { role, status })
}

impl DieselVtcRepository {
    async fn active_member_counts(
        conn: &mut diesel_async::AsyncPgConnection,
        ids: &[i64],
    ) -> Result<HashMap<i64, i64>, diesel::result::Error> {
        let rows: Vec<(i64, i64)> = vtc_members::table
            .filter(vtc_members::vtc_id.eq_any(ids))
            .filter(vtc_members::status.eq(ACTIVE))
            .group_by(vtc_members::vtc_id)
            .select((vtc_members::vtc_id, count_star()))
            .load(conn)
            .await?;
        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl VtcRepository for DieselVtcRepository {
    async fn create(
        &self,
        vtc: &NewVtc,
        created_at: DateTime<Utc>,
    ) -> Result<VtcId, VtcPersistenceError> {
        let tag = vtc.tag.as_str().to_owned();
        let owner = vtc.owner.as_i64();
        let row = NewVtcRow {
            name: &vtc.name,
            tag: vtc.tag.as_str(),
            description: vtc.description.as_deref(),
            owner_user_id: owner,
            status: ACTIVE,
            created_at,
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let id = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(vtcs::table)
                        .values(&row)
                        .returning(vtcs::id)
                        .get_result(conn)
                        .await?;
                    diesel::insert_into(vtc_members::table)
                        .values(&NewVtcMemberRow {
                            vtc_id: id,
                            user_id: owner,
                            role: VtcRole::Owner.as_str(),
                            status: MemberStatus::Active.as_str(),
                            joined_at: created_at,
                        })
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(|error| {
                if unique_violation(&error).is_some() {
                    VtcPersistenceError::duplicate_tag(tag)
                } else {
                    diesel_error("create vtc")(error)
                }
            })?;
        VtcId::new(id).map_err(|err| VtcPersistenceError::query(format!("vtc {id}: {err}")))
    }

    async fn list_active(&self) -> Result<Vec<VtcSummary>, VtcPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<OwnedVtcRow> = vtcs::table
            .inner_join(users::table.on(users::id.eq(vtcs::owner_user_id)))
            .filter(vtcs::status.eq(ACTIVE))
            .order((vtcs::created_at.desc(), vtcs::id.desc()))
            .select((VtcRow::as_select(), users::username, users::display_name))
            .load(&mut conn)
            .await
            .map_err(diesel_error("list vtcs"))?;

        let ids: Vec<i64> = rows.iter().map(|(vtc, _, _)| vtc.id).collect();
        let counts = Self::active_member_counts(&mut conn, &ids)
            .await
            .map_err(diesel_error("count vtc members"))?;
        collect_rows(
            rows.into_iter().map(|row| summary_from(row, &counts)),
            VtcPersistenceError::query,
        )
    }

    async fn find_detail(&self, id: VtcId) -> Result<Option<VtcDetail>, VtcPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<OwnedVtcRow> = vtcs::table
            .inner_join(users::table.on(users::id.eq(vtcs::owner_user_id)))
            .filter(vtcs::id.eq(id.as_i64()))
            .filter(vtcs::status.eq(ACTIVE))
            .select((VtcRow::as_select(), users::username, users::display_name))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find vtc"))?;
        let Some(row) = row else {
            return Ok(None);
        };

        let members: Vec<(VtcMemberRow, String, Option<String>)> = vtc_members::table
            .inner_join(users::table)
            .filter(vtc_members::vtc_id.eq(id.as_i64()))
            .filter(vtc_members::status.eq(ACTIVE))
            .order((vtc_members::joined_at.asc(), vtc_members::user_id.asc()))
            .select((VtcMemberRow::as_select(), users::username, users::display_name))
            .load(&mut conn)
            .await
            .map_err(diesel_error("list vtc members"))?;

        let counts = HashMap::from([(id.as_i64(), i64::try_from(members.len()).unwrap_or(i64::MAX))]);
        let vtc = summary_from(row, &counts).map_err(VtcPersistenceError::query)?;
        let members = collect_rows(members.into_iter().map(member_from), VtcPersistenceError::query)?;
        Ok(Some(VtcDetail { vtc, members }))
    }

    async fn membership(
        &self,
        vtc_id: VtcId,
        user_id: UserId,
    ) -> Result<Option<Membership>, VtcPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<(String, String)> = vtc_members::table
            .find((vtc_id.as_i64(), user_id.as_i64()))
            .select((vtc_members::role, vtc_members::status))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find membership"))?;
        row.map(|(role, status)| membership_from(&role, &status))
            .transpose()
            .map_err(VtcPersistenceError::query)
    }

    async fn join(
        &self,
        vtc_id: VtcId,
        user_id: UserId,
        joined_at: DateTime<Utc>,
    ) -> Result<(), VtcPersistenceError> {
        let row = NewVtcMemberRow {
            vtc_id: vtc_id.as_i64(),
            user_id: user_id.as_i64(),
            role: VtcRole::Member.as_str(),
            status: MemberStatus::Active.as_str(),
            joined_at,
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(vtc_members::table)
            .values(&row)
            .on_conflict((vtc_members::vtc_id, vtc_members::user_id))
            .do_update()
            .set((
                vtc_members::role.eq(VtcRole::Member.as_str()),
                vtc_members::status.eq(MemberStatus::Active.as_str()),
                vtc_members::joined_at.eq(joined_at),
                vtc_members::left_at.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error("join vtc"))
    }

    async fn leave(
        &self,
        vtc_id: VtcId,
        user_id: UserId,
        left_at: DateTime<Utc>,
    ) -> Result<(), VtcPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(vtc_members::table.find((vtc_id.as_i64(), user_id.as_i64())))
            .set((
                vtc_members::status.eq(MemberStatus::Inactive.as_str()),
                vtc_members::left_at.eq(Some(left_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error("leave vtc"))
    }
}
