//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{
    AccountStatus, ApiToken, Email, NewLocalUser, NewSteamUser, ProfileUpdate, SteamId, User,
    UserId,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{NewUserRow, ProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{jobs, users};

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use mytrucktracker::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/tracker")).await?;
    /// let repository = DieselUserRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> UserPersistenceError {
    move |error| {
        if let Some(constraint) = unique_violation(&error) {
            return UserPersistenceError::duplicate(constraint.to_owned());
        }
        map_diesel_error(
            error,
            operation,
            UserPersistenceError::query,
            UserPersistenceError::connection,
        )
    }
}

fn to_domain(row: UserRow) -> Result<User, UserPersistenceError> {
    row.into_domain().map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .find(id.as_i64())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find user by id"))?;
        row.map(to_domain).transpose()
    }

    async fn find_by_steam_id(
        &self,
        steam_id: &SteamId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .filter(users::steam_id.eq(steam_id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find user by steam id"))?;
        row.map(to_domain).transpose()
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<(UserRow, Option<String>)> = users::table
            .filter(users::email.eq(email.as_str()))
            .select((UserRow::as_select(), users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find credentials"))?;
        row.map(|(user, password_hash)| {
            Ok(StoredCredentials {
                user: to_domain(user)?,
                password_hash,
            })
        })
        .transpose()
    }

    async fn find_by_api_token(
        &self,
        steam_id: &SteamId,
        token: &ApiToken,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .filter(users::steam_id.eq(steam_id.as_str()))
            .filter(users::auth_token.eq(token.expose()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find user by api token"))?;
        row.map(to_domain).transpose()
    }

    async fn count(&self) -> Result<i64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("count users"))
    }

    async fn create_steam_user(&self, user: &NewSteamUser) -> Result<User, UserPersistenceError> {
        let row = NewUserRow {
            username: &user.profile.username,
            display_name: Some(&user.profile.username),
            steam_id: Some(user.steam_id.as_str()),
            email: None,
            password_hash: None,
            avatar_url: &user.profile.avatar_url,
            is_admin: user.is_admin,
            account_status: AccountStatus::Active.as_str(),
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let created = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("create steam user"))?;
        to_domain(created)
    }

    async fn create_local_user(&self, user: &NewLocalUser) -> Result<User, UserPersistenceError> {
        let row = NewUserRow {
            username: &user.username,
            display_name: Some(&user.username),
            steam_id: None,
            email: Some(user.email.as_str()),
            password_hash: Some(&user.password_hash),
            avatar_url: crate::domain::DEFAULT_AVATAR_URL,
            is_admin: user.is_admin,
            account_status: AccountStatus::Active.as_str(),
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let created = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error("create local user"))?;
        to_domain(created)
    }

    async fn refresh_avatar(
        &self,
        id: UserId,
        avatar_url: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(id.as_i64()))
            .set((
                users::avatar_url.eq(avatar_url),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error("refresh avatar"))
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), UserPersistenceError> {
        let changeset = ProfileChangeset {
            display_name: update.display_name.as_deref(),
            bio: update.bio.as_deref(),
            wot_text: update.wot_text.as_deref(),
            truckersmp_text: update.truckersmp_text.as_deref(),
            updated_at: chrono::Utc::now(),
        };
        // A missing token keeps the one already issued.
        let token = update.auth_token.as_ref().map(ApiToken::expose);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::update(users::table.find(id.as_i64()))
                    .set(&changeset)
                    .execute(conn)
                    .await?;
                if let Some(token) = token {
                    diesel::update(users::table.find(id.as_i64()))
                        .set(users::auth_token.eq(token))
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error("update profile"))
    }

    async fn set_account_status(
        &self,
        id: UserId,
        status: AccountStatus,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(id.as_i64()))
            .set((
                users::account_status.eq(status.as_str()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error("set account status"))
    }

    async fn delete_with_jobs(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        conn.transaction(|conn| {
            async move {
                let steam_id: Option<Option<String>> = users::table
                    .find(id.as_i64())
                    .select(users::steam_id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if let Some(Some(steam_id)) = steam_id {
                    diesel::delete(jobs::table.filter(jobs::driver_steam_id.eq(steam_id)))
                        .execute(conn)
                        .await?;
                }
                diesel::delete(jobs::table.filter(jobs::user_id.eq(id.as_i64())))
                    .execute(conn)
                    .await?;
                diesel::delete(users::table.find(id.as_i64()))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error("delete user"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for user repository error mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let mapped = pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(mapped, UserPersistenceError::Connection { .. }));
        assert!(mapped.to_string().contains("connection refused"));
    }

    #[rstest]
    fn missing_rows_map_to_query() {
        let mapped = diesel_error("find user by id")(diesel::result::Error::NotFound);
        assert_eq!(
            mapped,
            UserPersistenceError::query("find user by id: record not found")
        );
    }

    #[rstest]
    fn rows_with_unknown_status_are_rejected() {
        let row = UserRow {
            id: 3,
            username: "driver".to_owned(),
            display_name: None,
            steam_id: None,
            email: None,
            avatar_url: crate::domain::DEFAULT_AVATAR_URL.to_owned(),
            bio: None,
            wot_text: None,
            truckersmp_text: None,
            is_admin: false,
            account_status: "banned".to_owned(),
            created_at: chrono::Utc::now(),
        };
        assert!(matches!(to_domain(row), Err(UserPersistenceError::Query { .. })));
    }
}
