use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};

use crate::entities::users;

/// Quota record as seen outside the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub request_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            user_id: model.user_id,
            request_count: model.request_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_user_id(&self, user_id: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query user by user_id")?;

        Ok(user.map(User::from))
    }

    /// Inserts a user whose first request is being recorded.
    ///
    /// Returns `false` when another writer created the same `user_id` first.
    pub async fn create_with_first_request(&self, user_id: &str) -> Result<bool> {
        let now = crate::db::timestamp(chrono::Utc::now());

        let active_model = users::ActiveModel {
            user_id: Set(user_id.to_string()),
            request_count: Set(1),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match users::Entity::insert(active_model).exec(&self.conn).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to create user")),
        }
    }

    /// Increments the counter only while it is below `limit`.
    ///
    /// The comparison and the write happen in one statement, so two racing
    /// requests can never push the counter past the limit. Returns whether a
    /// row was updated.
    pub async fn increment_below(&self, user_id: &str, limit: i32) -> Result<bool> {
        let now = crate::db::timestamp(chrono::Utc::now());

        let result = users::Entity::update_many()
            .col_expr(
                users::Column::RequestCount,
                Expr::col(users::Column::RequestCount).add(1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::UserId.eq(user_id))
            .filter(users::Column::RequestCount.lt(limit))
            .exec(&self.conn)
            .await
            .context("Failed to increment request count")?;

        Ok(result.rows_affected > 0)
    }
}
