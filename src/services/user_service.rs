use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 按身份提供方 subject 查找用户, 首次出现时创建
    pub async fn ensure_user(&self, external_id: &str) -> AppResult<users::Model> {
        let external_id = external_id.trim();
        if external_id.is_empty() || external_id.chars().count() > 255 {
            return Err(AppError::ValidationError("Invalid userId".to_string()));
        }

        if let Some(user) = self.find_by_external_id(external_id).await? {
            return Ok(user);
        }

        let now = Utc::now();
        let inserted = users::ActiveModel {
            external_id: Set(external_id.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        match inserted {
            Ok(user) => {
                log::info!("Registered user {} for subject {external_id}", user.id);
                Ok(user)
            }
            // 并发请求可能已经插入同一 subject
            Err(e) => self
                .find_by_external_id(external_id)
                .await?
                .ok_or(AppError::DatabaseError(e)),
        }
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        if request.email.is_none() && request.display_name.is_none() {
            return Err(AppError::ValidationError(
                "No fields provided for update".to_string(),
            ));
        }
        if let Some(email) = &request.email
            && !email.contains('@')
        {
            return Err(AppError::ValidationError("Invalid email".to_string()));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut am = user.into_active_model();
        if let Some(email) = request.email {
            am.email = Set(Some(email.trim().to_string()));
        }
        if let Some(name) = request.display_name {
            am.display_name = Set(Some(name.trim().to_string()));
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        Ok(updated.into())
    }

    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::ExternalId.eq(external_id))
            .one(&self.pool)
            .await?)
    }
}
