use crate::entities::user_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    /// 身份提供方 subject
    pub external_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "me@example.com")]
    pub email: Option<String>,
    #[schema(example = "Alex")]
    pub display_name: Option<String>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(u: user_entity::Model) -> Self {
        Self {
            id: u.id,
            external_id: u.external_id,
            email: u.email,
            display_name: u.display_name,
            created_at: u.created_at,
        }
    }
}
