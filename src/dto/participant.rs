use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{ParticipantEntity, ParticipantStatus},
    dto::{format_system_time, validation::validate_chesscom_username},
};

/// Public registration form.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterParticipantRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 2, max = 37))]
    pub discord_username: String,
    #[validate(custom(function = "validate_chesscom_username"))]
    pub chesscom_username: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantSummary {
    pub id: Uuid,
    pub name: String,
    pub discord_username: String,
    pub chesscom_username: String,
    pub status: ParticipantStatus,
    pub created_at: String,
}

impl From<&ParticipantEntity> for ParticipantSummary {
    fn from(value: &ParticipantEntity) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            discord_username: value.discord_username.clone(),
            chesscom_username: value.chesscom_username.clone(),
            status: value.status,
            created_at: format_system_time(value.created_at),
        }
    }
}
