//! Request and response types for chat endpoints

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::MessageRow;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OutgoingMessage {
    #[validate(length(min = 1, message = "rid must not be empty"))]
    pub rid: String,
    #[validate(length(min = 1, max = 5000, message = "msg must be 1-5000 characters"))]
    pub msg: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(nested)]
    pub message: OutgoingMessage,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageRequest {
    #[validate(length(min = 1, message = "roomId must not be empty"))]
    pub room_id: String,
    #[validate(length(min = 1, message = "msgId must not be empty"))]
    pub msg_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub rid: String,
    pub msg: String,
    /// Author user id
    pub u: String,
    pub ts: i64,
}

impl From<MessageRow> for MessageDto {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            rid: row.room_id,
            msg: row.text,
            u: row.user_id,
            ts: row.ts,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: MessageDto,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMessageResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub ts: i64,
}
