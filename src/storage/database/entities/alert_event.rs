use crate::alerting::types;
use crate::utils::error::Result as AlertResult;
use chrono::Utc;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Alert audit row database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub rule_id: String,

    /// Concrete resource that triggered the rule
    pub resource_id: String,

    /// Time of the triggering event
    pub timestamp: DateTimeWithTimeZone,

    /// Serialized event (JSON)
    pub payload: String,

    pub delivery_status: String,

    pub channel_type: String,

    pub error_message: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

/// Alert event entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> AlertResult<types::AlertEvent> {
        Ok(types::AlertEvent {
            id: self.id.clone(),
            rule_id: self.rule_id.clone(),
            resource_id: self.resource_id.clone(),
            timestamp: self.timestamp.with_timezone(&Utc),
            payload: serde_json::from_str(&self.payload)?,
            delivery_status: self.delivery_status.parse()?,
            channel_type: self.channel_type.parse()?,
            error_message: self.error_message.clone(),
            created_at: self.created_at.with_timezone(&Utc),
        })
    }
}

impl ActiveModel {
    pub fn from_domain(event: &types::AlertEvent) -> AlertResult<Self> {
        Ok(Self {
            id: Set(event.id.clone()),
            rule_id: Set(event.rule_id.clone()),
            resource_id: Set(event.resource_id.clone()),
            timestamp: Set(event.timestamp.into()),
            payload: Set(serde_json::to_string(&event.payload)?),
            delivery_status: Set(event.delivery_status.as_str().to_string()),
            channel_type: Set(event.channel_type.as_str().to_string()),
            error_message: Set(event.error_message.clone()),
            created_at: Set(event.created_at.into()),
        })
    }
}
