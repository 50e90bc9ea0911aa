use crate::alerting::types::{self, RuleBinding};
use crate::utils::error::{AlertError, Result as AlertResult};
use chrono::Utc;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Binding kind column values
pub const BINDING_OWNER: &str = "owner";
pub const BINDING_RESOURCE: &str = "resource";

/// Alert rule database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    /// "owner" or "resource"
    pub binding_kind: String,

    /// Set for owner-level rules
    pub owner_id: Option<String>,

    /// Set for resource-level rules
    pub resource_id: Option<String>,

    pub resource_type: String,

    pub trigger_type: String,

    /// Trigger conditions (JSON)
    pub conditions: String,

    pub severity: String,

    pub delivery_mode: String,

    pub cooldown_seconds: i64,

    /// Recipient email addresses (JSON array)
    pub recipients: String,

    pub enabled: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

/// Alert rule entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert a stored row into the domain rule
    pub fn to_domain(&self) -> AlertResult<types::AlertRule> {
        let binding = match (self.binding_kind.as_str(), &self.owner_id, &self.resource_id) {
            (BINDING_OWNER, Some(owner_id), _) => RuleBinding::owner(owner_id.clone()),
            (BINDING_RESOURCE, _, Some(resource_id)) => RuleBinding::resource(resource_id.clone()),
            (kind, _, _) => {
                return Err(AlertError::persistence(format!(
                    "Rule {} has an invalid binding '{}'",
                    self.id, kind
                )));
            }
        };

        Ok(types::AlertRule {
            id: self.id.clone(),
            name: self.name.clone(),
            binding,
            resource_type: self.resource_type.parse()?,
            trigger_type: self.trigger_type.parse()?,
            conditions: serde_json::from_str(&self.conditions)?,
            severity: self.severity.parse()?,
            delivery_mode: self.delivery_mode.parse()?,
            cooldown_seconds: self.cooldown_seconds.max(0) as u64,
            recipients: serde_json::from_str(&self.recipients)?,
            enabled: self.enabled,
            created_at: self.created_at.with_timezone(&Utc),
            updated_at: self.updated_at.with_timezone(&Utc),
        })
    }
}

impl ActiveModel {
    /// Build a fully populated active model from a domain rule
    pub fn from_domain(rule: &types::AlertRule) -> AlertResult<Self> {
        let (binding_kind, owner_id, resource_id) = match &rule.binding {
            RuleBinding::Owner { owner_id } => (BINDING_OWNER, Some(owner_id.clone()), None),
            RuleBinding::Resource { resource_id } => {
                (BINDING_RESOURCE, None, Some(resource_id.clone()))
            }
        };

        Ok(Self {
            id: Set(rule.id.clone()),
            name: Set(rule.name.clone()),
            binding_kind: Set(binding_kind.to_string()),
            owner_id: Set(owner_id),
            resource_id: Set(resource_id),
            resource_type: Set(rule.resource_type.as_str().to_string()),
            trigger_type: Set(rule.trigger_type.as_str().to_string()),
            conditions: Set(serde_json::to_string(&rule.conditions)?),
            severity: Set(rule.severity.as_str().to_string()),
            delivery_mode: Set(rule.delivery_mode.as_str().to_string()),
            cooldown_seconds: Set(rule.cooldown_seconds.min(i64::MAX as u64) as i64),
            recipients: Set(serde_json::to_string(&rule.recipients)?),
            enabled: Set(rule.enabled),
            created_at: Set(rule.created_at.into()),
            updated_at: Set(rule.updated_at.into()),
        })
    }
}
