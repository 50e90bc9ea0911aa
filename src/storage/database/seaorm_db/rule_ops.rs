use crate::alerting::types::{AlertRule, ResourceType, RuleBinding};
use crate::utils::error::{AlertError, Result};
use sea_orm::*;
use tracing::{debug, warn};

use super::super::entities::{self, alert_rule};
use super::types::SeaOrmAlertStore;

impl SeaOrmAlertStore {
    pub(super) async fn insert_rule_row(&self, rule: &AlertRule) -> Result<()> {
        debug!("Creating alert rule: {}", rule.id);

        entities::AlertRule::insert(alert_rule::ActiveModel::from_domain(rule)?)
            .exec(&self.db)
            .await
            .map_err(AlertError::Database)?;

        Ok(())
    }

    pub(super) async fn update_rule_row(&self, rule: &AlertRule) -> Result<()> {
        debug!("Updating alert rule: {}", rule.id);

        match entities::AlertRule::update(alert_rule::ActiveModel::from_domain(rule)?)
            .exec(&self.db)
            .await
        {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => {
                Err(AlertError::not_found(format!("Rule {} not found", rule.id)))
            }
            Err(e) => Err(AlertError::Database(e)),
        }
    }

    pub(super) async fn delete_rule_row(&self, rule_id: &str) -> Result<()> {
        debug!("Deleting alert rule: {}", rule_id);

        let result = entities::AlertRule::delete_by_id(rule_id)
            .exec(&self.db)
            .await
            .map_err(AlertError::Database)?;

        if result.rows_affected == 0 {
            return Err(AlertError::not_found(format!("Rule {} not found", rule_id)));
        }
        Ok(())
    }

    pub(super) async fn find_rule_by_id(&self, rule_id: &str) -> Result<Option<AlertRule>> {
        entities::AlertRule::find_by_id(rule_id)
            .one(&self.db)
            .await
            .map_err(AlertError::Database)?
            .map(|model| model.to_domain())
            .transpose()
    }

    pub(super) async fn find_rules_by_binding(&self, binding: &RuleBinding) -> Result<Vec<AlertRule>> {
        let condition = match binding {
            RuleBinding::Owner { owner_id } => Condition::all()
                .add(alert_rule::Column::BindingKind.eq(alert_rule::BINDING_OWNER))
                .add(alert_rule::Column::OwnerId.eq(owner_id.as_str())),
            RuleBinding::Resource { resource_id } => Condition::all()
                .add(alert_rule::Column::BindingKind.eq(alert_rule::BINDING_RESOURCE))
                .add(alert_rule::Column::ResourceId.eq(resource_id.as_str())),
        };

        let models = entities::AlertRule::find()
            .filter(condition)
            .order_by_asc(alert_rule::Column::CreatedAt)
            .order_by_asc(alert_rule::Column::Id)
            .all(&self.db)
            .await
            .map_err(AlertError::Database)?;

        models.iter().map(|model| model.to_domain()).collect()
    }

    pub(super) async fn find_candidates(
        &self,
        resource_id: &str,
        owner_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<AlertRule>> {
        let bound_to_resource = Condition::all()
            .add(alert_rule::Column::BindingKind.eq(alert_rule::BINDING_RESOURCE))
            .add(alert_rule::Column::ResourceId.eq(resource_id));
        let bound_to_owner = Condition::all()
            .add(alert_rule::Column::BindingKind.eq(alert_rule::BINDING_OWNER))
            .add(alert_rule::Column::OwnerId.eq(owner_id))
            .add(alert_rule::Column::ResourceType.eq(resource_type.as_str()));

        let models = entities::AlertRule::find()
            .filter(alert_rule::Column::Enabled.eq(true))
            .filter(Condition::any().add(bound_to_resource).add(bound_to_owner))
            .order_by_asc(alert_rule::Column::CreatedAt)
            .order_by_asc(alert_rule::Column::Id)
            .all(&self.db)
            .await
            .map_err(AlertError::Database)?;

        // A corrupt row must not hide the other candidates
        let mut rules = Vec::with_capacity(models.len());
        for model in models {
            match model.to_domain() {
                Ok(rule) => rules.push(rule),
                Err(e) => warn!(rule_id = %model.id, error = %e, "Skipping unreadable alert rule"),
            }
        }
        Ok(rules)
    }
}
