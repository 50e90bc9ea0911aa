use crate::alerting::types::{AlertEvent, DeliveryStatus};
use crate::utils::error::{AlertError, Result};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, alert_event};
use super::types::SeaOrmAlertStore;

impl SeaOrmAlertStore {
    pub(super) async fn insert_event_row(&self, event: &AlertEvent) -> Result<()> {
        debug!(
            "Recording alert event {} for rule {} ({})",
            event.id, event.rule_id, event.delivery_status
        );

        entities::AlertEvent::insert(alert_event::ActiveModel::from_domain(event)?)
            .exec(&self.db)
            .await
            .map_err(AlertError::Database)?;

        Ok(())
    }

    pub(super) async fn update_event_row_status(
        &self,
        event_id: &str,
        status: DeliveryStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        debug!("Updating alert event status: {} -> {}", event_id, status);

        let result = entities::AlertEvent::update_many()
            .col_expr(
                alert_event::Column::DeliveryStatus,
                Expr::value(status.as_str()),
            )
            .col_expr(
                alert_event::Column::ErrorMessage,
                Expr::value(error_message.map(str::to_string)),
            )
            .filter(alert_event::Column::Id.eq(event_id))
            .exec(&self.db)
            .await
            .map_err(AlertError::Database)?;

        if result.rows_affected == 0 {
            return Err(AlertError::not_found(format!(
                "Alert event {} not found",
                event_id
            )));
        }
        Ok(())
    }

    pub(super) async fn find_latest_delivered(
        &self,
        rule_id: &str,
        resource_id: &str,
    ) -> Result<Option<AlertEvent>> {
        let statuses: Vec<&str> = DeliveryStatus::COOLDOWN.iter().map(|s| s.as_str()).collect();

        entities::AlertEvent::find()
            .filter(alert_event::Column::RuleId.eq(rule_id))
            .filter(alert_event::Column::ResourceId.eq(resource_id))
            .filter(alert_event::Column::DeliveryStatus.is_in(statuses))
            .order_by_desc(alert_event::Column::Timestamp)
            .one(&self.db)
            .await
            .map_err(AlertError::Database)?
            .map(|model| model.to_domain())
            .transpose()
    }

    pub(super) async fn find_events(
        &self,
        rule_id: &str,
        resource_id: &str,
        limit: u64,
    ) -> Result<Vec<AlertEvent>> {
        let models = entities::AlertEvent::find()
            .filter(alert_event::Column::RuleId.eq(rule_id))
            .filter(alert_event::Column::ResourceId.eq(resource_id))
            .order_by_desc(alert_event::Column::Timestamp)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AlertError::Database)?;

        models.iter().map(|model| model.to_domain()).collect()
    }
}
