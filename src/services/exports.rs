use crate::{
    db::DbPool,
    entities::region,
    errors::ServiceError,
    events::{Event, EventSender},
    services::documents::{self, DocumentKind, GeneratedDocument},
    services::project_items::load_items,
    services::projects::find_project,
    services::surveys::find_survey,
    tracing::with_metrics,
};
use chrono::Local;
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Loads a project's data and renders one of the spreadsheet documents.
#[derive(Clone)]
pub struct ExportService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ExportService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self), fields(project_id = %project_id, kind = %kind))]
    pub async fn export(
        &self,
        project_id: Uuid,
        kind: DocumentKind,
    ) -> Result<GeneratedDocument, ServiceError> {
        let db = &*self.db_pool;
        let project = &find_project(db, project_id).await?;
        let today = Local::now().date_naive();

        let document = match kind {
            DocumentKind::Estimate => {
                let items = &load_items(db, project_id).await?;
                with_metrics("export_estimate", move || async move {
                    documents::generate_estimate(project, items, today)
                })
                .await?
            }
            DocumentKind::Survey => {
                let region_name = match project.region_id {
                    Some(region_id) => region::Entity::find_by_id(region_id)
                        .one(db)
                        .await
                        .map_err(|e| {
                            error!(error = %e, region_id, "Failed to fetch region for survey export");
                            ServiceError::DatabaseError(e)
                        })?
                        .map(|r| r.name),
                    None => None,
                };
                let survey = find_survey(db, project_id).await?;
                let (region_name, survey) = (region_name.as_deref(), survey.as_ref());
                with_metrics("export_survey", move || async move {
                    documents::generate_survey(project, region_name, survey, today)
                })
                .await?
            }
        };

        info!(
            project_id = %project_id,
            filename = %document.filename,
            bytes = document.bytes.len(),
            "Document generated"
        );
        if let Some(sender) = &self.event_sender {
            let event = Event::DocumentExported {
                project_id,
                kind: kind.to_string(),
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, project_id = %project_id, "Failed to send export event");
            }
        }

        Ok(document)
    }
}
