use crate::{
    db::DbPool,
    entities::{project, ProjectStatus},
    errors::ServiceError,
    services::projects::ProjectResponse,
};
use sea_orm::{ColumnTrait, EntityTrait, FromQueryResult, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

pub const RECENT_PROJECTS: u64 = 5;

/// One counter per status, zero when no project has it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub draft: u64,
    pub investigating: u64,
    pub estimated: u64,
    pub completed: u64,
}

impl StatusCounts {
    fn slot(&mut self, status: ProjectStatus) -> &mut u64 {
        match status {
            ProjectStatus::Draft => &mut self.draft,
            ProjectStatus::Investigating => &mut self.investigating,
            ProjectStatus::Estimated => &mut self.estimated,
            ProjectStatus::Completed => &mut self.completed,
        }
    }

    pub fn total(&self) -> u64 {
        self.draft + self.investigating + self.estimated + self.completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total: u64,
    pub status_counts: StatusCounts,
    pub recent_projects: Vec<ProjectResponse>,
}

#[derive(Debug, FromQueryResult)]
struct StatusRow {
    status: ProjectStatus,
    count: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let db = &*self.db_pool;

        let rows = project::Entity::find()
            .select_only()
            .column(project::Column::Status)
            .column_as(project::Column::Id.count(), "count")
            .group_by(project::Column::Status)
            .into_model::<StatusRow>()
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to count projects by status");
                ServiceError::DatabaseError(e)
            })?;

        let mut status_counts = StatusCounts::default();
        for row in rows {
            *status_counts.slot(row.status) = u64::try_from(row.count).unwrap_or(0);
        }

        let recent = project::Entity::find()
            .order_by_desc(project::Column::CreatedAt)
            .limit(RECENT_PROJECTS)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch recent projects");
                ServiceError::DatabaseError(e)
            })?;

        Ok(DashboardStats {
            total: status_counts.total(),
            status_counts,
            recent_projects: recent.into_iter().map(ProjectResponse::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_default_to_zero_for_every_status() {
        let mut counts = StatusCounts::default();
        *counts.slot(ProjectStatus::Estimated) = 3;
        *counts.slot(ProjectStatus::Draft) = 2;
        assert_eq!(counts.total(), 5);

        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["investigating"], 0);
        assert_eq!(json["completed"], 0);
        assert_eq!(json["estimated"], 3);
    }
}
