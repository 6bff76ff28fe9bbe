use crate::{
    db::DbPool,
    events::EventSender,
    services::{
        catalog::CatalogService, dashboard::DashboardService, exports::ExportService,
        project_items::ProjectItemService, projects::ProjectService, surveys::SurveyService,
    },
};
use std::sync::Arc;

pub mod catalog;
pub mod common;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod items;
pub mod projects;
pub mod surveys;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub projects: Arc<ProjectService>,
    pub surveys: Arc<SurveyService>,
    pub items: Arc<ProjectItemService>,
    pub exports: Arc<ExportService>,
    pub catalog: Arc<CatalogService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            projects: Arc::new(ProjectService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            surveys: Arc::new(SurveyService::new(db_pool.clone(), event_sender.clone())),
            items: Arc::new(ProjectItemService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            exports: Arc::new(ExportService::new(db_pool.clone(), event_sender)),
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            dashboard: Arc::new(DashboardService::new(db_pool)),
        }
    }
}
