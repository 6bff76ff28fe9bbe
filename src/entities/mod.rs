pub mod master_item;
pub mod municipality;
pub mod project;
pub mod project_item;
pub mod project_survey;
pub mod region;

pub use project::ProjectStatus;
