use crate::{
    db::DbPool,
    entities::project_survey,
    errors::ServiceError,
    events::{Event, EventSender},
    services::projects::find_project,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, EntityTrait, Iterable, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Declares the questionnaire payload once and derives the copy in both
/// directions between it and the stored row.
macro_rules! survey_fields {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// Every questionnaire answer. All optional; absent answers are stored as NULL.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
        pub struct SurveyFields {
            $(
                #[serde(default)]
                pub $field: Option<$ty>,
            )*
        }

        impl SurveyFields {
            fn apply(self, active: &mut project_survey::ActiveModel) {
                $(active.$field = Set(self.$field);)*
            }
        }

        impl From<&project_survey::Model> for SurveyFields {
            fn from(model: &project_survey::Model) -> Self {
                Self {
                    $($field: model.$field.clone(),)*
                }
            }
        }
    };
}

survey_fields! {
    district_plan: String,
    district_plan_notes: String,
    building_agreement: String,
    building_agreement_notes: String,
    landscape: String,
    landscape_notes: String,
    buried_cultural: String,
    buried_cultural_notes: String,
    road1_type: String,
    road1_side: String,
    road1_name: String,
    road1_character: String,
    road1_width: Decimal,
    road1_demarcation: String,
    road2_type: String,
    road2_side: String,
    road2_name: String,
    road2_character: String,
    road2_width: Decimal,
    road2_demarcation: String,
    road3_type: String,
    road3_side: String,
    road3_name: String,
    road3_character: String,
    road3_width: Decimal,
    road3_demarcation: String,
    public_sewerage: String,
    sewerage_ledger: bool,
    sewerage_notes: String,
    water_supply: String,
    water_ledger: bool,
    water_notes: String,
    gas: String,
    gas_notes: String,
    scenic_district: String,
    scenic_notes: String,
    wall_setback_road: String,
    wall_setback_adjacent: String,
    retaining_wall_regulation: String,
    retaining_wall_notes: String,
    sediment_control: String,
    sediment_notes: String,
    river_conservation: String,
    river_width: Decimal,
    river_notes: String,
    landslide: String,
    steep_slope: String,
    disaster_warning: String,
    fire_department: String,
    intermediate_inspection: String,
    highrise_related: String,
    development_guidelines: String,
    city_planning_facility: String,
    extra_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SurveyResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    #[serde(flatten)]
    pub fields: SurveyFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<project_survey::Model> for SurveyResponse {
    fn from(model: project_survey::Model) -> Self {
        Self {
            fields: SurveyFields::from(&model),
            id: model.id,
            project_id: model.project_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedSurvey {
    pub survey: SurveyResponse,
    /// `true` when this save created the row
    pub created: bool,
}

pub async fn find_survey<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
) -> Result<Option<project_survey::Model>, ServiceError> {
    project_survey::Entity::find()
        .filter(project_survey::Column::ProjectId.eq(project_id))
        .one(db)
        .await
        .map_err(|e| {
            error!(error = %e, project_id = %project_id, "Failed to fetch survey");
            ServiceError::DatabaseError(e)
        })
}

/// Columns overwritten when a project already has a survey.
fn replaced_columns() -> impl Iterator<Item = project_survey::Column> {
    project_survey::Column::iter().filter(|column| {
        !matches!(
            column,
            project_survey::Column::Id
                | project_survey::Column::ProjectId
                | project_survey::Column::CreatedAt
        )
    })
}

#[derive(Clone)]
pub struct SurveyService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl SurveyService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// `None` when the project has no survey yet.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn get_survey(&self, project_id: Uuid) -> Result<Option<SurveyResponse>, ServiceError> {
        let db = &*self.db_pool;
        find_project(db, project_id).await?;
        Ok(find_survey(db, project_id).await?.map(SurveyResponse::from))
    }

    /// Replaces the project's questionnaire with `fields`, creating it on
    /// first save. A single upsert keyed by `project_id`.
    #[instrument(skip(self, fields), fields(project_id = %project_id))]
    pub async fn save_survey(
        &self,
        project_id: Uuid,
        fields: SurveyFields,
    ) -> Result<SavedSurvey, ServiceError> {
        let db = &*self.db_pool;
        find_project(db, project_id).await?;

        let now = Utc::now();
        let survey_id = Uuid::new_v4();
        let mut active = project_survey::ActiveModel {
            id: Set(survey_id),
            project_id: Set(project_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        fields.apply(&mut active);

        let survey = project_survey::Entity::insert(active)
            .on_conflict(
                OnConflict::column(project_survey::Column::ProjectId)
                    .update_columns(replaced_columns())
                    .to_owned(),
            )
            .exec_with_returning(db)
            .await
            .map_err(|e| {
                error!(error = %e, project_id = %project_id, "Failed to upsert survey");
                ServiceError::DatabaseError(e)
            })?;
        // the id column is never overwritten, so only the inserting save sees its own id
        let created = survey.id == survey_id;

        info!(project_id = %project_id, created, "Survey saved");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::SurveySaved { project_id, created }).await {
                warn!(error = %e, project_id = %project_id, "Failed to send survey saved event");
            }
        }

        Ok(SavedSurvey {
            survey: survey.into(),
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::documents::fixtures::survey;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn absent_answers_deserialize_as_none() {
        let fields: SurveyFields =
            serde_json::from_value(json!({"district_plan": "なし", "road1_width": "4.5"}))
                .unwrap();
        assert_eq!(fields.district_plan.as_deref(), Some("なし"));
        assert_eq!(fields.road1_width, Some(dec!(4.5)));
        assert_eq!(fields.gas, None);
        assert_eq!(fields.sewerage_ledger, None);
    }

    #[test]
    fn apply_overwrites_every_answer() {
        let mut active = project_survey::ActiveModel::default();
        SurveyFields {
            water_ledger: Some(true),
            ..Default::default()
        }
        .apply(&mut active);
        assert_eq!(active.water_ledger, Set(Some(true)));
        assert_eq!(active.district_plan, Set(None));
        assert!(active.id.is_not_set());
    }

    #[test]
    fn response_flattens_answers() {
        let mut model = survey();
        model.gas = Some("都市ガス".into());
        let value = serde_json::to_value(SurveyResponse::from(model)).unwrap();
        assert_eq!(value["gas"], json!("都市ガス"));
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn upsert_keeps_identity_columns() {
        let columns: Vec<String> = replaced_columns().map(|c| format!("{:?}", c)).collect();
        assert!(columns.iter().any(|c| c == "UpdatedAt"));
        assert!(columns.iter().any(|c| c == "ExtraNotes"));
        assert!(!columns.iter().any(|c| c == "ProjectId" || c == "CreatedAt" || c == "Id"));
    }
}
