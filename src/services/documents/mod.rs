//! Spreadsheet exports: the estimate (見積書) and the survey sheet (調査書).

pub mod estimate;
pub mod layout;
pub mod survey;

use crate::entities::{project, project_item, project_survey};
use crate::errors::ServiceError;
use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Estimate,
    Survey,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Estimate => "estimate",
            DocumentKind::Survey => "survey",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            DocumentKind::Estimate => estimate::SHEET_NAME,
            DocumentKind::Survey => survey::SHEET_NAME,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "estimate" => Ok(DocumentKind::Estimate),
            "survey" => Ok(DocumentKind::Survey),
            other => Err(ServiceError::BadRequest(format!(
                "Unknown export type '{}', expected 'estimate' or 'survey'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl GeneratedDocument {
    fn new(kind: DocumentKind, property_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            filename: format!("{}_{}.xlsx", kind.title(), property_name),
            bytes,
        }
    }

    /// `attachment; filename*=UTF-8''…` with the filename percent-encoded.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename*=UTF-8''{}",
            utf8_percent_encode(&self.filename, URI_COMPONENT)
        )
    }
}

pub fn generate_estimate(
    project: &project::Model,
    items: &[project_item::Model],
    today: NaiveDate,
) -> Result<GeneratedDocument, ServiceError> {
    let sheet = estimate::build(project, items, today);
    let bytes = layout::render(&sheet)?;
    Ok(GeneratedDocument::new(
        DocumentKind::Estimate,
        &project.property_name,
        bytes,
    ))
}

pub fn generate_survey(
    project: &project::Model,
    region_name: Option<&str>,
    survey: Option<&project_survey::Model>,
    today: NaiveDate,
) -> Result<GeneratedDocument, ServiceError> {
    let sheet = survey::build(project, region_name, survey, today);
    let bytes = layout::render(&sheet)?;
    Ok(GeneratedDocument::new(
        DocumentKind::Survey,
        &project.property_name,
        bytes,
    ))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::entities::{project, project_survey, ProjectStatus};
    use chrono::Utc;
    use uuid::Uuid;

    pub fn project(name: &str) -> project::Model {
        let now = Utc::now();
        project::Model {
            id: Uuid::new_v4(),
            project_number: None,
            property_name: name.into(),
            region_id: Some(27),
            municipality: Some("大阪市".into()),
            lot_number: None,
            address_display: None,
            site_area: None,
            building_scale: None,
            city_planning_zone: None,
            fire_prevention: None,
            zoning: None,
            height_district: None,
            building_coverage: None,
            floor_area_ratio: None,
            customer_name: Some("株式会社テスト".into()),
            status: ProjectStatus::Draft,
            estimate_number: Some("E-0001".into()),
            estimate_date: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn survey() -> project_survey::Model {
        let now = Utc::now();
        project_survey::Model {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            district_plan: None,
            district_plan_notes: None,
            building_agreement: None,
            building_agreement_notes: None,
            landscape: None,
            landscape_notes: None,
            buried_cultural: None,
            buried_cultural_notes: None,
            road1_type: None,
            road1_side: None,
            road1_name: None,
            road1_character: None,
            road1_width: None,
            road1_demarcation: None,
            road2_type: None,
            road2_side: None,
            road2_name: None,
            road2_character: None,
            road2_width: None,
            road2_demarcation: None,
            road3_type: None,
            road3_side: None,
            road3_name: None,
            road3_character: None,
            road3_width: None,
            road3_demarcation: None,
            public_sewerage: None,
            sewerage_ledger: None,
            sewerage_notes: None,
            water_supply: None,
            water_ledger: None,
            water_notes: None,
            gas: None,
            gas_notes: None,
            scenic_district: None,
            scenic_notes: None,
            wall_setback_road: None,
            wall_setback_adjacent: None,
            retaining_wall_regulation: None,
            retaining_wall_notes: None,
            sediment_control: None,
            sediment_notes: None,
            river_conservation: None,
            river_width: None,
            river_notes: None,
            landslide: None,
            steep_slope: None,
            disaster_warning: None,
            fire_department: None,
            intermediate_inspection: None,
            highrise_related: None,
            development_guidelines: None,
            city_planning_facility: None,
            extra_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
