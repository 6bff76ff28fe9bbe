mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use site_survey_api::{entities::project_survey, services::surveys::SurveyFields};

#[tokio::test]
async fn survey_is_null_until_saved() {
    let app = TestApp::new().await;
    let id = app.create_project(json!({"property_name": "山田様邸"})).await;

    let (status, body) = app
        .json(Method::GET, &format!("/api/v1/projects/{id}/survey"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn first_put_creates_and_second_replaces() {
    let app = TestApp::new().await;
    let id = app.create_project(json!({"property_name": "山田様邸"})).await;
    let uri = format!("/api/v1/projects/{id}/survey");

    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            Some(json!({
                "district_plan": "なし",
                "road1_side": "南",
                "road1_name": "市道新森1号線",
                "road1_width": "4.5",
                "sewerage_ledger": true,
                "gas": "都市ガス"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["road1_name"], "市道新森1号線");
    assert_eq!(body["data"]["sewerage_ledger"], true);
    let survey_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(Method::PUT, &uri, Some(json!({"district_plan": "あり"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], survey_id.as_str());
    assert_eq!(body["data"]["district_plan"], "あり");
    assert!(body["data"]["gas"].is_null());
    assert!(body["data"]["road1_name"].is_null());

    let project_id: uuid::Uuid = id.parse().unwrap();
    let rows = project_survey::Entity::find()
        .filter(project_survey::Column::ProjectId.eq(project_id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let (_, body) = app.json(Method::GET, &uri, None).await;
    assert_eq!(body["data"]["district_plan"], "あり");
}

#[tokio::test]
async fn concurrent_first_saves_report_one_creation() {
    let app = TestApp::new().await;
    let id: uuid::Uuid = app
        .create_project(json!({"property_name": "同時保存邸"}))
        .await
        .parse()
        .unwrap();
    let surveys = app.state.services.surveys.clone();

    let saves = (0..4).map(|n| {
        let surveys = surveys.clone();
        tokio::spawn(async move {
            let fields = SurveyFields {
                extra_notes: Some(format!("save {n}")),
                ..Default::default()
            };
            surveys.save_survey(id, fields).await.unwrap()
        })
    });
    let results = futures::future::join_all(saves).await;

    let created: Vec<bool> = results.into_iter().map(|r| r.unwrap().created).collect();
    assert_eq!(created.iter().filter(|c| **c).count(), 1, "{created:?}");

    let rows = project_survey::Entity::find()
        .filter(project_survey::Column::ProjectId.eq(id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn survey_for_unknown_project_is_not_found() {
    let app = TestApp::new().await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/v1/projects/{missing}/survey"),
            Some(json!({"gas": "プロパン"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
