mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::{json, Value};

fn decimal(value: &Value) -> f64 {
    value
        .as_str()
        .map(|s| s.parse().unwrap())
        .or_else(|| value.as_f64())
        .expect("decimal field")
}

#[tokio::test]
async fn create_then_read_returns_every_attribute() {
    let app = TestApp::new().await;
    let region = app.seed_region(27, "大阪府", "大阪").await;

    let id = app
        .create_project(json!({
            "property_name": "山田様邸新築工事",
            "project_number": "P-2026-001",
            "region_id": region.id,
            "municipality": "大阪市",
            "lot_number": "旭区新森2-23",
            "address_display": "大阪市旭区新森2-23-12",
            "site_area": "150.25",
            "building_scale": "木造2階建",
            "city_planning_zone": "市街化区域",
            "fire_prevention": "準防火地域",
            "zoning": "第一種住居地域",
            "height_district": "第二種高度地区",
            "building_coverage": "60",
            "floor_area_ratio": "200",
            "customer_name": "山田太郎",
            "estimate_number": "E-0001",
            "estimate_date": "2026-04-01",
            "notes": "南側道路"
        }))
        .await;

    let (status, body) = app
        .json(Method::GET, &format!("/api/v1/projects/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["id"], id.as_str());
    assert_eq!(data["status"], "draft");
    assert_eq!(data["property_name"], "山田様邸新築工事");
    assert_eq!(data["project_number"], "P-2026-001");
    assert_eq!(data["municipality"], "大阪市");
    assert_eq!(data["lot_number"], "旭区新森2-23");
    assert_eq!(data["address_display"], "大阪市旭区新森2-23-12");
    assert_eq!(decimal(&data["site_area"]), 150.25);
    assert_eq!(data["building_scale"], "木造2階建");
    assert_eq!(data["city_planning_zone"], "市街化区域");
    assert_eq!(data["fire_prevention"], "準防火地域");
    assert_eq!(data["zoning"], "第一種住居地域");
    assert_eq!(data["height_district"], "第二種高度地区");
    assert_eq!(decimal(&data["building_coverage"]), 60.0);
    assert_eq!(decimal(&data["floor_area_ratio"]), 200.0);
    assert_eq!(data["customer_name"], "山田太郎");
    assert_eq!(data["estimate_number"], "E-0001");
    assert_eq!(data["estimate_date"], "2026-04-01");
    assert_eq!(data["notes"], "南側道路");
    assert_eq!(data["region"]["name"], "大阪府");
    assert_eq!(data["items"].as_array().unwrap().len(), 0);
    assert_eq!(data["totals"]["subtotal"], 0);
}

#[tokio::test]
async fn create_rejects_blank_property_name() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/projects",
            Some(json!({"property_name": "   "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let app = TestApp::new().await;
    let missing = uuid::Uuid::new_v4();

    for (method, uri) in [
        (Method::GET, format!("/api/v1/projects/{missing}")),
        (Method::DELETE, format!("/api/v1/projects/{missing}")),
        (Method::GET, format!("/api/v1/projects/{missing}/items")),
        (Method::GET, format!("/api/v1/projects/{missing}/survey")),
    ] {
        let (status, body) = app.json(method, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let app = TestApp::new().await;
    let id = app
        .create_project(json!({
            "property_name": "佐藤様邸",
            "customer_name": "佐藤",
            "notes": "初回"
        }))
        .await;

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/projects/{id}"),
            Some(json!({"status": "investigating", "notes": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "investigating");
    assert_eq!(body["data"]["property_name"], "佐藤様邸");
    assert_eq!(body["data"]["customer_name"], "佐藤");
    assert!(body["data"]["notes"].is_null());

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/v1/projects/{id}"),
            Some(json!({"property_name": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn null_clears_region_measurements_and_date() {
    let app = TestApp::new().await;
    let region = app.seed_region(27, "大阪府", "大阪").await;
    let id = app
        .create_project(json!({
            "property_name": "鈴木様邸",
            "region_id": region.id,
            "site_area": "150.25",
            "building_coverage": "60",
            "floor_area_ratio": "200",
            "estimate_date": "2024-04-01"
        }))
        .await;
    let uri = format!("/api/v1/projects/{id}");

    let (status, body) = app
        .json(Method::PUT, &uri, Some(json!({"notes": "変更なし"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["region_id"], region.id);
    assert_eq!(decimal(&body["data"]["site_area"]), 150.25);

    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            Some(json!({
                "region_id": null,
                "site_area": null,
                "building_coverage": null,
                "floor_area_ratio": null,
                "estimate_date": null
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    for field in [
        "region_id",
        "site_area",
        "building_coverage",
        "floor_area_ratio",
        "estimate_date",
    ] {
        assert!(data[field].is_null(), "{field} should be cleared: {data}");
    }
    assert_eq!(data["notes"], "変更なし");
}

#[tokio::test]
async fn duplicate_project_number_is_a_conflict() {
    let app = TestApp::new().await;
    app.create_project(json!({"property_name": "A", "project_number": "P-1"}))
        .await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/projects",
            Some(json!({"property_name": "B", "project_number": "P-1"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"], "Conflict");
    assert!(body["message"].as_str().unwrap().contains("P-1"));

    let other = app
        .create_project(json!({"property_name": "C", "project_number": "P-2"}))
        .await;
    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/v1/projects/{other}"),
            Some(json!({"project_number": "P-1"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app
        .json(Method::GET, &format!("/api/v1/projects/{other}"), None)
        .await;
    assert_eq!(body["data"]["project_number"], "P-2");
}

#[tokio::test]
async fn list_filters_searches_and_paginates() {
    let app = TestApp::new().await;
    for i in 0..3 {
        app.create_project(json!({"property_name": format!("山田様邸 {i}")}))
            .await;
    }
    let other = app
        .create_project(json!({"property_name": "鈴木ビル", "customer_name": "Suzuki Corp"}))
        .await;
    app.json(
        Method::PUT,
        &format!("/api/v1/projects/{other}"),
        Some(json!({"status": "completed"})),
    )
    .await;

    let (status, body) = app
        .json(Method::GET, "/api/v1/projects?page=1&limit=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .json(Method::GET, "/api/v1/projects?status=completed", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], other.as_str());

    let (_, body) = app
        .json(Method::GET, "/api/v1/projects?search=suzuki", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn delete_removes_project_and_children() {
    let app = TestApp::new().await;
    let id = app.create_project(json!({"property_name": "削除テスト"})).await;

    app.json(
        Method::PUT,
        &format!("/api/v1/projects/{id}/survey"),
        Some(json!({"gas": "都市ガス"})),
    )
    .await;
    app.json(
        Method::POST,
        &format!("/api/v1/projects/{id}/items"),
        Some(json!({"description": "道路台帳", "selling_price": 10000})),
    )
    .await;

    let response = app
        .request(Method::DELETE, &format!("/api/v1/projects/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = app
        .json(Method::GET, &format!("/api/v1/projects/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_echo_request_id() {
    let app = TestApp::new().await;
    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/projects",
            None,
            &[("x-request-id", "req-projects-1")],
        )
        .await;

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-projects-1"
    );
    let body = common::response_json(response).await;
    assert_eq!(body["meta"]["request_id"], "req-projects-1");
}
