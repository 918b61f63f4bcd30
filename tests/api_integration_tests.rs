// API Integration Tests
//
// Purpose: Drive the full router (pages + JSON API) against both backing stores
// Run with: cargo test --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use report_card_server::{
        create_router, AppState, InMemoryRepository, JsonFileRepository, ReportCardRepository,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt; // for oneshot

    // Helper: Router over a preseeded in-memory store
    fn memory_app() -> (Router, Arc<InMemoryRepository>) {
        let repository = Arc::new(InMemoryRepository::with_sample_data());
        let app = create_router(AppState::new(repository.clone()));
        (app, repository)
    }

    // Helper: Router over a JSON file store in a scratch directory
    fn file_app(dir: &tempfile::TempDir) -> (Router, Arc<JsonFileRepository>) {
        let repository = Arc::new(JsonFileRepository::new(dir.path().join("report_cards.json")));
        let app = create_router(AppState::new(repository.clone()));
        (app, repository)
    }

    async fn get(app: &Router, uri: &str) -> axum::response::Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(app: &Router, body: &str) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/create")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        String::from_utf8(body.to_vec()).expect("Body is not UTF-8")
    }

    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    // =========================================================================
    // Section 1: Health Check
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = memory_app();
        let response = get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    // =========================================================================
    // Section 2: Index Page
    // =========================================================================

    #[tokio::test]
    async fn test_index_page_lists_sample_cards() {
        let (app, _) = memory_app();
        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Report Card Interface"));
        assert!(html.contains("Funnel Report Card"));
        assert!(html.contains("QuickBooks Core Report Card"));
        assert!(html.contains("Custom Agency Report Card"));
        assert!(html.contains("Q4 2024 Sales Funnel"));
        assert!(html.contains("November 2024 Financial Summary"));
        assert!(html.contains("Digital Marketing Campaign Performance"));
        assert!(html.contains("3 report card(s)"));
    }

    #[tokio::test]
    async fn test_index_page_filters_by_reference_date() {
        let (app, _) = memory_app();
        let html = body_text(get(&app, "/?reference_date=2024-11-01").await).await;
        assert!(html.contains("1 report card(s)"));
        assert!(html.contains("November 2024 Financial Summary"));
        assert!(!html.contains("Q4 2024 Sales Funnel"));
        assert!(html.contains(r#"<option value="2024-11-01" selected>"#));
    }

    #[tokio::test]
    async fn test_index_page_blank_filters_show_everything() {
        let (app, _) = memory_app();
        let html = body_text(get(&app, "/?card_type=&account_id=&reference_date=").await).await;
        assert!(html.contains("3 report card(s)"));
    }

    #[tokio::test]
    async fn test_index_page_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = file_app(&dir);
        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("No report cards found."));
    }

    // =========================================================================
    // Section 3: Show Page
    // =========================================================================

    #[tokio::test]
    async fn test_show_sample_card() {
        let (app, repository) = memory_app();
        let card = repository.get_by_id(1).unwrap();

        let response = get(&app, &format!("/report_card/{}", card.uuid)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Funnel Report Card"));
        assert!(html.contains("Q4 2024 Sales Funnel"));
        assert!(html.contains("conversion_rate"));
        assert!(html.contains("4.60"));
        assert!(html.contains("Back to All Report Cards"));
        assert!(!html.contains("cannot display that"));
    }

    #[tokio::test]
    async fn test_show_unknown_key_is_404() {
        let (app, _) = memory_app();
        let response = get(&app, "/report_card/does-not-exist").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let html = body_text(response).await;
        assert!(html.contains("404"));
        assert!(html.contains("Report Card Not Found"));
    }

    #[tokio::test]
    async fn test_show_card_with_missing_parameters() {
        let (app, repository) = memory_app();
        let mut params = std::collections::BTreeMap::new();
        params.insert("account_id".to_string(), "ACC001".to_string());
        let card = repository.create("student", params, vec![]).unwrap();

        let response = get(&app, &format!("/report_card/{}", card.uuid)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("cannot display that"));
    }

    #[tokio::test]
    async fn test_show_card_with_unknown_type() {
        let (app, repository) = memory_app();
        let card = repository
            .create("invalid", std::collections::BTreeMap::new(), vec![])
            .unwrap();

        let response = get(&app, &format!("/report_card/{}", card.uuid)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("cannot display that"));
    }

    // =========================================================================
    // Section 4: Create
    // =========================================================================

    #[tokio::test]
    async fn test_create_form_lists_types() {
        let (app, _) = memory_app();
        let response = get(&app, "/create").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains(r#"<option value="student">"#));
        assert!(html.contains(r#"name="course_code""#));
    }

    #[tokio::test]
    async fn test_create_persists_and_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let (app, repository) = file_app(&dir);

        let response = post_form(
            &app,
            "card_type=student&account_id=ACC001&student_name=John+Doe&reference_date=2024-01-15",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let cards = repository.all();
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.id, 1);
        assert_eq!(card.card_type, "student");
        assert_eq!(card.parameter("student_name"), Some("John Doe"));
        assert_eq!(card.sections.len(), 2);
        for section in &card.sections {
            let score = section.score.value();
            assert!((1.0..=5.0).contains(&score));
        }

        let html = body_text(get(&app, &format!("/report_card/{}", card.uuid)).await).await;
        assert!(html.contains("John Doe"));
        assert!(!html.contains("cannot display that"));
    }

    #[tokio::test]
    async fn test_create_is_permissive_but_display_is_strict() {
        let dir = tempfile::tempdir().unwrap();
        let (app, repository) = file_app(&dir);

        // reference_date never submitted
        let response = post_form(&app, "card_type=teacher&account_id=ACC002&teacher_name=Ms+Lee&subject=Math").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let card = repository.get_by_id(1).unwrap();
        assert!(!card.parameters.contains_key("reference_date"));

        let html = body_text(get(&app, &format!("/report_card/{}", card.uuid)).await).await;
        assert!(html.contains("cannot display that"));
    }

    #[tokio::test]
    async fn test_blank_submitted_field_still_counts_as_present() {
        let dir = tempfile::tempdir().unwrap();
        let (app, repository) = file_app(&dir);

        let response = post_form(&app, "card_type=student&account_id=A&student_name=&reference_date=2024-01-15").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let card = repository.get_by_id(1).unwrap();
        assert_eq!(card.parameter("student_name"), Some(""));
        assert_eq!(card.parameters.len(), 3);

        let html = body_text(get(&app, &format!("/report_card/{}", card.uuid)).await).await;
        assert!(!html.contains("cannot display that"));
    }

    #[tokio::test]
    async fn test_create_without_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (app, repository) = file_app(&dir);

        let response = post_form(&app, "account_id=ACC001").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(repository.all().is_empty());
    }

    #[tokio::test]
    async fn test_sequential_ids_through_http() {
        let (app, repository) = memory_app();
        for name in ["A", "B", "C"] {
            let body = format!("card_type=course&account_id=X&course_name={}&course_code=C1&reference_date=2025-01-01", name);
            assert_eq!(post_form(&app, &body).await.status(), StatusCode::SEE_OTHER);
        }
        let ids: Vec<u64> = repository.all().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    // =========================================================================
    // Section 5: JSON API
    // =========================================================================

    #[tokio::test]
    async fn test_api_list_and_filter() {
        let (app, _) = memory_app();

        let body = json_response(get(&app, "/api/report_cards").await).await;
        assert_eq!(body["rows"], 3);
        assert!(body["data"].is_array());

        let body = json_response(get(&app, "/api/report_cards?card_type=Funnel%20Report%20Card").await).await;
        assert_eq!(body["rows"], 1);
        assert_eq!(body["data"][0]["card_type"], "Funnel Report Card");
    }

    #[tokio::test]
    async fn test_api_get_card() {
        let (app, repository) = memory_app();
        let card = repository.get_by_id(2).unwrap();

        let response = get(&app, &format!("/api/report_cards/{}", card.uuid)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["card"]["id"], 2);
        assert_eq!(body["displayable"], true);
        assert!(body["error"].is_null());
    }

    #[tokio::test]
    async fn test_api_get_card_reports_cause() {
        let (app, repository) = memory_app();
        let card = repository
            .create("student", std::collections::BTreeMap::new(), vec![])
            .unwrap();

        let body = json_response(get(&app, &format!("/api/report_cards/{}", card.uuid)).await).await;
        assert_eq!(body["displayable"], false);
        assert!(body["error"].as_str().unwrap().contains("student_name"));
    }

    #[tokio::test]
    async fn test_api_unknown_card_is_404() {
        let (app, _) = memory_app();
        let response = get(&app, "/api/report_cards/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_response(response).await;
        assert!(body["error"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_api_types() {
        let (app, _) = memory_app();
        let body = json_response(get(&app, "/api/types").await).await;
        let types = body["types"].as_array().unwrap();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0]["tag"], "student");
        assert_eq!(types[0]["required_parameters"][1], "student_name");
    }

    // =========================================================================
    // Section 6: Storage Degradation
    // =========================================================================

    #[tokio::test]
    async fn test_malformed_store_renders_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report_cards.json"), "not json at all").unwrap();
        let (app, _) = file_app(&dir);

        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("0 report card(s)"));

        let body = json_response(get(&app, "/api/report_cards").await).await;
        assert_eq!(body["rows"], 0);
    }
}
