//! End-to-end tests for `POST /export-stock` through the full router

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use calamine::DataType;
use serde_json::{json, Value};
use tower::ServiceExt;

use stockexport_email::mock::MockEmailService;
use stockexport_stock::{HEADERS, MAX_CELL_CHARS};

use common::{
    export_request, parse_body, raw_export_request, read_sheet, widget_payload, TestApp,
    TEST_ORIGIN,
};

mod success {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_single_item_export_is_delivered() {
        let app = TestApp::new();

        let response = app
            .test_router()
            .oneshot(export_request(&widget_payload()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            parse_body(response).await,
            json!({ "message": "Stock exported and sent successfully" })
        );

        assert_eq!(app.email.email_count(), 1);
        let sent = app.email.get_latest_email("a@b.com").unwrap();
        assert_eq!(sent.message.subject, "Stock Export");
        assert_eq!(sent.attachment_count(), 1);

        let attachment = &sent.message.attachments[0];
        assert!(attachment.filename.starts_with("stock_export_"));
        assert!(attachment.filename.ends_with(".xlsx"));

        let sheet = read_sheet(&attachment.content);
        assert_eq!(sheet.get_size(), (2, 8));
        assert_eq!(
            sheet.get_value((1, 0)).and_then(|c| c.get_string()),
            Some("Widget")
        );
        assert_eq!(sheet.get_value((1, 1)).and_then(|c| c.as_f64()), Some(1.5));
        assert_eq!(sheet.get_value((1, 2)).and_then(|c| c.as_f64()), Some(2.5));
        assert_eq!(sheet.get_value((1, 3)).and_then(|c| c.as_f64()), Some(10.0));
        assert_eq!(sheet.get_value((1, 4)).and_then(|c| c.as_f64()), Some(2.0));
        assert_eq!(
            sheet.get_value((1, 7)).and_then(|c| c.get_string()),
            Some("pcs")
        );
    }

    #[tokio::test]
    async fn test_header_row_and_item_order() {
        let app = TestApp::new();
        let payload = json!({
            "email": "buyer@example.com",
            "stock": [
                { "ItemName": "Bolt", "CostPrice": 0.1, "SellingPrice": 0.30000000000000004,
                  "AvailableQuantity": -5, "MinQuantity": 0, "ItemCode": "B-1",
                  "Group": "Fasteners", "Unit": "pcs" },
                { "ItemName": "Flour", "CostPrice": 12.345678901234, "SellingPrice": 20,
                  "AvailableQuantity": 1000000, "MinQuantity": 50, "ItemCode": "F-9",
                  "Group": "Bakery", "Unit": "kg" },
                { "ItemName": "Oil", "CostPrice": 3, "SellingPrice": 4.75,
                  "AvailableQuantity": 0, "MinQuantity": 7, "ItemCode": "O-2",
                  "Group": "Pantry", "Unit": "L" }
            ]
        });

        let response = app
            .test_router()
            .oneshot(export_request(&payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = app.email.get_latest_email("buyer@example.com").unwrap();
        let sheet = read_sheet(&sent.message.attachments[0].content);

        assert_eq!(sheet.get_size(), (4, 8));
        for (column, label) in HEADERS.iter().enumerate() {
            assert_eq!(
                sheet.get_value((0, column as u32)).and_then(|c| c.get_string()),
                Some(*label)
            );
        }

        let names: Vec<_> = (1..4)
            .map(|row| sheet.get_value((row, 0)).and_then(|c| c.get_string()))
            .collect();
        assert_eq!(names, vec![Some("Bolt"), Some("Flour"), Some("Oil")]);

        // Prices come back bit-for-bit, quantities as written
        assert_eq!(
            sheet.get_value((1, 2)).and_then(|c| c.as_f64()).map(f64::to_bits),
            Some(0.30000000000000004_f64.to_bits())
        );
        assert_eq!(
            sheet.get_value((2, 1)).and_then(|c| c.as_f64()).map(f64::to_bits),
            Some(12.345678901234_f64.to_bits())
        );
        assert_eq!(sheet.get_value((1, 3)).and_then(|c| c.as_f64()), Some(-5.0));
        assert_eq!(sheet.get_value((3, 3)).and_then(|c| c.as_f64()), Some(0.0));
    }

    #[tokio::test]
    async fn test_overlong_item_name_is_truncated_not_rejected() {
        let app = TestApp::new();
        let mut payload = widget_payload();
        payload["stock"][0]["ItemName"] = json!("n".repeat(40_000));

        let response = app
            .test_router()
            .oneshot(export_request(&payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sent = app.email.get_latest_email("a@b.com").unwrap();
        let sheet = read_sheet(&sent.message.attachments[0].content);
        let name = sheet.get_value((1, 0)).and_then(|c| c.get_string()).unwrap();
        assert_eq!(name.chars().count(), MAX_CELL_CHARS);
        assert_eq!(app.scratch_file_count(), 0);
    }

    #[tokio::test]
    async fn test_null_group_is_accepted() {
        let app = TestApp::new();
        let payload = json!({
            "email": "a@b.com",
            "stock": [{ "ItemName": "Widget", "CostPrice": 1, "SellingPrice": 2,
                        "AvailableQuantity": 1, "MinQuantity": 1, "ItemCode": "W1",
                        "Group": null, "Unit": "pcs" }]
        });

        let response = app
            .test_router()
            .oneshot(export_request(&payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.email.email_count(), 1);
    }

    #[tokio::test]
    async fn test_scratch_directory_is_empty_after_success() {
        let app = TestApp::new();

        let response = app
            .test_router()
            .oneshot(export_request(&widget_payload()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(app.scratch_root.is_dir());
        assert_eq!(app.scratch_file_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_exports_do_not_collide() {
        let app = TestApp::new();
        let router = app.test_router();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let router = router.clone();
            let mut payload = widget_payload();
            payload["email"] = Value::String(format!("user{}@example.com", i));
            tasks.spawn(async move { router.oneshot(export_request(&payload)).await });
        }

        while let Some(result) = tasks.join_next().await {
            let response = result.unwrap().unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let mut filenames: Vec<String> = app
            .email
            .get_all_emails()
            .into_iter()
            .map(|e| e.message.attachments[0].filename.clone())
            .collect();
        filenames.sort();
        filenames.dedup();

        assert_eq!(filenames.len(), 8);
        assert_eq!(app.scratch_file_count(), 0);
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn test_empty_stock_is_rejected_without_io() {
        let app = TestApp::new();

        let response = app
            .test_router()
            .oneshot(export_request(&json!({ "email": "a@b.com", "stock": [] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_body(response).await,
            json!({ "error": "No stock items provided" })
        );
        assert_eq!(app.email.email_count(), 0);
        assert!(!app.scratch_root.exists());
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = TestApp::new();

        let response = app
            .test_router()
            .oneshot(raw_export_request("{\"email\": \"a@b.com\", ".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(parse_body(response).await["error"].is_string());
        assert_eq!(app.email.email_count(), 0);
        assert!(!app.scratch_root.exists());
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_rejected() {
        let app = TestApp::new();
        let payload = json!({
            "email": "a@b.com",
            "stock": [{ "ItemName": "Widget", "CostPrice": "one fifty" }]
        });

        let response = app
            .test_router()
            .oneshot(export_request(&payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!app.scratch_root.exists());
    }

    #[tokio::test]
    async fn test_missing_stock_field_is_rejected() {
        let app = TestApp::new();

        let response = app
            .test_router()
            .oneshot(export_request(&json!({ "email": "a@b.com" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_email_field_is_rejected() {
        let app = TestApp::new();
        let mut payload = widget_payload();
        payload.as_object_mut().unwrap().remove("email");

        let response = app
            .test_router()
            .oneshot(export_request(&payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.email.email_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let app = TestApp::new();
        let body = "x".repeat(stockexport_app::MAX_BODY_BYTES + 1);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/export-stock")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();

        let response = app.test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

mod failures {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_dispatch_failure_returns_500_and_cleans_up() {
        let app = TestApp::with_email(MockEmailService::failing("421 service not available"));

        let response = app
            .test_router()
            .oneshot(export_request(&widget_payload()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            parse_body(response).await,
            json!({ "error": "Failed to send email" })
        );
        assert_eq!(app.email.attempt_count(), 1);
        assert_eq!(app.scratch_file_count(), 0);
    }

    #[tokio::test]
    async fn test_unusable_scratch_directory_returns_500() {
        let app = TestApp::new();
        let blocker = app.temp_root().join("occupied");
        std::fs::write(&blocker, b"a file, not a directory").unwrap();
        let app = app.with_scratch_root(blocker);

        let response = app
            .test_router()
            .oneshot(export_request(&widget_payload()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            parse_body(response).await,
            json!({ "error": "Failed to create temp directory" })
        );
        assert_eq!(app.email.email_count(), 0);
    }
}

mod infrastructure {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let app = TestApp::new();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/export-stock")
            .header(header::ORIGIN, TEST_ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.test_router().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&header::HeaderValue::from_static(TEST_ORIGIN))
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some(&header::HeaderValue::from_static("true"))
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_other_origins() {
        let app = TestApp::new();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/export-stock")
            .header(header::ORIGIN, "https://elsewhere.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.test_router().oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
