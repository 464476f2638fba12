//! Integration tests for the RTI engine HTTP API.
//!
//! This suite drives the router end to end:
//! - Recording a payroll run's filing and its draft submission
//! - Validation with per-record issues
//! - Submission, gateway reference and deferred acceptance
//! - Period adjustment filings
//! - Reports for every submission type
//! - Error cases

use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use rti_engine::api::{create_router, AppState};
use rti_engine::config::ConfigLoader;
use rti_engine::lifecycle::SubmissionManager;
use rti_engine::models::SubmissionType;

// =============================================================================
// Test Helpers
// =============================================================================

/// Loads the shipped configuration with fast gateway timings.
fn create_test_state() -> AppState {
    let loader = ConfigLoader::load("./config/rti.yaml").expect("Failed to load config");
    let mut config = loader.config().clone();
    config.gateway.submit_delay_ms = 0;
    config.gateway.acceptance_delay_ms = 100;
    AppState::new(SubmissionManager::in_memory(&config))
}

fn router(state: &AppState) -> Router {
    create_router(state.clone())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn call(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn call_json(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = call(state, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn worker(worker_ref: &str, ni: &str, first: &str, last: &str, pay: [&str; 4]) -> Value {
    json!({
        "worker_ref": worker_ref,
        "ni_number": ni,
        "first_name": first,
        "last_name": last,
        "date_of_birth": "1985-06-15",
        "gender": "female",
        "address": { "lines": ["1 High Street", "London"], "postcode": "SW1A 1AA" },
        "tax_code": "1257L",
        "ni_category": "A",
        "gross_pay": pay[0],
        "income_tax": pay[1],
        "employee_ni": pay[2],
        "employer_ni": pay[3]
    })
}

fn two_worker_run() -> Value {
    json!({
        "payroll_run_id": "run_2024_04",
        "payment_date": "2024-04-25",
        "worker_records": [
            worker("W001", "AB123456C", "Jane", "Smith", ["2000.00", "200.00", "100.00", "150.00"]),
            worker("W002", "CE654321A", "Tom", "Jones", ["3000.00", "400.00", "150.00", "200.00"])
        ]
    })
}

async fn wait_for_status(state: &AppState, id: &str, status: &str) -> Value {
    for _ in 0..200 {
        let (_, submission) = call_json(state, "GET", &format!("/submissions/{}", id), None).await;
        if submission["status"] == status {
            return submission;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("submission {} never reached status {}", id, status);
}

// =============================================================================
// Payroll run to accepted submission
// =============================================================================

#[tokio::test]
async fn test_two_worker_run_end_to_end() {
    let state = create_test_state();

    let (status, created) =
        call_json(&state, "POST", "/filings/periodic-payment", Some(two_worker_run())).await;
    assert_eq!(status, StatusCode::CREATED);

    let filing = &created["filing"];
    assert_eq!(filing["kind"], "periodic_payment");
    assert_eq!(filing["tax_year"], "2024/2025");
    assert_eq!(filing["tax_month"], 1);
    assert_eq!(filing["employer_ref"], "123/AB45678");
    assert_eq!(filing["accounts_office_ref"], "123PA00045678");
    assert_eq!(decimal(filing["total_payment"].as_str().unwrap()), decimal("5000"));
    assert_eq!(decimal(filing["total_tax"].as_str().unwrap()), decimal("600"));
    assert_eq!(decimal(filing["total_employee_ni"].as_str().unwrap()), decimal("250"));
    assert_eq!(decimal(filing["total_employer_ni"].as_str().unwrap()), decimal("350"));
    assert_eq!(decimal(filing["total_student_loan"].as_str().unwrap()), Decimal::ZERO);

    let submission = &created["submission"];
    let id = submission["id"].as_str().unwrap().to_string();
    assert_eq!(submission["type"], "periodic_payment");
    assert_eq!(submission["status"], "draft");
    assert_eq!(submission["employees_count"], 2);
    assert_eq!(filing["submission_id"], submission["id"]);

    let (status, validation) =
        call_json(&state, "POST", &format!("/submissions/{}/validate", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(validation["is_valid"], true);
    assert_eq!(validation["can_submit"], true);
    assert!(validation["errors"].as_array().unwrap().is_empty());

    let (status, outcome) =
        call_json(&state, "POST", &format!("/submissions/{}/submit", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["success"], true);
    let reference = outcome["gateway_reference"].as_str().unwrap().to_string();
    assert!(reference.starts_with("RTI-"));

    let (_, stored) = call_json(&state, "GET", &format!("/submissions/{}", id), None).await;
    assert_eq!(stored["status"], "submitted");
    assert_eq!(stored["gateway_reference"], reference.as_str());
    assert!(stored["submitted_date"].is_string());

    let (_, submitted) = call_json(&state, "GET", "/submissions/submitted", None).await;
    assert_eq!(submitted.as_array().unwrap().len(), 1);

    let accepted = wait_for_status(&state, &id, "accepted").await;
    assert!(accepted["accepted_date"].is_string());

    let (_, pending) = call_json(&state, "GET", "/submissions/pending", None).await;
    assert!(pending.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_worker_blocks_submission() {
    let state = create_test_state();
    let mut run = two_worker_run();
    run["worker_records"][1]["ni_number"] = json!("XX123");
    run["worker_records"][1]["tax_code"] = json!("ABC");

    let (_, created) = call_json(&state, "POST", "/filings/periodic-payment", Some(run)).await;
    let id = created["submission"]["id"].as_str().unwrap().to_string();

    let (_, validation) =
        call_json(&state, "POST", &format!("/submissions/{}/validate", id), None).await;
    let errors = validation["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["code"], "INVALID_NI");
    assert_eq!(errors[1]["code"], "INVALID_TAX_CODE");
    assert!(errors.iter().all(|e| e["record_ref"] == "W002"));

    let (status, outcome) =
        call_json(&state, "POST", &format!("/submissions/{}/submit", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome["success"], false);

    let (_, stored) = call_json(&state, "GET", &format!("/submissions/{}", id), None).await;
    assert_eq!(stored["status"], "draft");
    assert!(stored["gateway_reference"].is_null());
}

#[tokio::test]
async fn test_lowercase_identifiers_are_accepted() {
    let state = create_test_state();
    let mut run = two_worker_run();
    run["worker_records"][0]["ni_number"] = json!("ab 12 34 56 c");
    run["worker_records"][0]["tax_code"] = json!("1257l");

    let (_, created) = call_json(&state, "POST", "/filings/periodic-payment", Some(run)).await;
    let id = created["submission"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["filing"]["worker_records"][0]["ni_number"], "AB123456C");
    assert_eq!(created["filing"]["worker_records"][0]["tax_code"], "1257L");

    let (_, validation) =
        call_json(&state, "POST", &format!("/submissions/{}/validate", id), None).await;
    assert_eq!(validation["can_submit"], true);

    let (_, report) = call(&state, "GET", &format!("/submissions/{}/report", id), None).await;
    let report = String::from_utf8(report).unwrap();
    assert!(report.contains("NI Number: AB123456C"));
}

#[tokio::test]
async fn test_second_submit_is_refused() {
    let state = create_test_state();
    let (_, created) =
        call_json(&state, "POST", "/filings/periodic-payment", Some(two_worker_run())).await;
    let id = created["submission"]["id"].as_str().unwrap().to_string();

    let (status, _) = call_json(&state, "POST", &format!("/submissions/{}/submit", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, outcome) =
        call_json(&state, "POST", &format!("/submissions/{}/submit", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome["errors"][0]["code"], "INVALID_STATUS");
}

// =============================================================================
// Period adjustment filings
// =============================================================================

#[tokio::test]
async fn test_period_adjustment_filing() {
    let state = create_test_state();
    let body = json!({
        "payroll_run_id": "run_2024_07",
        "tax_year": "2024/2025",
        "tax_month": 4,
        "adjustment": {
            "ssp_reclaimed": "120.00",
            "smp_reclaimed": "80.00",
            "employment_allowance": true,
            "apprenticeship_levy": "15.50"
        }
    });

    let (status, created) =
        call_json(&state, "POST", "/filings/period-adjustment", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(created["filing"]["total_reclaimed"].as_str().unwrap()), decimal("200"));
    assert_eq!(created["submission"]["type"], "period_adjustment");

    let id = created["submission"]["id"].as_str().unwrap().to_string();
    let (status, report) = call(&state, "GET", &format!("/submissions/{}/report", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let report = String::from_utf8(report).unwrap();
    assert!(report.contains("Total Reclaimed: £200.00"));
    assert!(report.contains("Apprenticeship Levy: £15.50"));
}

#[tokio::test]
async fn test_negative_reclaim_blocks_submission() {
    let state = create_test_state();
    let body = json!({
        "payroll_run_id": "run_2024_08",
        "tax_year": "2024/2025",
        "tax_month": 5,
        "adjustment": { "sap_reclaimed": "-1.00" }
    });

    let (_, created) = call_json(&state, "POST", "/filings/period-adjustment", Some(body)).await;
    let id = created["submission"]["id"].as_str().unwrap().to_string();

    let (status, outcome) =
        call_json(&state, "POST", &format!("/submissions/{}/submit", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome["errors"][0]["code"], "NEGATIVE_AMOUNT");
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn test_periodic_payment_report() {
    let state = create_test_state();
    let (_, created) =
        call_json(&state, "POST", "/filings/periodic-payment", Some(two_worker_run())).await;
    let id = created["submission"]["id"].as_str().unwrap().to_string();

    let (status, report) = call(&state, "GET", &format!("/submissions/{}/report", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let report = String::from_utf8(report).unwrap();

    assert!(report.starts_with("RTI FULL PAYMENT SUBMISSION"));
    assert!(report.contains("Employer Reference: 123/AB45678"));
    assert!(report.contains("Payment Date: 2024-04-25"));
    assert!(report.contains("Total Payment: £5000.00"));
    assert!(report.contains("Total Employer NI: £350.00"));
    assert!(report.contains("Jane Smith"));
    assert!(report.contains("Tom Jones"));
}

#[tokio::test]
async fn test_reports_for_types_without_documents() {
    let state = create_test_state();

    for (submission_type, heading) in [
        (SubmissionType::NilPayment, "RTI NIL PAYMENT SUBMISSION"),
        (SubmissionType::EmployerAlignment, "RTI EMPLOYER ALIGNMENT SUBMISSION"),
    ] {
        let submission = state
            .manager()
            .create_submission(submission_type, "run_2024_09", None)
            .await
            .unwrap();

        let (status, report) = call(
            &state,
            "GET",
            &format!("/submissions/{}/report", submission.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let report = String::from_utf8(report).unwrap();
        assert!(report.starts_with(heading), "unexpected report: {}", report);
    }
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_unknown_submission_everywhere() {
    let state = create_test_state();
    let id = uuid::Uuid::new_v4();

    let (status, error) = call_json(&state, "GET", &format!("/submissions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "SUBMISSION_NOT_FOUND");

    let (status, _) = call_json(&state, "POST", &format!("/submissions/{}/validate", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, outcome) =
        call_json(&state, "POST", &format!("/submissions/{}/submit", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(outcome["errors"][0]["code"], "SUBMISSION_NOT_FOUND");

    let (status, _) = call(&state, "GET", &format!("/submissions/{}/report", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_filing_body() {
    let state = create_test_state();
    let response = router(&state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/filings/periodic-payment")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"payroll_run_id\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_content_type() {
    let state = create_test_state();
    let response = router(&state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/filings/periodic-payment")
                .body(Body::from(two_worker_run().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["code"], "MISSING_CONTENT_TYPE");
}

#[tokio::test]
async fn test_month_out_of_range() {
    let state = create_test_state();
    let body = json!({
        "payroll_run_id": "run_2024_10",
        "tax_year": "2024/2025",
        "tax_month": 0
    });

    let (status, error) = call_json(&state, "POST", "/filings/period-adjustment", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}
