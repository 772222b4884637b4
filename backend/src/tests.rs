//! End-to-end request tests: every service wired into a real app with an
//! in-memory database and a throwaway upload directory.

use crate::config::Config;
use crate::forms::files::FileStore;
use crate::services;
use crate::store::RecordStore;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use tempfile::TempDir;

fn fixtures() -> (web::Data<RecordStore>, web::Data<FileStore>, TempDir) {
    let store = web::Data::new(RecordStore::open(":memory:").unwrap());
    let dir = TempDir::new().unwrap();
    let files = FileStore::new(dir.path());
    files.ensure_directories().unwrap();
    (store, web::Data::new(files), dir)
}

fn test_config(max_payload_bytes: usize) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: ":memory:".to_string(),
        upload_dir: "uploads".to_string(),
        max_payload_bytes,
    }
}

macro_rules! app {
    ($store:expr, $files:expr) => {
        app!($store, $files, 30 * 1024 * 1024)
    };
    ($store:expr, $files:expr, $limit:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(test_config($limit)))
                .app_data($store.clone())
                .app_data($files.clone())
                .service(services::onboarding::configure_routes())
                .service(services::applications::configure_routes())
                .service(services::leaves::configure_routes())
                .service(services::payslips::configure_routes())
                .service(services::uploads::configure_routes()),
        )
        .await
    };
}

const BOUNDARY: &str = "----testboundary7MA4YWxk";

/// Builds a multipart/form-data body out of text fields and file parts.
fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}

fn leave_payload(from: &str, to: &str) -> Value {
    json!({
        "name": "Jane Doe",
        "empId": "ABC0123",
        "email": "jane@example.com",
        "leaveType": "Casual",
        "fromDate": from,
        "toDate": to,
        "reason": "Family function",
    })
}

#[actix_web::test]
async fn approved_leave_blocks_overlapping_requests() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/leaves")
            .set_json(leave_payload("2025-04-24", "2025-04-26"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let id = body["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/leaves/{}/status", id))
            .set_json(json!({ "status": "Approved" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["modified"], json!(true));

    // Touching the approved range on its last day is still an overlap.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/leaves")
            .set_json(leave_payload("2025-04-26", "2025-04-28"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));

    // The day after the approved range is free again.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/leaves")
            .set_json(leave_payload("2025-04-27", "2025-04-28"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
}

#[actix_web::test]
async fn pending_leaves_never_block() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files);

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/leaves")
                .set_json(leave_payload("2025-05-01", "2025-05-02"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
    }
}

#[actix_web::test]
async fn impossible_payslip_month_reports_the_exact_field() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/payslips")
            .set_json(json!({
                "employeeName": "Jane Doe",
                "employeeId": "ABC0123",
                "email": "jane@example.com",
                "password": "pa$s9word",
                "startMonth": "2025-13",
                "endMonth": "",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["details"]["startMonth"].is_string());
    assert!(body["details"].get("endMonth").is_none());
}

#[actix_web::test]
async fn payslip_password_is_never_persisted() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/payslips")
            .set_json(json!({
                "employeeName": "Jane Doe",
                "employeeId": "ABC0123",
                "email": "Jane@Example.com",
                "password": "pa$s9word",
                "startMonth": "2024-02",
                "endMonth": "2024-04",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let id = body["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/payslips/{}", id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let record: Value = test::read_body_json(resp).await;
    assert!(record.get("password").is_none());
    assert_eq!(record["email"], json!("jane@example.com"));
    assert_eq!(record["calculatedPayPeriod"], json!("Feb 2024 - Apr 2024"));
}

fn application_fields<'a>(email: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("fullName", "Jane Doe"),
        ("email", email),
        ("mobileNumber", "5550100200"),
        ("department", "Engineering"),
        ("jobRole", "Backend Developer"),
        ("expectedSalary", "45000"),
    ]
}

const APPLICATION_FILES: &[(&str, &str, &[u8])] = &[
    ("sscDoc", "ssc.pdf", b"%PDF-1.4 ssc"),
    ("intermediateDoc", "inter.pdf", b"%PDF-1.4 inter"),
    ("graduationDoc", "grad.pdf", b"%PDF-1.4 grad"),
];

#[actix_web::test]
async fn duplicate_application_email_conflicts_despite_case() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files);

    let body = multipart_body(&application_fields("jane@example.com"), APPLICATION_FILES);
    let resp = test::call_service(
        &app,
        multipart_request("/api/applications/submit", body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let body = multipart_body(&application_fields("  JANE@Example.COM "), APPLICATION_FILES);
    let resp = test::call_service(
        &app,
        multipart_request("/api/applications/submit", body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("jane@example.com"));
}

#[actix_web::test]
async fn oversized_multipart_submission_is_rejected() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files, 1024);

    let padding = vec![b'x'; 64 * 1024];
    let body = multipart_body(
        &application_fields("jane@example.com"),
        &[
            ("sscDoc", "ssc.pdf", &padding),
            ("intermediateDoc", "inter.pdf", b"%PDF-1.4 inter"),
            ("graduationDoc", "grad.pdf", b"%PDF-1.4 grad"),
        ],
    );
    let resp = test::call_service(
        &app,
        multipart_request("/api/applications/submit", body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 413);

    // Nothing was persisted for the aborted submission.
    assert!(store
        .find_id_by_email(
            crate::store::collections::JOB_APPLICATIONS,
            "jane@example.com"
        )
        .unwrap()
        .is_none());
}

#[actix_web::test]
async fn application_rejects_missing_certificates_without_saving() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files);

    let body = multipart_body(&application_fields("jane@example.com"), &[]);
    let resp = test::call_service(
        &app,
        multipart_request("/api/applications/submit", body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    for field in ["sscDoc", "intermediateDoc", "graduationDoc"] {
        assert!(body["details"][field].is_string(), "missing {}", field);
    }
}

#[actix_web::test]
async fn onboarding_without_experience_checkbox_succeeds() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files);

    let body = multipart_body(
        &[
            ("fullName", "Jane Doe"),
            ("email", "Jane@Example.com"),
            ("dateOfBirth", "1995-06-15"),
        ],
        &[
            ("idProof", "id.png", b"\x89PNG id"),
            ("resume", "cv.docx", b"PK cv"),
            ("signedDocument", "offer.pdf", b"%PDF-1.4 offer"),
        ],
    );
    let resp = test::call_service(
        &app,
        multipart_request("/api/onboarding/submit", body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let id = body["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/onboarding/{}", id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let record: Value = test::read_body_json(resp).await;
    assert_eq!(record["email"], json!("jane@example.com"));
    assert_eq!(record["hasExperience"], json!(false));
    assert!(record["idProof"].as_str().unwrap().starts_with("documents/"));
}

#[actix_web::test]
async fn onboarding_nested_sections_round_trip() {
    let (store, files, _dir) = fixtures();
    let app = app!(store, files);

    let body = multipart_body(
        &[
            ("email", "sam@example.com"),
            ("hasExperience", "on"),
            ("experience[0][company]", "Acme"),
            ("experience[0][startDate]", "2022-01-10"),
            ("experience[0][endDate]", "2024-03-01"),
            ("education[ssc][school]", "Hillside High"),
        ],
        &[
            ("idProof", "id.png", b"\x89PNG id"),
            ("resume", "cv.pdf", b"%PDF cv"),
            ("signedDocument", "offer.pdf", b"%PDF offer"),
            ("education[ssc][certificate]", "ssc.jpg", b"\xff\xd8 ssc"),
            ("experience[0][certificate]", "relieving.pdf", b"%PDF rel"),
            ("experience[0][salarySlips]", "jan.pdf", b"%PDF jan"),
            ("experience[0][salarySlips]", "feb.pdf", b"%PDF feb"),
        ],
    );
    let resp = test::call_service(
        &app,
        multipart_request("/api/onboarding/submit", body).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let id = body["id"].as_str().unwrap().to_string();

    let record: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/onboarding/{}", id))
            .to_request(),
    )
    .await;
    let entry = &record["experience"][0];
    assert_eq!(entry["company"], json!("Acme"));
    assert_eq!(entry["salarySlips"].as_array().unwrap().len(), 2);
    assert!(record["education"]["ssc"]["certificate"]
        .as_str()
        .unwrap()
        .starts_with("education/"));
}

#[actix_web::test]
async fn stored_uploads_are_served_and_traversal_is_not() {
    let (store, files, dir) = fixtures();
    let app = app!(store, files);

    std::fs::write(dir.path().join("documents/abc_cv.pdf"), b"%PDF served").unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/uploads/documents/abc_cv.pdf")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(test::read_body(resp).await.as_ref(), b"%PDF served");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/uploads/documents/..%2Fsecret")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/uploads/nope/file.pdf")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}
