use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::model::attendance::AttendanceSummary;
use common::model::outcome::SessionsOverview;
use common::model::student::Student;
use common::requests::LoginResponse;
use rollcall::attendance::SessionManager;
use rollcall::auth::AdminCredentials;
use rollcall::config::AppConfig;
use rollcall::db::Database;
use rollcall::job_controller::state::JobsState;
use rollcall::reports::ReportArchive;
use rollcall::services;
use rollcall::students::{directory, import};
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;

const ROSTER: &str = "Name,Domain,Joining Date,Category,IEEE ID\n\
                      Ada Lovelace,Web,2024-09-01,Member,A\n\
                      Brian Kernighan,Systems,2024-09-01,Member,B\n\
                      Chen Ning,AI,2024-10-15,Volunteer,C\n";

struct Harness {
    _dir: TempDir,
    config: AppConfig,
    db: Database,
    manager: SessionManager,
    jobs: JobsState,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::from_lookup(|key| match key {
        "ADMIN_PASSWORD" => Some("pw".into()),
        "DATABASE_PATH" => Some(dir.path().join("db.sqlite").display().to_string()),
        "REPORTS_DIR" => Some(dir.path().join("reports").display().to_string()),
        _ => None,
    })
    .unwrap();
    let db = Database::open(&config.database_path).unwrap();
    let students = import::parse_students(ROSTER.as_bytes(), &config.public_url).unwrap();
    directory::replace_all(&mut db.connect().unwrap(), &students)
        .unwrap()
        .unwrap();
    let manager = SessionManager::new(
        db.clone(),
        ReportArchive::new(&config.reports_dir),
        Duration::from_secs(180),
    );
    Harness {
        _dir: dir,
        config,
        db,
        manager,
        jobs: JobsState::spawn(),
    }
}

macro_rules! app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($h.config.clone()))
                .app_data(web::Data::new($h.db.clone()))
                .app_data(web::Data::new($h.manager.clone()))
                .app_data(web::Data::new($h.jobs.clone()))
                .app_data(web::Data::new(AdminCredentials::new("admin", "pw")))
                .service(services::admin::configure_routes())
                .service(services::jobs::configure_routes())
                .service(services::students::configure_routes())
                .service(services::attendance::configure_routes()),
        )
        .await
    };
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_web::test]
async fn admin_routes_need_a_token() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/attendance/sessions")
        .set_json(json!({ "event_id": "2025-01-01" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .set_json(json!({ "username": "admin", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn session_walkthrough_over_http() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .set_json(json!({ "username": "admin", "password": "pw" }))
        .to_request();
    let LoginResponse { token } = test::call_and_read_body_json(&app, req).await;

    // Nothing is live yet.
    let req = test::TestRequest::post()
        .uri("/api/attendance/2025-01-01/self")
        .set_json(json!({ "student_id": "A", "status": "Present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/attendance/sessions")
        .insert_header(bearer(&token))
        .set_json(json!({ "event_id": "2025-01-01" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/attendance/sessions")
        .insert_header(bearer(&token))
        .set_json(json!({ "event_id": "2025-01-01" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outcome"], "already_active");

    let req = test::TestRequest::post()
        .uri("/api/attendance/2025-01-01/self")
        .set_json(json!({ "student_id": "A", "status": "Present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Scanning A's card again flips the same row.
    let student: Student = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/students/A").to_request(),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/attendance/2025-01-01/scan")
        .set_json(json!({ "payload": student.qr_payload, "status": "Absent" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/attendance/2025-01-01/self")
        .set_json(json!({ "student_id": "Z", "status": "Present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let summary: AttendanceSummary = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/attendance/2025-01-01/summary")
            .to_request(),
    )
    .await;
    assert_eq!(
        summary,
        AttendanceSummary {
            total: 1,
            present: 0,
            absent: 1
        }
    );

    let req = test::TestRequest::delete()
        .uri("/api/attendance/sessions/2025-01-01")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Finalized").unwrap(), "true");
    let report = test::read_body(resp).await;
    assert_eq!(&report[..], b"student_id,name,status\nA,Ada Lovelace,Absent\n");

    let req = test::TestRequest::delete()
        .uri("/api/attendance/sessions/2025-01-01")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("X-Finalized").unwrap(), "false");

    let overview: SessionsOverview = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/attendance/sessions")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert!(overview.active.is_empty());
    assert_eq!(overview.finalized, 1);
}

#[actix_web::test]
async fn manual_marks_and_bad_input() {
    let h = harness();
    let app = app!(h);
    let token = rollcall::auth::token_for("admin", "pw");

    let req = test::TestRequest::post()
        .uri("/api/attendance/backfill/manual")
        .insert_header(bearer(&token))
        .set_json(json!({ "student_id": "C", "status": "present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/attendance/backfill/manual")
        .insert_header(bearer(&token))
        .set_json(json!({ "student_id": "C", "status": "late" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/attendance/backfill/scan")
        .set_json(json!({ "payload": "not a card" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let events: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/attendance/events")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(events[0]["event_id"], "backfill");
    assert_eq!(events[0]["summary"]["present"], 1);
}

#[actix_web::test]
async fn student_lookup_routes() {
    let h = harness();
    let app = app!(h);
    let token = rollcall::auth::token_for("admin", "pw");

    let found: Vec<Student> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/students/search?name=kern")
            .to_request(),
    )
    .await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "B");

    let all: Vec<Student> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/students")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(all.len(), 3);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/students/nobody").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/jobs/unknown").insert_header(bearer(&token)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
