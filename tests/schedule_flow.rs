//! End-to-end retrieval against a stub upstream that behaves itself.

mod helpers;

use axum::Router;
use axum::http::header;
use helpers::{StubSolver, config_for, serve, session_with};
use serde_json::json;
use std::time::Duration;
use univer::univer::UniverApi;
use univer::univer::models::Course;
use univer::univer::time::SEMESTER_START;

fn json_upstream(body: serde_json::Value) -> Router {
    Router::new().fallback(move || {
        let body = body.clone();
        async move {
            (
                [(header::CONTENT_TYPE, "application/json")],
                body.to_string(),
            )
        }
    })
}

async fn api_for(router: Router) -> UniverApi {
    let addr = serve(router).await;
    let session = session_with(StubSolver::new(), Duration::from_secs(60));
    UniverApi::new(&config_for(addr), session).unwrap()
}

#[tokio::test]
async fn student_schedule_comes_back_ordered_by_date() {
    let api = api_for(json_upstream(json!({
        "1": {
            "date": 20240102, "name": "Algebra", "sub_group": 0,
            "audience": "214", "building": 2, "number": 1, "type": 1,
        },
        "0": {
            "date": 20240101, "name": "Physics", "sub_group": 1,
            "audience": "301", "building": 1, "number": 2, "type": 2,
            "zoom_link": "https://example.org/z", "zoom_password": "123",
        },
        "nedela": 14,
    })))
    .await;

    let result = api.get_schedule_student(42, 0).await.unwrap().unwrap();

    assert_eq!(result.week_start.timestamp(), SEMESTER_START);
    let dates: Vec<u32> = result.entries.iter().map(|e| e.date).collect();
    assert_eq!(dates, [20240101, 20240102]);
    assert_eq!(result.entries[0].subjects[0].name, "Physics");
    assert_eq!(
        result.entries[0].subjects[0].zoom_link.as_deref(),
        Some("https://example.org/z")
    );
}

#[tokio::test]
async fn employee_schedule_uses_the_same_normalization() {
    let api = api_for(json_upstream(json!({
        "0": {
            "date": 20240105, "name": "Consultation", "sub_group": 0,
            "audience": "105", "building": 1, "number": 1, "type": 3,
        },
    })))
    .await;

    let result = api.get_schedule_employee(17, -2).await.unwrap().unwrap();
    assert_eq!(result.entries.len(), 1);
    assert!(result.week_start.timestamp() < SEMESTER_START);
}

#[tokio::test]
async fn student_exams_come_back_ordered_by_time() {
    let exam = |time: &str, name: &str| {
        json!({
            "day": 3, "date": 20240115, "name": name, "sub_group": 0,
            "dislocation": "bldg 1, room 301", "number": 1, "type": 4, "time": time,
        })
    };
    let api = api_for(json_upstream(json!([
        exam("14:00", "Analysis"),
        exam("09:30", "Algebra"),
        exam("11:00", "Physics"),
    ])))
    .await;

    let exams = api.get_exams_student(42).await.unwrap().unwrap();
    let times: Vec<&str> = exams.iter().map(|e| e.time.as_str()).collect();
    assert_eq!(times, ["09:30", "11:00", "14:00"]);
    assert_eq!(exams[0].name, "Algebra");
}

#[tokio::test]
async fn directory_listings_parse_without_reordering() {
    let api = api_for(json_upstream(json!([
        { "id": 9, "title": "Physics and Mathematics", "short_title": "PhM" },
        { "id": 3, "title": "Humanities", "short_title": "Hum" },
    ])))
    .await;

    let faculties = api.get_faculties().await.unwrap().unwrap();
    assert_eq!(faculties.len(), 2);
    assert_eq!(faculties[0].id, 9);
    assert_eq!(faculties[1].short_title, "Hum");
}

#[tokio::test]
async fn group_listing_takes_a_course_year() {
    let api = api_for(json_upstream(json!([
        { "id": 1201, "name": "72-KB", "direction": "Cybersecurity", "course": 2, "level": 1 },
    ])))
    .await;

    let groups = api.get_groups(7, Course::Second).await.unwrap().unwrap();
    assert_eq!(groups[0].name, "72-KB");
}

#[tokio::test]
async fn single_employee_is_a_bare_object() {
    let api = api_for(json_upstream(json!({
        "id": 17, "name": "Ivan", "second_name": "Petrov", "middle_name": "Sergeevich",
    })))
    .await;

    let employee = api.get_employee(17).await.unwrap().unwrap();
    assert_eq!(employee.second_name, "Petrov");
}

#[tokio::test]
async fn empty_dataset_is_not_no_data() {
    let api = api_for(json_upstream(json!({}))).await;

    // Parsed-but-empty: the portal answered, there are just no entries.
    let result = api.get_schedule_student(42, 0).await.unwrap();
    let result = result.expect("an empty schedule must stay distinct from NoData");
    assert!(result.entries.is_empty());
}

#[tokio::test]
async fn malformed_rows_fail_the_call_with_no_partial_results() {
    let api = api_for(json_upstream(json!({
        "0": {
            "date": 20240101, "name": "Fine", "sub_group": 0,
            "audience": "301", "building": 1, "number": 1, "type": 1,
        },
        "1": { "date": "garbage" },
    })))
    .await;

    let err = api.get_schedule_student(42, 0).await.unwrap_err();
    assert!(matches!(
        err,
        univer::univer::UniverError::MalformedPayload { .. }
    ));
}
