use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use super::common::*;
use crate::identity::{COMPANY_HEADER, IDENTITY_HEADER};
use crate::ids::ApplicationId;
use crate::processes::ProcessStepType;
use crate::registration::domain::CompanyApplicationStatus;
use crate::registration::router::network_router;

fn submit_request(fixture: &Fixture) -> Request<Body> {
    Request::post("/api/registration/network/partnerRegistration/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .header(IDENTITY_HEADER, fixture.identity.identity_id.to_string())
        .header(COMPANY_HEADER, fixture.company_id.to_string())
        .body(Body::from(
            serde_json::to_vec(&fixture.submit_data()).expect("serialize payload"),
        ))
        .expect("request")
}

#[tokio::test]
async fn submit_route_returns_no_content() {
    let fixture = fixture();
    let router = network_router(Arc::new(fixture.service()));

    let response = router
        .oneshot(submit_request(&fixture))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        fixture.state().applications[&fixture.application_id].status,
        CompanyApplicationStatus::Submitted
    );
}

#[tokio::test]
async fn submit_route_requires_identity_headers() {
    let fixture = fixture();
    let router = network_router(Arc::new(fixture.service()));

    let response = router
        .oneshot(
            Request::post("/api/registration/network/partnerRegistration/submit")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&fixture.submit_data()).expect("serialize payload"),
                ))
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(fixture.store.save_count(), 0);
}

#[tokio::test]
async fn submit_route_reports_missing_agreements_as_bad_request() {
    let fixture = fixture();
    let router = network_router(Arc::new(fixture.service()));
    let mut data = fixture.submit_data();
    data.agreements.clear();

    let response = router
        .oneshot(
            Request::post("/api/registration/network/partnerRegistration/submit")
                .header(header::CONTENT_TYPE, "application/json")
                .header(IDENTITY_HEADER, fixture.identity.identity_id.to_string())
                .header(COMPANY_HEADER, fixture.company_id.to_string())
                .body(Body::from(serde_json::to_vec(&data).expect("serialize")))
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "NETWORK_ARG_ALL_AGREEMNTS_COMPANY_SHOULD_AGREED");
    assert_eq!(body["argument"], "agreements");
}

#[tokio::test]
async fn decline_route_accepts_empty_body() {
    let fixture = fixture();
    let router = network_router(Arc::new(fixture.service()));

    let response = router
        .oneshot(
            Request::post(format!(
                "/api/registration/network/{}/decline",
                fixture.application_id
            ))
            .header(IDENTITY_HEADER, fixture.identity.identity_id.to_string())
            .header(COMPANY_HEADER, fixture.company_id.to_string())
            .body(Body::empty())
            .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        fixture.state().applications[&fixture.application_id].status,
        CompanyApplicationStatus::CancelledByCustomer
    );
}

#[tokio::test]
async fn decline_route_rejects_malformed_body() {
    let fixture = fixture();
    let router = network_router(Arc::new(fixture.service()));

    let response = router
        .oneshot(
            Request::post(format!(
                "/api/registration/network/{}/decline",
                fixture.application_id
            ))
            .header(header::CONTENT_TYPE, "application/json")
            .header(IDENTITY_HEADER, fixture.identity.identity_id.to_string())
            .header(COMPANY_HEADER, fixture.company_id.to_string())
            .body(Body::from(r#"{"message": 42"#))
            .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        fixture.state().applications[&fixture.application_id].status,
        CompanyApplicationStatus::Created
    );
    assert_eq!(fixture.store.save_count(), 0);
}

#[tokio::test]
async fn decline_route_keeps_message_from_body() {
    let fixture = fixture();
    let router = network_router(Arc::new(fixture.service()));

    let response = router
        .oneshot(
            Request::post(format!(
                "/api/registration/network/{}/decline",
                fixture.application_id
            ))
            .header(header::CONTENT_TYPE, "application/json")
            .header(IDENTITY_HEADER, fixture.identity.identity_id.to_string())
            .header(COMPANY_HEADER, fixture.company_id.to_string())
            .body(Body::from(r#"{"message":"duplicate registration"}"#))
            .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let steps = fixture.registration_steps();
    let decline = steps
        .iter()
        .find(|step| step.step_type == ProcessStepType::ManualDeclineOsp)
        .expect("decline step");
    assert_eq!(decline.message.as_deref(), Some("duplicate registration"));
}

#[tokio::test]
async fn decline_route_returns_not_found_code() {
    let fixture = fixture();
    let router = network_router(Arc::new(fixture.service()));

    let response = router
        .oneshot(
            Request::post(format!(
                "/api/registration/network/{}/decline",
                ApplicationId::generate()
            ))
            .header(header::CONTENT_TYPE, "application/json")
            .header(IDENTITY_HEADER, fixture.identity.identity_id.to_string())
            .header(COMPANY_HEADER, fixture.company_id.to_string())
            .body(Body::from(r#"{"message":"duplicate registration"}"#))
            .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "NETWORK_COMPANY_APPLICATION_NOT_EXIST");
}
