use std::time::Duration;

use botlink_linking::domain::repository::LinkingCodeRepository;
use botlink_linking::domain::types::LinkPayload;
use botlink_linking::error::LinkingServiceError;
use botlink_linking::usecase::linking::GenerateCodeUseCase;

use crate::helpers::{Registry, is_linking_code, scripted_draws, test_payload, test_start};

#[tokio::test]
async fn should_generate_code_expiring_in_five_minutes() {
    let registry = Registry::new();

    let out = registry.generator().execute(test_payload()).await.unwrap();

    assert!(is_linking_code(&out.code), "bad code {:?}", out.code);
    assert_eq!(out.expires_at, test_start() + chrono::Duration::minutes(5));
    assert_eq!(out.owner_id, format!("user_{}", test_start().timestamp_millis()));
    assert_eq!(
        registry.codes.count_active(test_start()).await.unwrap(),
        1,
        "expected exactly one live code"
    );
}

#[tokio::test]
async fn should_arm_one_expiry_timer_per_code() {
    let registry = Registry::new();

    registry.generator().execute(LinkPayload::default()).await.unwrap();
    registry.generator().execute(LinkPayload::default()).await.unwrap();

    assert_eq!(registry.scheduler.armed(), 2);
    assert_eq!(
        registry.scheduler.delays(),
        vec![Duration::from_secs(300), Duration::from_secs(300)]
    );
}

#[tokio::test]
async fn should_bind_payload_to_code() {
    let registry = Registry::new();

    let out = registry.generator().execute(test_payload()).await.unwrap();
    let taken = registry
        .codes
        .take_valid(&out.code, test_start())
        .await
        .unwrap()
        .expect("code should be live");

    assert_eq!(taken.payload, test_payload());
    assert_eq!(taken.owner_id, out.owner_id);
}

#[tokio::test]
async fn should_redraw_when_code_collides_with_live_one() {
    let registry = Registry::new();
    let first = GenerateCodeUseCase {
        codes: registry.codes.clone(),
        clock: registry.clock.clone(),
        draw: scripted_draws(&["SAMECODE"]),
    };
    first.execute(LinkPayload::default()).await.unwrap();

    let second = GenerateCodeUseCase {
        codes: registry.codes.clone(),
        clock: registry.clock.clone(),
        draw: scripted_draws(&["SAMECODE", "SAMECODE", "FRESH001"]),
    };
    let out = second.execute(LinkPayload::default()).await.unwrap();

    assert_eq!(out.code, "FRESH001");
    assert_eq!(registry.codes.count_active(test_start()).await.unwrap(), 2);
}

#[tokio::test]
async fn should_fail_when_every_draw_collides() {
    let registry = Registry::new();
    let usecase = GenerateCodeUseCase {
        codes: registry.codes.clone(),
        clock: registry.clock.clone(),
        draw: scripted_draws(&["STUCK001"]),
    };
    usecase.execute(LinkPayload::default()).await.unwrap();

    let result = usecase.execute(LinkPayload::default()).await;

    assert!(
        matches!(result, Err(LinkingServiceError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert_eq!(registry.codes.count_active(test_start()).await.unwrap(), 1);
}

#[tokio::test]
async fn should_reuse_key_of_an_expired_code() {
    let registry = Registry::new();
    let usecase = GenerateCodeUseCase {
        codes: registry.codes.clone(),
        clock: registry.clock.clone(),
        draw: scripted_draws(&["REUSE001"]),
    };
    usecase.execute(LinkPayload::default()).await.unwrap();

    registry.clock.advance(chrono::Duration::seconds(301));
    let out = usecase.execute(test_payload()).await.unwrap();

    assert_eq!(out.code, "REUSE001");
    // The replaced entry's timer was cancelled; only the new one is armed.
    assert_eq!(registry.scheduler.armed(), 1);
}
