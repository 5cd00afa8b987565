use botlink_linking::domain::types::LinkPayload;
use botlink_linking::error::LinkingServiceError;
use botlink_linking::usecase::linking::RegistryStats;

use crate::helpers::{Registry, test_payload};

#[tokio::test]
async fn should_validate_once_and_return_payload() {
    let registry = Registry::new();
    let generated = registry.generator().execute(test_payload()).await.unwrap();

    let out = registry
        .validator()
        .execute(Some(&generated.code))
        .await
        .unwrap();

    assert_eq!(out.payload, test_payload());
    assert_eq!(out.owner_id, generated.owner_id);
    assert_eq!(out.payload.user_name(), Some(&serde_json::json!("Ada")));
}

#[tokio::test]
async fn should_reject_second_validation() {
    let registry = Registry::new();
    let generated = registry.generator().execute(test_payload()).await.unwrap();
    registry
        .validator()
        .execute(Some(&generated.code))
        .await
        .unwrap();

    let result = registry.validator().execute(Some(&generated.code)).await;

    assert!(
        matches!(result, Err(LinkingServiceError::InvalidCode)),
        "expected InvalidCode, got {result:?}"
    );
}

#[tokio::test]
async fn should_accept_lowercase_and_padded_input() {
    let registry = Registry::new();
    let first = registry.generator().execute(LinkPayload::default()).await.unwrap();
    let second = registry.generator().execute(LinkPayload::default()).await.unwrap();

    let lower = first.code.to_ascii_lowercase();
    registry.validator().execute(Some(&lower)).await.unwrap();

    let padded = format!("  {}\n", second.code);
    registry.validator().execute(Some(&padded)).await.unwrap();
}

#[tokio::test]
async fn should_require_code() {
    let registry = Registry::new();

    for input in [None, Some(""), Some("   ")] {
        let result = registry.validator().execute(input).await;
        assert!(
            matches!(result, Err(LinkingServiceError::CodeRequired)),
            "expected CodeRequired for {input:?}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_reject_unknown_code() {
    let registry = Registry::new();

    let result = registry.validator().execute(Some("NOPE0000")).await;

    assert!(matches!(result, Err(LinkingServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_accept_code_at_expiry_instant() {
    let registry = Registry::new();
    let generated = registry.generator().execute(test_payload()).await.unwrap();

    registry.clock.advance(chrono::Duration::minutes(5));

    registry
        .validator()
        .execute(Some(&generated.code))
        .await
        .unwrap();
}

#[tokio::test]
async fn should_reject_expired_code_even_if_timer_never_fired() {
    let registry = Registry::new();
    let generated = registry.generator().execute(test_payload()).await.unwrap();

    registry
        .clock
        .advance(chrono::Duration::minutes(5) + chrono::Duration::milliseconds(1));
    let result = registry.validator().execute(Some(&generated.code)).await;

    assert!(
        matches!(result, Err(LinkingServiceError::InvalidCode)),
        "expected InvalidCode, got {result:?}"
    );
    // Lazy eviction cancels the pending timer.
    assert_eq!(registry.scheduler.armed(), 0);
}

#[tokio::test]
async fn should_reject_code_swept_by_timer() {
    let registry = Registry::new();
    let generated = registry.generator().execute(test_payload()).await.unwrap();

    assert_eq!(registry.scheduler.fire_all(), 1);
    assert_eq!(
        registry.stats().execute().await.unwrap().active_codes,
        0,
        "timer should have removed the entry"
    );

    let result = registry.validator().execute(Some(&generated.code)).await;
    assert!(matches!(result, Err(LinkingServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_cancel_timer_on_consumption() {
    let registry = Registry::new();
    let generated = registry.generator().execute(test_payload()).await.unwrap();
    assert_eq!(registry.scheduler.armed(), 1);

    registry
        .validator()
        .execute(Some(&generated.code))
        .await
        .unwrap();

    assert_eq!(registry.scheduler.armed(), 0);
    assert_eq!(registry.scheduler.fire_all(), 0);
}

#[tokio::test]
async fn should_count_linked_owners_and_live_codes() {
    let registry = Registry::new();
    let a = registry.generator().execute(test_payload()).await.unwrap();
    registry.clock.advance(chrono::Duration::milliseconds(5));
    let b = registry.generator().execute(test_payload()).await.unwrap();
    registry.generator().execute(test_payload()).await.unwrap();

    registry.validator().execute(Some(&a.code)).await.unwrap();
    registry.validator().execute(Some(&b.code)).await.unwrap();

    assert_eq!(
        registry.stats().execute().await.unwrap(),
        RegistryStats {
            active_codes: 1,
            linked_users: 2,
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_let_exactly_one_concurrent_validation_win() {
    let registry = Registry::new();
    let generated = registry.generator().execute(test_payload()).await.unwrap();

    let attempts = (0..32).map(|_| {
        let validator = registry.validator();
        let code = generated.code.clone();
        tokio::spawn(async move { validator.execute(Some(&code)).await })
    });
    let results = futures::future::join_all(attempts).await;

    let mut wins = 0;
    for result in results {
        match result.unwrap() {
            Ok(out) => {
                wins += 1;
                assert_eq!(out.payload, test_payload());
            }
            Err(LinkingServiceError::InvalidCode) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(wins, 1, "exactly one validation must succeed");
}
