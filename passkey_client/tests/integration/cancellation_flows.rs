use std::sync::Arc;
use std::time::Duration;

use passkey_client::{
    AlwaysSupported, CeremonyRegistry, ErrorCode, RegistrationClient, RegistrationError,
};

use crate::common::{GatedPlatform, sample_credential, sample_options, wait_for_calls};

fn client_for(platform: &Arc<GatedPlatform>) -> RegistrationClient {
    RegistrationClient::new(platform.clone(), Arc::new(AlwaysSupported))
}

/// Test that a second ceremony cancels the first exactly once
///
/// The first ceremony's platform call ignores cancellation, so it still
/// settles successfully once released: cancelling is a request, not a
/// suppression of the superseded ceremony's result.
#[tokio::test]
async fn test_back_to_back_ceremonies_cancel_first_once() {
    let platform = Arc::new(GatedPlatform::new(sample_credential(), false));
    let client = client_for(&platform);

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.start_registration(sample_options()).await }
    });
    wait_for_calls(&platform, 1).await;
    assert_eq!(platform.cancelled_flags(), vec![false]);

    let second = tokio::spawn({
        let client = client.clone();
        async move { client.start_registration(sample_options()).await }
    });
    wait_for_calls(&platform, 2).await;

    assert_eq!(platform.cancelled_flags(), vec![true, false]);

    platform.release_one();
    platform.release_one();

    let first = first.await.unwrap().expect("superseded ceremony still settles");
    let second = second.await.unwrap().expect("second ceremony succeeds");
    assert_eq!(first.raw_id, "Zm9vYmFy");
    assert_eq!(second.raw_id, "Zm9vYmFy");

    assert_eq!(platform.settled(), 2);
    // Exactly one signal fired over the whole run
    assert_eq!(
        platform.cancelled_flags().iter().filter(|fired| **fired).count(),
        1
    );
    assert_eq!(client.registry().current(), None);
}

/// Test that each new start cancels only the most recent pending ceremony
#[tokio::test]
async fn test_each_start_cancels_only_latest_pending() {
    let platform = Arc::new(GatedPlatform::new(sample_credential(), false));
    let client = client_for(&platform);
    let mut handles = Vec::new();

    for started in 1..=3 {
        handles.push(tokio::spawn({
            let client = client.clone();
            async move { client.start_registration(sample_options()).await }
        }));
        wait_for_calls(&platform, started).await;

        let fired = platform.cancelled_flags().iter().filter(|f| **f).count();
        assert_eq!(fired, started - 1);
        assert_eq!(platform.cancelled_flags().last(), Some(&false));
    }

    assert_eq!(platform.cancelled_flags(), vec![true, true, false]);

    for _ in 0..3 {
        platform.release_one();
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
}

/// Test that a platform honoring the signal yields CEREMONY_ABORTED for the
/// superseded ceremony while the new ceremony succeeds
#[tokio::test]
async fn test_superseded_ceremony_reports_abort() {
    let platform = Arc::new(GatedPlatform::new(sample_credential(), true));
    let client = client_for(&platform);

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.start_registration(sample_options()).await }
    });
    wait_for_calls(&platform, 1).await;

    let second = tokio::spawn({
        let client = client.clone();
        async move { client.start_registration(sample_options()).await }
    });

    let first_err = tokio::time::timeout(Duration::from_secs(5), first)
        .await
        .expect("first ceremony should settle after cancellation")
        .unwrap()
        .unwrap_err();
    match first_err {
        RegistrationError::Classified(e) => {
            assert_eq!(e.code, ErrorCode::CeremonyAborted);
            assert_eq!(e.name, "AbortError");
        }
        other => panic!("Unexpected error: {other:?}"),
    }

    wait_for_calls(&platform, 2).await;
    platform.release_one();
    let second = second.await.unwrap().unwrap();
    assert_eq!(second.id, "Zm9vYmFy");
    assert_eq!(client.registry().current(), None);
}

/// Test that an explicit cancel aborts the pending ceremony
#[tokio::test]
async fn test_manual_cancel_ceremony() {
    let platform = Arc::new(GatedPlatform::new(sample_credential(), true));
    let client = client_for(&platform);

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.start_registration(sample_options()).await }
    });
    wait_for_calls(&platform, 1).await;

    assert!(client.cancel_ceremony());
    assert!(!client.cancel_ceremony());

    let err = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("cancelled ceremony should settle")
        .unwrap()
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::CeremonyAborted));
}

/// Test that clients sharing a registry cancel each other's ceremonies
#[tokio::test]
async fn test_shared_registry_across_clients() {
    let registry = CeremonyRegistry::new();
    let platform = Arc::new(GatedPlatform::new(sample_credential(), false));
    let first_client = client_for(&platform).with_registry(registry.clone());
    let second_client = client_for(&platform).with_registry(registry.clone());
    let isolated_client = client_for(&platform);

    let first =
        tokio::spawn(async move { first_client.start_registration(sample_options()).await });
    wait_for_calls(&platform, 1).await;

    // A client with its own registry does not touch the shared one
    let isolated =
        tokio::spawn(async move { isolated_client.start_registration(sample_options()).await });
    wait_for_calls(&platform, 2).await;
    assert_eq!(platform.cancelled_flags(), vec![false, false]);

    let second =
        tokio::spawn(async move { second_client.start_registration(sample_options()).await });
    wait_for_calls(&platform, 3).await;
    assert_eq!(platform.cancelled_flags(), vec![true, false, false]);

    for _ in 0..3 {
        platform.release_one();
    }
    assert!(first.await.unwrap().is_ok());
    assert!(isolated.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());
    assert_eq!(registry.current(), None);
}
