mod support;

use std::time::Duration;

use cinelog_core::domain::{StreamingService, WatchLocation, WatchTag, WatchTarget};
use cinelog_core::providers::ProviderError;
use cinelog_core::webhook::{SkipReason, WebhookError, WebhookOutcome};
use futures::future::join_all;
use support::{
    API_KEY, DISABLED_KEY, StubProvider, episode_body, harness, movie_body,
};

#[tokio::test]
async fn movie_at_eighty_percent_creates_movie_and_one_watch() {
    let h = harness(StubProvider::default().with_matrix()).await;

    let outcome = h
        .gateway
        .handle_movie_playback_event(
            Some(API_KEY),
            &movie_body("603", 10_000_000_000, 8_000_000_000),
        )
        .await
        .unwrap();

    let WebhookOutcome::MovieRecorded { movie, recorded } = outcome else {
        panic!("expected a recorded movie");
    };
    assert_eq!(movie.title, "The Matrix");
    assert_eq!(movie.release_year, Some(1999));
    assert_eq!(movie.director.as_deref(), Some("Lana Wachowski"));
    assert_eq!(
        movie.cast,
        vec!["Keanu Reeves", "Laurence Fishburne", "Carrie-Anne Moss"]
    );
    assert_eq!(movie.genres, vec!["Action", "Science Fiction"]);
    assert!(movie.poster_path.is_none());

    assert_eq!(recorded.watch.user_id, h.user_id);
    assert_eq!(recorded.watch.target, WatchTarget::Movie { movie_id: movie.id });
    assert_eq!(recorded.watch.watch_location, WatchLocation::Home);
    assert_eq!(recorded.watch.streaming_service, StreamingService::MediaLibrary);
    assert_eq!(recorded.watch.tags, vec![WatchTag::Webhook, WatchTag::Automated]);

    assert_eq!(h.backend.catalog.movie_count().await, 1);
    assert_eq!(h.backend.watches.count().await, 1);
}

#[tokio::test]
async fn movie_at_ten_percent_is_skipped_without_writes() {
    let h = harness(StubProvider::default().with_matrix()).await;

    let outcome = h
        .gateway
        .handle_movie_playback_event(
            Some(API_KEY),
            &movie_body("603", 10_000_000_000, 1_000_000_000),
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        WebhookOutcome::Skipped {
            reason: SkipReason::BelowThreshold { .. }
        }
    ));
    assert_eq!(h.backend.catalog.movie_count().await, 0);
    assert_eq!(h.backend.watches.count().await, 0);
    assert_eq!(h.provider.calls(), (0, 0, 0));
}

#[tokio::test]
async fn invalid_and_disabled_keys_write_nothing() {
    let h = harness(StubProvider::default().with_matrix()).await;
    let body = movie_body("603", 100, 90);

    let err = h
        .gateway
        .handle_movie_playback_event(Some("wrong"), &body)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid API key");

    let err = h
        .gateway
        .handle_movie_playback_event(Some(DISABLED_KEY), &body)
        .await
        .unwrap_err();
    assert!(matches!(err, WebhookError::Authorization(_)));
    assert_eq!(err.to_string(), "Webhook is disabled");

    assert_eq!(h.backend.watches.count().await, 0);
    assert_eq!(h.backend.catalog.movie_count().await, 0);
}

#[tokio::test]
async fn repeated_deliveries_reuse_the_movie_but_append_watches() {
    let h = harness(StubProvider::default().with_matrix()).await;
    let body = movie_body("603", 100, 95);

    for _ in 0..3 {
        h.gateway
            .handle_movie_playback_event(Some(API_KEY), &body)
            .await
            .unwrap();
    }

    assert_eq!(h.backend.catalog.movie_count().await, 1);
    assert_eq!(h.backend.watches.count().await, 3);
    assert_eq!(h.provider.calls().0, 1);
}

#[tokio::test]
async fn concurrent_first_deliveries_create_one_movie() {
    let h = harness(
        StubProvider::default()
            .with_matrix()
            .with_latency(Duration::from_millis(25)),
    )
    .await;
    let body = movie_body("603", 100, 80);

    let results = join_all(
        (0..8).map(|_| h.gateway.handle_movie_playback_event(Some(API_KEY), &body)),
    )
    .await;

    let mut movie_ids = results
        .into_iter()
        .map(|result| match result.unwrap() {
            WebhookOutcome::MovieRecorded { movie, .. } => movie.id,
            other => panic!("unexpected outcome {other:?}"),
        })
        .collect::<Vec<_>>();
    movie_ids.dedup();

    assert_eq!(movie_ids.len(), 1);
    assert_eq!(h.backend.catalog.movie_count().await, 1);
    assert_eq!(h.backend.watches.count().await, 8);
    assert_eq!(h.provider.calls().0, 1);
}

#[tokio::test]
async fn first_episode_request_creates_whole_season() {
    let h = harness(StubProvider::default().with_show(95396, 1, &[1, 2, 3, 4])).await;

    let outcome = h
        .gateway
        .handle_episode_playback_event(Some(API_KEY), &episode_body(95396, 1, 2, 90))
        .await
        .unwrap();

    let WebhookOutcome::EpisodeRecorded { episode, recorded } = outcome else {
        panic!("expected a recorded episode");
    };
    assert_eq!(episode.show.title, "Severance");
    assert_eq!(episode.show.network.as_deref(), Some("Apple TV+"));
    assert_eq!(episode.season.season_number, 1);
    assert_eq!(episode.season.episode_count, Some(4));
    assert_eq!(episode.episode.episode_number, 2);
    assert_eq!(episode.episode.name.as_deref(), Some("Episode 2"));
    assert!(!episode.stub_created);
    assert_eq!(
        recorded.watch.target,
        WatchTarget::Episode {
            tv_show_id: episode.show.id,
            episode_id: episode.episode.id,
        }
    );

    assert_eq!(h.backend.catalog.show_count().await, 1);
    assert_eq!(h.backend.catalog.season_count().await, 1);
    assert_eq!(h.backend.catalog.episode_count().await, 4);
    assert_eq!(h.provider.calls(), (0, 1, 1));
}

#[tokio::test]
async fn episode_missing_from_provider_becomes_a_stub() {
    let h = harness(StubProvider::default().with_show(95396, 1, &[1, 2])).await;

    let outcome = h
        .gateway
        .handle_episode_playback_event(Some(API_KEY), &episode_body(95396, 1, 10, 100))
        .await
        .unwrap();

    let WebhookOutcome::EpisodeRecorded { episode, .. } = outcome else {
        panic!("expected a recorded episode");
    };
    assert!(episode.stub_created);
    assert!(episode.episode.is_stub());
    assert_eq!(episode.episode.episode_number, 10);
    assert_eq!(h.backend.catalog.episode_count().await, 3);
    assert_eq!(h.backend.watches.count().await, 1);
}

#[tokio::test]
async fn cached_season_is_refetched_for_a_new_episode() {
    let h = harness(StubProvider::default().with_show(95396, 1, &[1, 2])).await;
    h.gateway
        .handle_episode_playback_event(Some(API_KEY), &episode_body(95396, 1, 1, 100))
        .await
        .unwrap();

    // The stub keeps serving the old season list, so episode 3 ends up a stub
    // after exactly one extra season fetch.
    let outcome = h
        .gateway
        .handle_episode_playback_event(Some(API_KEY), &episode_body(95396, 1, 3, 100))
        .await
        .unwrap();
    let WebhookOutcome::EpisodeRecorded { episode, .. } = outcome else {
        panic!("expected a recorded episode");
    };
    assert!(episode.stub_created);
    assert_eq!(h.provider.calls(), (0, 1, 2));

    // Stubs are served as-is afterwards; no further provider traffic.
    let outcome = h
        .gateway
        .handle_episode_playback_event(Some(API_KEY), &episode_body(95396, 1, 3, 100))
        .await
        .unwrap();
    let WebhookOutcome::EpisodeRecorded { episode: again, .. } = outcome else {
        panic!("expected a recorded episode");
    };
    assert_eq!(again.episode.id, episode.episode.id);
    assert!(!again.stub_created);
    assert_eq!(h.provider.calls(), (0, 1, 2));
}

#[tokio::test]
async fn newly_aired_episode_is_added_from_a_refetched_season() {
    let h = harness(StubProvider::default().with_show(95396, 1, &[1, 2])).await;
    h.gateway
        .handle_episode_playback_event(Some(API_KEY), &episode_body(95396, 1, 1, 100))
        .await
        .unwrap();
    assert_eq!(h.backend.catalog.episode_count().await, 2);

    h.provider.publish_season(95396, 1, &[1, 2, 3]);

    let outcome = h
        .gateway
        .handle_episode_playback_event(Some(API_KEY), &episode_body(95396, 1, 3, 100))
        .await
        .unwrap();
    let WebhookOutcome::EpisodeRecorded { episode, .. } = outcome else {
        panic!("expected a recorded episode");
    };
    assert!(!episode.stub_created);
    assert!(!episode.episode.is_stub());
    assert_eq!(episode.episode.episode_number, 3);
    assert_eq!(episode.episode.name.as_deref(), Some("Episode 3"));
    assert_eq!(h.provider.calls(), (0, 1, 2));
    assert_eq!(h.backend.catalog.episode_count().await, 3);
    assert_eq!(h.backend.watches.count().await, 2);
}

#[tokio::test]
async fn concurrent_episode_deliveries_share_the_hierarchy() {
    let h = harness(
        StubProvider::default()
            .with_show(95396, 1, &[1, 2, 3])
            .with_latency(Duration::from_millis(20)),
    )
    .await;

    let bodies: Vec<Vec<u8>> = (1..=3)
        .flat_map(|n| [episode_body(95396, 1, n, 90), episode_body(95396, 1, n, 90)])
        .collect();
    let results = join_all(
        bodies
            .iter()
            .map(|body| h.gateway.handle_episode_playback_event(Some(API_KEY), body)),
    )
    .await;
    assert!(results.iter().all(Result::is_ok));

    assert_eq!(h.backend.catalog.show_count().await, 1);
    assert_eq!(h.backend.catalog.season_count().await, 1);
    assert_eq!(h.backend.catalog.episode_count().await, 3);
    assert_eq!(h.backend.watches.count().await, 6);
    assert_eq!(h.provider.calls(), (0, 1, 1));
}

#[tokio::test]
async fn unknown_movie_propagates_not_found() {
    let h = harness(StubProvider::default()).await;

    let err = h
        .gateway
        .handle_movie_playback_event(Some(API_KEY), &movie_body("999999", 100, 100))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::Metadata(ref e) if e.is_not_found()));
    assert!(matches!(
        err,
        WebhookError::Metadata(ProviderError::NotFound { .. })
    ));
    assert_eq!(h.backend.watches.count().await, 0);
}

#[tokio::test]
async fn unresolvable_show_id_is_skipped() {
    let h = harness(StubProvider::default()).await;

    let outcome = h
        .gateway
        .handle_episode_playback_event(
            Some(API_KEY),
            br#"{"tmdbId":"n/a","seasonNumber":1,"episodeNumber":1,"totalRunTimeInTicks":1,"currentRunTimeInTicks":1}"#,
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        WebhookOutcome::Skipped {
            reason: SkipReason::MissingExternalId
        }
    );
}
