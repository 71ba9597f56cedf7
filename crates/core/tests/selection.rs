use peersel_api::ring::distance;
use peersel_api::*;
use peersel_core::factories::CoreSelectionReport;
use peersel_core::{default_builder, PeerSelector};
use peersel_test_utils::enable_tracing;
use peersel_test_utils::id::{random_doc_id, random_term_id};
use peersel_test_utils::peer::PeerBuilder;
use std::collections::HashSet;
use std::sync::Arc;

async fn selector(
    partition_exponent: u8,
    local: Arc<PeerInfo>,
    peers: Vec<Arc<PeerInfo>>,
) -> PeerSelector {
    let mut builder = default_builder();
    builder
        .config
        .set_module_config(&SelectorModConfig {
            selector: SelectorConfig {
                partition_exponent,
                ..Default::default()
            },
        })
        .unwrap();

    let selector = PeerSelector::create(builder.build(), local).await.unwrap();
    selector.directory().insert(peers).unwrap();
    selector
}

#[tokio::test(flavor = "multi_thread")]
async fn default_config_is_complete() {
    let mut builder = default_builder();
    builder.set_default_config().unwrap();
    builder.validate_config().unwrap();

    let m: SelectorModConfig = builder.config.get_module_config().unwrap();
    assert_eq!(SelectorConfig::default(), m.selector);

    // contributing the selector defaults twice is a conflict
    assert!(builder.set_default_config().is_err());

    let s = PeerSelector::create(builder.build(), PeerBuilder::at(9).build())
        .await
        .unwrap();
    assert_eq!(16, s.scheme().partition_count());
    assert_eq!(9, s.directory().local_peer().loc());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_invalid_config() {
    let mut builder = default_builder();
    builder
        .config
        .set_module_config(&SelectorModConfig {
            selector: SelectorConfig {
                dedup_capacity: 0,
                ..Default::default()
            },
        })
        .unwrap();
    assert!(PeerSelector::create(builder.build(), PeerBuilder::at(9).build())
        .await
        .is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn config_loads_from_json() {
    let mut builder = default_builder();
    builder.config = serde_json::from_str(
        r#"{
            "selector": {
                "partitionExponent": 2,
                "maxTargetsPerPosition": 1,
                "someFutureKey": true
            }
        }"#,
    )
    .unwrap();

    let s = PeerSelector::create(builder.build(), PeerBuilder::at(9).build())
        .await
        .unwrap();
    assert_eq!(4, s.scheme().partition_count());
    assert_eq!(1, s.config().max_targets_per_position);
    assert_eq!(1000, s.config().age_scan_limit);

    s.directory().insert(random_peers(10)).unwrap();
    let t = s.select_targets(&random_term_id(), 3);
    assert!(t.peers.len() <= 4);
}

fn random_peers(count: usize) -> Vec<Arc<PeerInfo>> {
    (0..count).map(|_| PeerBuilder::default().build()).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn default_builder_selects_targets() {
    enable_tracing();

    let s = selector(
        0,
        PeerBuilder::default().build(),
        [100, 200, 300, 400, 500]
            .iter()
            .map(|l| PeerBuilder::at(*l).build())
            .collect(),
    )
    .await;

    let t = s.select_targets(&peersel_test_utils::id::term_id_at(250), 3);
    let got: Vec<(u32, u64)> = t
        .ranked()
        .iter()
        .map(|p| (p.loc(), t.ranking.get(&p.peer).unwrap()))
        .collect();
    assert_eq!(vec![(300, 6), (400, 4), (500, 2)], got);
}

#[tokio::test(flavor = "multi_thread")]
async fn each_partition_contributes_bounded_targets() {
    let s =
        selector(4, PeerBuilder::default().build(), random_peers(200)).await;

    for _ in 0..20 {
        let key = random_term_id();
        let t = s.select_targets(&key, 5);
        // 16 positions, at most 3 peers each
        assert!(t.peers.len() <= 16 * 3);
        assert!(t.peers.len() >= 3);
        let total: u64 =
            t.peers.keys().map(|p| t.ranking.get(p).unwrap()).sum();
        assert!(total <= 16 * (10 + 8 + 6));
        for p in t.peers.values() {
            assert!(p.flags.accept_remote_index);
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn enumeration_never_repeats_and_stays_in_bounds() {
    let mut peers = random_peers(60);
    peers.extend((0..20).map(|_| {
        PeerBuilder::default()
            .with_accept_remote_index(false)
            .build()
    }));
    let s = selector(4, PeerBuilder::default().build(), peers).await;
    let connected = s.directory().connected_count();
    assert_eq!(80, connected);

    for _ in 0..20 {
        let start = random_term_id();
        let list = s.accept_remote_index_list(&start, usize::MAX, false);
        assert_eq!(60, list.len());

        let unique: HashSet<PeerId> =
            list.iter().map(|p| p.peer.clone()).collect();
        assert_eq!(list.len(), unique.len());

        // ordered clockwise from the start
        let ranks: Vec<u32> =
            list.iter().map(|p| distance(start.loc(), p.loc())).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));

        let list = s.accept_remote_index_list(&start, usize::MAX, true);
        assert_eq!(61, list.len());
        let local = s.directory().local_peer();
        assert_eq!(1, list.iter().filter(|p| p.peer == local.peer).count());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn ownership_is_decided_by_guess_then_verification() {
    let s =
        selector(4, PeerBuilder::default().build(), random_peers(50)).await;
    let report = s
        .report()
        .as_any()
        .downcast_ref::<CoreSelectionReport>()
        .unwrap();

    let mut guessed = 0;
    for _ in 0..200 {
        let key = random_term_id();
        let doc = random_doc_id();
        let own = s.shall_be_own_word(&key, &doc, 3);
        if s.guess_if_own_word(&key, &doc) {
            guessed += 1;
            assert_eq!(s.verify_if_own_word(&key, &doc, 3), own);
        } else {
            assert!(!own);
        }
    }
    assert_eq!(guessed, report.guessed_own_count());
}

#[tokio::test(flavor = "multi_thread")]
async fn alone_the_local_peer_owns_everything() {
    let s = selector(4, PeerBuilder::default().build(), vec![]).await;

    for _ in 0..10 {
        let key = random_term_id();
        let doc = random_doc_id();
        assert!(s.guess_if_own_word(&key, &doc));
        assert!(s.shall_be_own_word(&key, &doc, 3));
        assert!(s.select_targets(&key, 3).is_empty());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn ages_are_ranked_oldest_first() {
    let now = Timestamp::now();
    let ago = |m: u64| Some(now - std::time::Duration::from_secs(m * 60));
    let s = selector(
        4,
        PeerBuilder::default().build(),
        vec![
            PeerBuilder::at(3).with_last_seen(ago(10)).build(),
            PeerBuilder::at(2).with_last_seen(ago(60)).build(),
            PeerBuilder::at(1).with_last_seen(ago(1440)).build(),
        ],
    )
    .await;

    let got: Vec<u32> = s
        .peers_by_age_at(now, false, 2)
        .iter()
        .map(|p| p.loc())
        .collect();
    assert_eq!(vec![1, 2], got);
}
