// Directory Tests
// Tests for peer lookups, exclusion queries and recency-ordered selection

use peerbook::directory::{DirectoryError, PeerDirectory, GOSSIP_SAMPLE_SIZE, RECENT_WINDOW};
use peerbook::peer::{PeerRecord, PeerStatus};
use peerbook::storage::{MemoryPeerStore, PeerQuery, PeerStore};
use std::collections::HashSet;
use std::time::Duration;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn key(i: usize) -> String {
    format!("peer-key-{:02}", i)
}

fn no_keys() -> Vec<String> {
    Vec::new()
}

/// Discover peers one millisecond apart so `updated_at` is strictly increasing
async fn populate(
    directory: &PeerDirectory<MemoryPeerStore>,
    statuses: &[PeerStatus],
) -> Vec<PeerRecord> {
    let mut peers = Vec::new();
    for (i, status) in statuses.iter().enumerate() {
        let record = PeerRecord::new(&key(i), "beta", *status)
            .with_endpoint(&format!("BASIC_MERKLED_API 10.0.0.{} 9101", i + 1));
        peers.push(directory.discover(record).await.unwrap());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    peers
}

fn keys_of(peers: &[PeerRecord]) -> HashSet<String> {
    peers.iter().map(|p| p.public_key().to_string()).collect()
}

fn assert_newest_first(peers: &[PeerRecord]) {
    for pair in peers.windows(2) {
        assert!(pair[0].updated_at() >= pair[1].updated_at());
    }
}

// ============================================================================
// GET ONE
// ============================================================================

#[tokio::test]
async fn test_get_one_existing() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up, PeerStatus::Down]).await;

    let peer = directory.get_one(&key(1)).await.unwrap();
    assert_eq!(peer.public_key(), key(1));
    assert_eq!(peer.status(), PeerStatus::Down);
}

#[tokio::test]
async fn test_get_one_unknown_names_the_key() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up]).await;

    let err = directory.get_one("unknown-key").await.unwrap_err();
    assert!(matches!(&err, DirectoryError::NotFound(k) if k == "unknown-key"));
    assert!(err.to_string().contains("unknown-key"));
}

// ============================================================================
// UNIQUENESS
// ============================================================================

#[tokio::test]
async fn test_public_keys_stay_unique() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up, PeerStatus::New]).await;

    let duplicate = PeerRecord::new(&key(0), "beta", PeerStatus::Ask);
    assert!(matches!(
        directory.discover(duplicate).await,
        Err(DirectoryError::AlreadyKnown(_))
    ));

    // Re-saving an existing peer replaces it rather than adding a copy
    let mut existing = directory.get_one(&key(1)).await.unwrap();
    directory.save(&mut existing).await.unwrap();

    let all = directory.get_all_excluding(&no_keys()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(keys_of(&all).len(), all.len());
}

// ============================================================================
// SET MEMBERSHIP
// ============================================================================

#[tokio::test]
async fn test_get_by_keys() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up; 5]).await;

    let found = directory
        .get_by_keys(&[key(1), key(3), "missing".to_string()])
        .await
        .unwrap();

    assert_eq!(keys_of(&found), HashSet::from([key(1), key(3)]));
}

#[tokio::test]
async fn test_get_by_keys_empty() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up; 3]).await;

    assert!(directory.get_by_keys(&no_keys()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_all_excluding() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up; 4]).await;

    let found = directory.get_all_excluding(&[key(0), key(2)]).await.unwrap();
    assert_eq!(keys_of(&found), HashSet::from([key(1), key(3)]));

    let everyone = directory.get_all_excluding(&no_keys()).await.unwrap();
    assert_eq!(everyone.len(), 4);
}

// ============================================================================
// RECENT PEERS
// ============================================================================

#[tokio::test]
async fn test_recent_is_capped_and_ordered() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up; 15]).await;

    let recent = directory.get_recent_excluding(&no_keys(), None).await.unwrap();

    assert_eq!(recent.len(), RECENT_WINDOW);
    assert_newest_first(&recent);
    // The five oldest peers fall outside the window
    let expected: HashSet<String> = (5..15).map(key).collect();
    assert_eq!(keys_of(&recent), expected);
    assert_eq!(recent[0].public_key(), key(14));
}

#[tokio::test]
async fn test_recent_excludes_keys() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up; 12]).await;

    let recent = directory
        .get_recent_excluding(&[key(11), key(10)], None)
        .await
        .unwrap();

    assert_eq!(recent.len(), RECENT_WINDOW);
    assert_eq!(recent[0].public_key(), key(9));
    assert!(!keys_of(&recent).contains(&key(11)));
}

#[tokio::test]
async fn test_recent_with_gossip_filter() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    let statuses: Vec<PeerStatus> = (0..24).map(|i| PeerStatus::ALL[i % 6]).collect();
    populate(&directory, &statuses).await;

    let recent = directory
        .get_recent_excluding(&no_keys(), Some(&PeerStatus::GOSSIP_READY[..]))
        .await
        .unwrap();

    // 8 of the 24 peers are NEW_BACK or UP
    assert_eq!(recent.len(), 8);
    assert!(recent.iter().all(|p| p.status().is_gossip_ready()));
    assert_newest_first(&recent);
}

#[tokio::test]
async fn test_recent_reflects_status_change() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Up; 3]).await;

    let mut oldest = directory.get_one(&key(0)).await.unwrap();
    directory.set_status(&mut oldest, PeerStatus::Down).await.unwrap();

    let recent = directory.get_recent_excluding(&no_keys(), None).await.unwrap();
    assert_eq!(recent[0].public_key(), key(0));
}

// ============================================================================
// GOSSIP SELECTION
// ============================================================================

#[tokio::test]
async fn test_random_without() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(&directory, &[PeerStatus::Down; 12]).await;

    for _ in 0..20 {
        let chosen = directory.random_without(&[key(11)]).await.unwrap();
        let keys = keys_of(&chosen);

        assert_eq!(chosen.len(), GOSSIP_SAMPLE_SIZE);
        assert_eq!(keys.len(), GOSSIP_SAMPLE_SIZE);
        assert!(!keys.contains(&key(11)));
        // Only the ten most recent candidates are eligible
        assert!(!keys.contains(&key(0)));
    }
}

#[tokio::test]
async fn test_random_ups_without() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(
        &directory,
        &[
            PeerStatus::Up,
            PeerStatus::Down,
            PeerStatus::NewBack,
            PeerStatus::Ask,
            PeerStatus::Nothing,
        ],
    )
    .await;

    for _ in 0..20 {
        let chosen = directory.random_ups_without(&no_keys()).await.unwrap();
        assert_eq!(keys_of(&chosen), HashSet::from([key(0), key(2)]));
    }
}

#[tokio::test]
async fn test_random_on_empty_directory() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    assert!(directory.random_without(&no_keys()).await.unwrap().is_empty());
}

// ============================================================================
// STATS AND STORE ACCESS
// ============================================================================

#[tokio::test]
async fn test_stats() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    populate(
        &directory,
        &[PeerStatus::Up, PeerStatus::NewBack, PeerStatus::Down, PeerStatus::New],
    )
    .await;
    directory
        .discover(PeerRecord::new("hostless", "beta", PeerStatus::Ask))
        .await
        .unwrap();

    let stats = directory.stats().await.unwrap();
    assert_eq!(stats.total_peers, 5);
    assert_eq!(stats.up_peers, 2);
    assert_eq!(stats.down_peers, 1);
    assert_eq!(stats.new_peers, 2);
    assert_eq!(stats.reachable_peers, 4);
}

#[tokio::test]
async fn test_store_does_not_keep_transient_pubkey() {
    let directory = PeerDirectory::new(MemoryPeerStore::new());
    let mut record = PeerRecord::new("abc", "beta", PeerStatus::New);
    record.set_pubkey("abc");

    let record = directory.discover(record).await.unwrap();
    assert_eq!(record.pubkey(), Some("abc"));

    let stored = directory.store().find(&PeerQuery::by_key("abc")).await.unwrap();
    assert_eq!(stored[0].pubkey(), None);
}
