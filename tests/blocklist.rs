//! Revocation through the blocklist, including concurrent use and the sweeper

mod common;

use common::*;
use jwtseal::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn blocklist(clock: &ManualClock) -> Blocklist {
    Blocklist::with_config(BlocklistConfig::new().clock(clock.clone())).unwrap()
}

fn issue(clock: &ManualClock, ttl: u64) -> String {
    hs256_signer(clock)
        .sign(&ClaimsSet::new().max_age(Duration::from_secs(ttl)))
        .unwrap()
}

#[test]
fn test_invalidated_token_is_blocked() {
    let clock = ManualClock::new(NOW);
    let blocklist = blocklist(&clock);
    let verifier = hs256_verifier(&clock).blocklist(&blocklist);

    let token = issue(&clock, 900);
    let other = issue(&ManualClock::new(NOW + 1), 900);

    let verified = verifier.verify(&token).unwrap();
    blocklist.invalidate_token(&verified).unwrap();

    assert!(matches!(verifier.verify(&token), Err(Error::TokenBlocked)));
    assert!(verifier.verify(&other).is_ok());
}

#[test]
fn test_invalidate_by_id_before_first_use() {
    let clock = ManualClock::new(NOW);
    let blocklist = blocklist(&clock);
    let verifier = hs256_verifier(&clock).blocklist(&blocklist);

    let token = issue(&clock, 900);
    blocklist.invalidate(TokenId::from_token(&token).unwrap(), NOW + 900);

    assert!(matches!(verifier.verify(&token), Err(Error::TokenBlocked)));
}

#[test]
fn test_blocked_wins_over_expired() {
    let clock = ManualClock::new(NOW);
    let blocklist = blocklist(&clock);
    let verifier = hs256_verifier(&clock).blocklist(&blocklist);

    let token = issue(&clock, 10);
    blocklist.invalidate(TokenId::from_token(&token).unwrap(), NOW + 1_000);

    clock.advance(100);
    assert!(matches!(verifier.verify(&token), Err(Error::TokenBlocked)));
}

#[test]
fn test_sweep_returns_to_baseline() {
    let clock = ManualClock::new(NOW);
    let blocklist = blocklist(&clock);

    for i in 0..100u32 {
        let id = TokenId::from_signature(&i.to_be_bytes());
        blocklist.invalidate(id, NOW + 10 + i64::from(i % 10));
    }
    assert_eq!(blocklist.len(), 100);

    clock.advance(14);
    assert_eq!(blocklist.sweep(), 50);

    clock.advance(100);
    assert_eq!(blocklist.sweep(), 50);
    assert!(blocklist.is_empty());
}

#[test]
fn test_token_without_exp_uses_default_ttl() {
    let clock = ManualClock::new(NOW);
    let blocklist = Blocklist::with_config(
        BlocklistConfig::new()
            .default_ttl(Duration::from_secs(120))
            .clock(clock.clone()),
    )
    .unwrap();

    let token = hs256_signer(&clock).sign(&ClaimsSet::new()).unwrap();
    let verified = hs256_verifier(&clock).verify(&token).unwrap();
    blocklist.invalidate_token(&verified).unwrap();

    clock.advance(119);
    assert!(blocklist.is_blocked(verified.id()));
    clock.advance(1);
    assert!(!blocklist.is_blocked(verified.id()));
}

#[test]
fn test_concurrent_invalidate_and_lookup() {
    let clock = ManualClock::new(NOW);
    let blocklist = blocklist(&clock);
    let ids: Arc<Vec<TokenId>> = Arc::new(
        (0..400u32)
            .map(|i| TokenId::from_signature(&i.to_le_bytes()))
            .collect(),
    );

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let blocklist = blocklist.clone();
            let ids = Arc::clone(&ids);
            thread::spawn(move || {
                for id in ids.iter().skip(w).step_by(4) {
                    blocklist.invalidate(id.clone(), NOW + 60);
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let blocklist = blocklist.clone();
            let ids = Arc::clone(&ids);
            thread::spawn(move || {
                for id in ids.iter() {
                    // Either answer is fine while writers run; it must not deadlock
                    let _ = blocklist.is_blocked(id);
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert_eq!(blocklist.len(), 400);
    assert!(ids.iter().all(|id| blocklist.is_blocked(id)));
}

#[test]
fn test_concurrent_invalidate_and_lookup_same_id() {
    let clock = ManualClock::new(NOW);
    let blocklist = blocklist(&clock);
    let id = TokenId::from_signature(b"contended");

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let blocklist = blocklist.clone();
            let id = id.clone();
            thread::spawn(move || {
                for i in 0..2_000 {
                    // Half the writes carry an expiry that has already passed
                    let expires_at = if (t + i) % 2 == 0 { NOW + 60 } else { NOW - 1 };
                    blocklist.invalidate(id.clone(), expires_at);
                    let _ = blocklist.is_blocked(&id);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(blocklist.len() <= 1);

    blocklist.invalidate(id.clone(), NOW + 60);
    assert_eq!(blocklist.len(), 1);
    assert!(blocklist.is_blocked(&id));
    assert!(blocklist.is_blocked(&id));

    blocklist.invalidate(id.clone(), NOW - 1);
    assert!(!blocklist.is_blocked(&id));
    assert!(blocklist.is_empty());
}

#[test]
fn test_concurrent_sweep_and_lookup() {
    let clock = ManualClock::new(NOW);
    let blocklist = blocklist(&clock);

    for i in 0..200u32 {
        blocklist.invalidate(TokenId::from_signature(&i.to_le_bytes()), NOW + 1);
    }
    clock.advance(1);

    let sweeper = {
        let blocklist = blocklist.clone();
        thread::spawn(move || blocklist.sweep())
    };
    let reader = {
        let blocklist = blocklist.clone();
        thread::spawn(move || {
            (0..200u32)
                .filter(|i| blocklist.is_blocked(&TokenId::from_signature(&i.to_le_bytes())))
                .count()
        })
    };

    sweeper.join().unwrap();
    assert_eq!(reader.join().unwrap(), 0);
    assert!(blocklist.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_background_sweeper_lifecycle() {
    let clock = ManualClock::new(NOW);
    let blocklist = Blocklist::with_config(
        BlocklistConfig::new()
            .sweep_interval(Duration::from_secs(30))
            .clock(clock.clone()),
    )
    .unwrap();

    for i in 0..10u32 {
        blocklist.invalidate(TokenId::from_signature(&i.to_le_bytes()), NOW + 20);
    }

    let sweeper = blocklist.spawn_sweeper();
    assert!(sweeper.is_running());

    // Nothing has expired at the first sweep
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(blocklist.len(), 10);

    clock.advance(20);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(blocklist.is_empty());

    sweeper.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_sweeper() {
    let clock = ManualClock::new(NOW);
    let blocklist = Blocklist::with_config(
        BlocklistConfig::new()
            .sweep_interval(Duration::from_secs(5))
            .clock(clock.clone()),
    )
    .unwrap();

    drop(blocklist.spawn_sweeper());
    tokio::task::yield_now().await;

    blocklist.invalidate(TokenId::from_signature(b"dropped"), NOW);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(blocklist.len(), 1);
}
