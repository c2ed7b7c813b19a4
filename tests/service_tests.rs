use chrono::{Duration, Utc};
use docsearch::db::{Store, timestamp};
use docsearch::models::document::{Document, NewDocument};
use docsearch::config::CacheConfig;
use docsearch::services::{DocumentRanker, QuotaDecision, QuotaService, ResultCache, Scheduler};
use std::sync::Arc;

async fn temp_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("docsearch-service-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .expect("Failed to open store")
}

fn doc(id: i32, content: &str, score: f64) -> Document {
    Document {
        id,
        content: content.to_string(),
        score,
    }
}

#[tokio::test]
async fn test_quota_allows_five_then_denies() {
    let store = temp_store().await;
    let quota = QuotaService::new(store.clone(), 5);

    for expected in 1..=5 {
        let decision = quota.check_and_record("u1").await.unwrap();
        assert_eq!(
            decision,
            QuotaDecision::Allowed {
                request_count: expected
            }
        );
    }

    for _ in 0..3 {
        let decision = quota.check_and_record("u1").await.unwrap();
        assert_eq!(decision, QuotaDecision::Denied { request_count: 5 });
    }

    let user = store.get_user("u1").await.unwrap().unwrap();
    assert_eq!(user.request_count, 5);
    assert!(user.updated_at >= user.created_at);
}

#[tokio::test]
async fn test_quota_custom_limit() {
    let store = temp_store().await;
    let quota = QuotaService::new(store, 1);

    assert!(quota.check_and_record("solo").await.unwrap().is_allowed());
    assert!(!quota.check_and_record("solo").await.unwrap().is_allowed());
}

#[tokio::test]
async fn test_quota_concurrent_requests_never_exceed_limit() {
    let store = temp_store().await;
    let quota = Arc::new(QuotaService::new(store.clone(), 5));

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let quota = Arc::clone(&quota);
            tokio::spawn(async move { quota.check_and_record("racer").await })
        })
        .collect();

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_allowed() {
            allowed += 1;
        }
    }

    assert_eq!(allowed, 5);
    let user = store.get_user("racer").await.unwrap().unwrap();
    assert_eq!(user.request_count, 5);
}

#[tokio::test]
async fn test_store_rejects_duplicate_user() {
    let store = temp_store().await;

    assert!(store.create_user("dup").await.unwrap());
    assert!(!store.create_user("dup").await.unwrap());

    let user = store.get_user("dup").await.unwrap().unwrap();
    assert_eq!(user.request_count, 1);
}

#[tokio::test]
async fn test_cache_lookup_and_overwrite() {
    let store = temp_store().await;
    let cache = ResultCache::new(store.clone(), Duration::hours(24));

    assert!(cache.lookup("ai").await.unwrap().is_none());

    let first = vec![doc(1, "a", 0.9)];
    cache.store("ai", &first).await.unwrap();
    assert_eq!(cache.lookup("ai").await.unwrap(), Some(first));

    let second = vec![doc(2, "b", 0.8), doc(3, "c", 0.7)];
    cache.store("ai", &second).await.unwrap();
    assert_eq!(cache.lookup("ai").await.unwrap(), Some(second));
    assert_eq!(store.cache_entry_count().await.unwrap(), 1);

    // Exact match only.
    assert!(cache.lookup("AI").await.unwrap().is_none());
    assert!(cache.lookup("ai ").await.unwrap().is_none());
}

#[tokio::test]
async fn test_cache_empty_result_is_a_hit() {
    let store = temp_store().await;
    let cache = ResultCache::new(store, Duration::hours(24));

    cache.store("nothing", &[]).await.unwrap();
    assert_eq!(cache.lookup("nothing").await.unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn test_cache_eviction_by_age() {
    let store = temp_store().await;
    let cache = ResultCache::new(store.clone(), Duration::hours(24));

    let payload = serde_json::to_string(&vec![doc(1, "old", 0.9)]).unwrap();
    store
        .cache_search("old", &payload, &timestamp(Utc::now() - Duration::hours(25)))
        .await
        .unwrap();
    store
        .cache_search("young", &payload, &timestamp(Utc::now() - Duration::hours(23)))
        .await
        .unwrap();
    cache.store("fresh", &[]).await.unwrap();

    // Stale entries are misses even before the sweep removes them.
    assert!(cache.lookup("old").await.unwrap().is_none());
    assert!(cache.lookup("young").await.unwrap().is_some());

    let removed = cache.evict_expired().await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.cache_entry_count().await.unwrap(), 2);

    let removed = cache.evict_older_than(Duration::hours(1)).await.unwrap();
    assert_eq!(removed, 1);
    assert!(cache.lookup("fresh").await.unwrap().is_some());
}

#[tokio::test]
async fn test_ranker_orders_filters_and_truncates() {
    let store = temp_store().await;
    store
        .add_documents(&[
            NewDocument::new("mid", 0.7),
            NewDocument::new("top", 0.95),
            NewDocument::new("low", 0.2),
            NewDocument::new("tie-first", 0.8),
            NewDocument::new("tie-second", 0.8),
            NewDocument::new("edge", 0.5),
        ])
        .await
        .unwrap();
    let ranker = DocumentRanker::new(store);

    let top = ranker.top_k(0.5, 10).await.unwrap();
    let contents: Vec<&str> = top.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["top", "tie-first", "tie-second", "mid", "edge"]
    );
    assert!(top.iter().all(|d| d.score >= 0.5));
    assert!(top.windows(2).all(|w| w[0].score >= w[1].score));

    let top = ranker.top_k(0.5, 2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].content, "tie-first");

    assert!(ranker.top_k(0.5, 0).await.unwrap().is_empty());
    assert!(ranker.top_k(0.99, 5).await.unwrap().is_empty());
    assert_eq!(ranker.top_k(f64::MIN, 100).await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_clear_database_keeps_users() {
    let store = temp_store().await;
    store
        .add_documents(&docsearch::models::document::sample_documents())
        .await
        .unwrap();
    store
        .cache_search("q", "[]", &timestamp(Utc::now()))
        .await
        .unwrap();
    store.create_user("keeper").await.unwrap();

    let cleared = store.clear_database().await.unwrap();
    assert_eq!(cleared.documents, 5);
    assert_eq!(cleared.cache_entries, 1);

    assert_eq!(store.document_count().await.unwrap(), 0);
    assert_eq!(store.cache_entry_count().await.unwrap(), 0);
    assert!(store.get_user("keeper").await.unwrap().is_some());

    let cleared = store.clear_database().await.unwrap();
    assert_eq!(cleared.documents, 0);
}

#[tokio::test]
async fn test_add_documents_empty_is_noop() {
    let store = temp_store().await;
    assert_eq!(store.add_documents(&[]).await.unwrap(), 0);
    assert_eq!(store.document_count().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduled_sweep_evicts_stale_entries() {
    let store = temp_store().await;
    let cache = Arc::new(ResultCache::new(store.clone(), Duration::hours(24)));

    store
        .cache_search("stale", "[]", &timestamp(Utc::now() - Duration::hours(48)))
        .await
        .unwrap();
    cache.store("fresh", &[]).await.unwrap();

    let config = CacheConfig {
        max_age_hours: 24,
        sweep_cron: Some("* * * * * *".to_string()),
    };
    let mut sched = Scheduler::new(Arc::clone(&cache), config)
        .start()
        .await
        .unwrap()
        .expect("sweep should be scheduled");

    let mut remaining = store.cache_entry_count().await.unwrap();
    for _ in 0..50 {
        if remaining == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        remaining = store.cache_entry_count().await.unwrap();
    }
    sched.shutdown().await.unwrap();

    assert_eq!(remaining, 1);
    assert!(cache.lookup("fresh").await.unwrap().is_some());
}

#[tokio::test]
async fn test_scheduler_disabled_without_cron() {
    let store = temp_store().await;
    let cache = Arc::new(ResultCache::new(store, Duration::hours(24)));

    let sched = Scheduler::new(cache, CacheConfig::default()).start().await.unwrap();
    assert!(sched.is_none());
}

#[tokio::test]
async fn test_store_creates_missing_directories() {
    let root = std::env::temp_dir().join(format!("docsearch-nested-{}", uuid::Uuid::new_v4()));
    let db_path = root.join("data").join("docsearch.db");

    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .unwrap();
    store.ping().await.unwrap();
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_store_reports_unusable_directory() {
    let blocker = std::env::temp_dir().join(format!("docsearch-blocker-{}", uuid::Uuid::new_v4()));
    std::fs::write(&blocker, "not a directory").unwrap();
    let db_path = blocker.join("docsearch.db");

    let err = match Store::new(&format!("sqlite:{}", db_path.display())).await {
        Ok(_) => panic!("opening a store under a regular file should fail"),
        Err(e) => e,
    };
    assert!(format!("{err:#}").contains("Failed to create database directory"));
}
