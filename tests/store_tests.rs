//! MetricsStore concurrency tests

use std::sync::Arc;
use std::time::Duration;

use metrics_sampler::config::MetricsOptions;
use metrics_sampler::instruments::{InstrumentRegistry, SampleInstruments};
use metrics_sampler::store::{Measure, MetricsStore};

fn create_store() -> (Arc<MetricsStore>, SampleInstruments) {
    let mut registry = InstrumentRegistry::new();
    let ids = SampleInstruments::register(&mut registry).unwrap();
    (
        Arc::new(MetricsStore::new(Arc::new(registry), &MetricsOptions::default())),
        ids,
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_lose_no_updates() {
    let (store, ids) = create_store();
    let mut handles = vec![];

    for task in 0..8u64 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for i in 0..500u64 {
                store.increment_counter(ids.counter_one, 1);
                store.update_histogram(ids.histogram_one, (i % 201) as f64);
                let item = if (task + i) % 2 == 0 { "errors" } else { "failures" };
                store.mark_meter(ids.meter_one, 2, Some(item));
                store.record_time(ids.timer_one, Duration::from_millis(i % 101));
            }
        }));
    }

    // 写入期间的快照必须始终可取
    for _ in 0..10 {
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 6);
        tokio::task::yield_now().await;
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.counter("counter_one"), Some(4000));

    let histogram = snapshot.histogram("histogram_one").unwrap();
    assert_eq!(histogram.count, 4000);
    assert_eq!(histogram.sample_size, 1028);

    let meter = snapshot.meter("meter_one").unwrap();
    assert_eq!(meter.count, 8000);
    let items: u64 = meter.items.iter().map(|i| i.count).sum();
    assert_eq!(items, 8000);

    let timer = snapshot.timer("timer_one").unwrap();
    assert_eq!(timer.calls, 4000);
    assert!(timer.duration_ms.max <= 100.0);
}

#[test]
fn test_disabled_store_ignores_writes() {
    let mut registry = InstrumentRegistry::new();
    let ids = SampleInstruments::register(&mut registry).unwrap();
    let options = MetricsOptions {
        enabled: false,
        ..MetricsOptions::default()
    };
    let store = MetricsStore::new(Arc::new(registry), &options);

    store.increment_counter(ids.counter_one, 10);
    store.set_gauge(ids.gauge_one, 3.0);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.counter("counter_one"), Some(0));
    assert_eq!(snapshot.gauge("gauge_one"), Some(0.0));
}

#[test]
fn test_global_tags_follow_instrument_tags() {
    let mut registry = InstrumentRegistry::new();
    SampleInstruments::register(&mut registry).unwrap();
    let mut options = MetricsOptions::default();
    options
        .global_tags
        .insert("host".to_string(), "sampler-01".to_string());
    let store = MetricsStore::new(Arc::new(registry), &options);

    let snapshot = store.snapshot();
    let gauge = snapshot
        .entries
        .iter()
        .find(|e| e.name == "gauge_one")
        .unwrap();
    let keys: Vec<&str> = gauge.tags.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["prop1", "prop2", "host"]);
}
