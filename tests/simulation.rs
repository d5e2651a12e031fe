//! End to end runs of the simulator
//!
//! these use real threads and short wall clock durations
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use semsim::item::{Item, ItemSource, SequenceSource};
use semsim::shared::SharedBuffer;
use semsim::worker::{Consumer, Jitter, Producer, WorkerState};
use semsim::{Config, Coordinator};

// slack allowed on top of the configured duration for spawn, cancel and join
const GRACE: Duration = Duration::from_secs(2);

#[test]
fn reference_scenario() {
    let mut config = Config::new();
    config
        .set_producers(2)
        .set_consumers(2)
        .set_duration_secs(2)
        .set_producer_idle_max_ms(50)
        .set_consumer_idle_max_ms(50)
        .set_capacity(10);

    let start = Instant::now();
    let summary = semsim::run(config).unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(2) + GRACE, "took {elapsed:?}");
    assert!(summary.turnaround >= Duration::from_secs(2));

    let produced = summary.items_produced();
    let consumed = summary.items_consumed();
    assert!(produced > 0);
    assert!(consumed > 0);
    assert!(produced >= consumed);
    assert_eq!(produced - consumed, summary.in_flight() as u64);
    assert!(summary.in_flight() <= 10);
    assert!(summary.snapshot.is_consistent());
    assert_eq!(summary.workers.len(), 4);
    assert!(summary.workers.iter().all(|w| w.state == WorkerState::Stopped));
}

#[test]
fn consumer_without_producers() {
    let mut config = Config::new();
    config
        .set_producers(0)
        .set_consumers(1)
        .set_duration_secs(1)
        .set_consumer_idle_max_ms(10);

    let start = Instant::now();
    let summary = semsim::run(config).unwrap();
    assert!(start.elapsed() < Duration::from_secs(1) + GRACE);

    assert_eq!(summary.items_produced(), 0);
    assert_eq!(summary.items_consumed(), 0);
    assert_eq!(summary.in_flight(), 0);
    assert_eq!(summary.workers.len(), 1);
    assert_eq!(summary.workers[0].state, WorkerState::Stopped);
    assert!(summary.snapshot.is_consistent());
}

#[test]
fn producers_without_consumers_fill_the_buffer() {
    let mut config = Config::new();
    config
        .set_producers(3)
        .set_consumers(0)
        .set_duration_secs(1)
        .set_capacity(5);

    let summary = semsim::run(config).unwrap();
    // every producer ends blocked on a full buffer and still stops
    assert_eq!(summary.items_produced(), 5);
    assert_eq!(summary.in_flight(), 5);
    assert_eq!(summary.snapshot.empty_slots, 0);
    assert_eq!(summary.snapshot.filled_slots, 5);
    assert!(summary.snapshot.is_consistent());
}

#[test]
fn single_slot_relay() {
    let mut config = Config::new();
    config
        .set_producers(1)
        .set_consumers(1)
        .set_duration_secs(1)
        .set_capacity(1);

    let summary = semsim::run(config).unwrap();
    assert!(summary.items_consumed() > 0);
    assert!(summary.in_flight() <= 1);
    assert!(summary.items_produced() - summary.items_consumed() <= 1);
}

#[test]
fn single_slot_relay_never_holds_two_items() {
    let shared = Arc::new(SharedBuffer::new(1));
    let total = 5_000u32;

    let s1 = shared.clone();
    let producer = thread::spawn(move || {
        let mut seq = SequenceSource::new();
        (0..total)
            .map(|_| s1.produce(seq.next_item()).unwrap())
            .collect::<Vec<_>>()
    });
    let s2 = shared.clone();
    let consumer = thread::spawn(move || {
        for _ in 0..total {
            s2.consume().unwrap();
        }
    });

    let lens = producer.join().unwrap();
    consumer.join().unwrap();
    // the length right after every insert
    assert_eq!(lens.len(), total as usize);
    assert!(lens.iter().all(|&len| len == 1), "{lens:?}");

    let snap = shared.snapshot();
    assert!(snap.is_consistent());
    assert_eq!(snap.consumed, total as u64);
}

#[test]
fn invariants_hold_while_running() {
    let capacity = 3;
    let shared = Arc::new(SharedBuffer::new(capacity));

    let mut workers = Vec::new();
    for id in 0..8 {
        let producer = Producer::new(id, shared.clone(), SequenceSource::new(), Jitter::none());
        let handle = semsim::spawn(format!("producer-{id}"), move || producer.run()).unwrap();
        workers.push(handle);
        let consumer = Consumer::new(id, shared.clone(), Jitter::none());
        let handle = semsim::spawn(format!("consumer-{id}"), move || consumer.run()).unwrap();
        workers.push(handle);
    }

    let deadline = Instant::now() + Duration::from_millis(500);
    let mut samples = 0;
    while Instant::now() < deadline {
        let snap = shared.snapshot();
        assert!(snap.len <= capacity, "{snap:?}");
        assert_eq!(snap.produced - snap.consumed, snap.len as u64, "{snap:?}");
        samples += 1;
    }
    assert!(samples > 0);

    for w in workers.iter() {
        w.cancel();
    }
    for w in workers {
        assert_eq!(w.join().unwrap().state, WorkerState::Stopped);
    }

    let snap = shared.snapshot();
    assert!(snap.is_consistent(), "{snap:?}");
    assert!(snap.produced > 0);
    assert!(snap.peak <= capacity);
}

#[test]
fn deadlock_freedom_over_shapes() {
    for &(producers, consumers, capacity) in &[(1, 1, 1), (4, 1, 1), (1, 4, 1), (8, 8, 2), (3, 7, 10)] {
        let mut config = Config::new();
        config
            .set_producers(producers)
            .set_consumers(consumers)
            .set_duration_secs(0)
            .set_capacity(capacity);

        let start = Instant::now();
        let summary = Coordinator::new(config).unwrap().run().unwrap();
        assert!(start.elapsed() < GRACE, "{producers}/{consumers}/{capacity}");
        assert_eq!(summary.workers.len(), producers + consumers);
        assert!(summary.snapshot.is_consistent());
        assert!(summary.snapshot.peak <= capacity);
    }
}

#[test]
fn independent_runs_in_one_process() {
    let handles: Vec<_> = (0..3)
        .map(|i| {
            thread::spawn(move || {
                let mut config = Config::new();
                config
                    .set_producers(i + 1)
                    .set_consumers(2)
                    .set_duration_secs(1)
                    .set_capacity(3 + i);
                semsim::run(config).unwrap()
            })
        })
        .collect();

    for (i, h) in handles.into_iter().enumerate() {
        let summary = h.join().unwrap();
        assert_eq!(summary.workers.len(), i + 3);
        assert!(summary.snapshot.is_consistent());
        assert!(summary.snapshot.peak <= 3 + i);
    }
}

#[test]
fn no_loss_or_duplication_with_deterministic_items() {
    let shared = Arc::new(SharedBuffer::new(3));
    let produced = Arc::new(Mutex::new(Vec::new()));
    let consumed = Arc::new(Mutex::new(Vec::new()));

    let mut seq = SequenceSource::new();
    let record = produced.clone();
    let source = move || {
        let item = seq.next_item();
        record.lock().push(item);
        item
    };
    let producer = Producer::new(0, shared.clone(), source, Jitter::with_seed(2, 11));
    let sink = consumed.clone();
    let consumer = Consumer::with_sink(
        0,
        shared.clone(),
        move |item: Item| sink.lock().push(item),
        Jitter::with_seed(2, 12),
    );

    let p = semsim::spawn("producer-0".to_owned(), move || producer.run()).unwrap();
    let c = semsim::spawn("consumer-0".to_owned(), move || consumer.run()).unwrap();
    thread::sleep(Duration::from_millis(300));
    p.cancel();
    c.cancel();
    let ps = p.join().unwrap();
    let cs = c.join().unwrap();

    let produced = produced.lock();
    let consumed = consumed.lock();
    // the last generated item may have been dropped by a canceled slot wait
    let inserted = &produced[..ps.handled as usize];
    assert_eq!(consumed.len() as u64, cs.handled);
    assert_eq!(&inserted[..consumed.len()], &consumed[..]);

    let snap = shared.snapshot();
    assert!(snap.is_consistent());
    assert_eq!(snap.produced, ps.handled);
    assert_eq!(snap.len, inserted.len() - consumed.len());
}

#[test]
fn report_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");

    for _ in 0..2 {
        let mut config = Config::new();
        config
            .set_producers(1)
            .set_consumers(1)
            .set_duration_secs(0)
            .set_report_path(&path);
        let summary = semsim::run(config).unwrap();
        summary.write_report().unwrap();
    }

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("========= SUMMARY =========").count(), 2);
    assert_eq!(text.matches("Producers: 1\n").count(), 2);
    assert!(text.ends_with("===========================\n\n"));
}

#[test]
fn report_failure_does_not_lose_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("report.txt");

    let mut config = Config::new();
    config
        .set_producers(1)
        .set_consumers(1)
        .set_duration_secs(0)
        .set_report_path(&path);
    let summary = semsim::run(config).unwrap();
    assert!(matches!(summary.write_report(), Err(semsim::Error::Report(_))));
    // the counters are still there
    assert!(summary.snapshot.is_consistent());
}

#[test]
fn invalid_config_spawns_nothing() {
    let mut config = Config::new();
    config.set_capacity(0);
    assert!(matches!(
        semsim::run(config),
        Err(semsim::Error::Config(semsim::ConfigError::ZeroCapacity))
    ));
}
