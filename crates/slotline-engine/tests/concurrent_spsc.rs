//! Concurrent single-producer / single-consumer ordering tests.
//!
//! One thread publishes 1000 distinct numbered 4-byte frames into a
//! 3-slot pool with evict-oldest; another pops as fast as it can.
//!
//! **Pass criteria:**
//! - every observed frame decodes (no torn or merged frames)
//! - observed frame numbers are strictly increasing (no reordering,
//!   no duplicates)
//! - observed ∪ evicted is exactly `0..1000`, with no overlap
//! - what is left after the producer finishes is a contiguous suffix
//!   ending at frame 999

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use slotline_arena::PoolConfig;
use slotline_engine::{
    FrameQueue, FrameReceiver, IngestDirection, IngestExit, OverflowPolicy, Publish,
    ReceiverConfig,
};
use slotline_test_utils::{
    frame_number, numbered_frame, ChannelSource, JitterSource, ScriptedSource,
};

const FRAMES: u32 = 1000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn assert_strictly_increasing(observed: &[u32]) {
    for pair in observed.windows(2) {
        assert!(
            pair[0] < pair[1],
            "frame {} observed after frame {}",
            pair[1],
            pair[0]
        );
    }
}

fn decode(bytes: &[u8]) -> u32 {
    frame_number(bytes).unwrap_or_else(|| panic!("torn frame: {bytes:?}"))
}

#[test]
fn direct_publish_and_pop_preserve_order() {
    init_tracing();
    let queue = Arc::new(
        FrameQueue::new(&PoolConfig::new(4, 3), IngestDirection::PushBack).unwrap(),
    );
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let queue = Arc::clone(&queue);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut evicted = Vec::new();
            for n in 0..FRAMES {
                match queue.publish(&numbered_frame(n), OverflowPolicy::EvictOldest) {
                    Publish::Stored { seq, evicted: e } => {
                        assert_eq!(seq.0, u64::from(n), "every publish stores");
                        if let Some(old) = e {
                            evicted.push(u32::try_from(old.0).unwrap());
                        }
                    }
                    Publish::Dropped => panic!("evict-oldest never drops"),
                }
            }
            done.store(true, Ordering::Release);
            evicted
        })
    };

    let mut observed = Vec::new();
    while !done.load(Ordering::Acquire) {
        if let Some(frame) = queue.pop_oldest() {
            let n = decode(&frame.bytes);
            assert_eq!(frame.seq.0, u64::from(n), "sequence matches payload");
            observed.push(n);
        }
    }
    let evicted = producer.join().unwrap();
    let tail: Vec<u32> = queue.drain().iter().map(|f| decode(&f.bytes)).collect();

    assert_strictly_increasing(&observed);

    let observed_set: BTreeSet<u32> = observed.iter().copied().collect();
    let tail_set: BTreeSet<u32> = tail.iter().copied().collect();
    let evicted_set: BTreeSet<u32> = evicted.iter().copied().collect();
    assert_eq!(evicted_set.len(), evicted.len(), "no frame evicted twice");
    assert!(observed_set.is_disjoint(&evicted_set));
    assert!(tail_set.is_disjoint(&evicted_set));
    assert!(observed_set.is_disjoint(&tail_set));

    let all: BTreeSet<u32> = observed_set
        .union(&evicted_set)
        .chain(tail_set.iter())
        .copied()
        .collect();
    assert_eq!(all, (0..FRAMES).collect::<BTreeSet<_>>());

    if let Some(&last) = tail.last() {
        assert_eq!(last, FRAMES - 1);
        let first = tail[0];
        assert_eq!(tail, (first..FRAMES).collect::<Vec<_>>(), "contiguous suffix");
        assert!(tail.len() <= 3);
    } else {
        assert_eq!(observed.last(), Some(&(FRAMES - 1)));
    }
    queue.with_deque(|d| d.check_invariants().unwrap());
}

#[test]
fn receiver_with_scripted_burst_accounts_for_every_frame() {
    init_tracing();
    let source = ScriptedSource::new()
        .frames((0..FRAMES).map(numbered_frame))
        .then_close();
    let config = ReceiverConfig {
        pool: PoolConfig::new(4, 3),
        read_timeout: Duration::from_millis(5),
        ..ReceiverConfig::default()
    };
    let mut rx = FrameReceiver::start(source, config).unwrap();

    let mut observed = Vec::new();
    while rx.is_ingesting() {
        if let Some(frame) = rx.pop_oldest() {
            observed.push(decode(&frame.bytes));
        }
    }
    let report = rx.stop();
    let ingest = report.ingest.unwrap();
    assert_eq!(ingest.exit, IngestExit::SourceClosed);

    let tail: Vec<u32> = rx.queue().drain().iter().map(|f| decode(&f.bytes)).collect();
    observed.extend_from_slice(&tail);
    assert_strictly_increasing(&observed);

    assert_eq!(ingest.stats.frames, u64::from(FRAMES));
    assert_eq!(observed.len() as u64 + ingest.stats.evicted, u64::from(FRAMES));
    assert_eq!(observed.last(), Some(&(FRAMES - 1)));
}

#[test]
fn receiver_with_jittered_source_never_reorders() {
    init_tracing();
    let source = JitterSource::new(0x5107, 300, Duration::from_micros(300));
    let config = ReceiverConfig {
        pool: PoolConfig::new(4, 3),
        read_timeout: Duration::from_millis(2),
        ..ReceiverConfig::default()
    };
    let mut rx = FrameReceiver::start(source, config).unwrap();

    let mut observed = Vec::new();
    loop {
        match rx.wait_oldest(Duration::from_millis(5)) {
            Some(frame) => observed.push(decode(&frame.bytes)),
            None if !rx.is_ingesting() => break,
            None => {}
        }
    }
    let report = rx.stop();
    observed.extend(rx.queue().drain().iter().map(|f| decode(&f.bytes)));

    assert_strictly_increasing(&observed);
    let stats = report.ingest.unwrap().stats;
    assert_eq!(observed.len() as u64 + stats.evicted, 300);
}

#[test]
fn slow_consumer_sees_only_the_newest_frames() {
    init_tracing();
    let (tx, source) = ChannelSource::unbounded();
    let config = ReceiverConfig {
        pool: PoolConfig::new(4, 3),
        read_timeout: Duration::from_millis(5),
        ..ReceiverConfig::default()
    };
    let mut rx = FrameReceiver::start(source, config).unwrap();
    for n in 0..50 {
        tx.send(numbered_frame(n).to_vec()).unwrap();
    }
    drop(tx);
    assert!(rx.wait_until_stopped(Duration::from_secs(5)));

    let frames: Vec<u32> = rx.queue().drain().iter().map(|f| decode(&f.bytes)).collect();
    assert_eq!(frames, vec![47, 48, 49]);
    let report = rx.stop();
    assert_eq!(report.ingest.unwrap().stats.evicted, 47);
}
