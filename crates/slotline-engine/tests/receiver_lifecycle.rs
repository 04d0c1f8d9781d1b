//! FrameReceiver lifecycle: start validation, overflow behaviour,
//! readiness, transport failure, end of stream, and stop latency.

use std::time::{Duration, Instant};

use slotline_arena::PoolConfig;
use slotline_core::{ConfigError, FrameSink, RxStatus, TransportError};
use slotline_engine::{
    FrameReceiver, IngestDirection, IngestExit, OverflowPolicy, Readiness, ReceiverConfig,
};
use slotline_test_utils::{ChannelSource, RecordingSink, ScriptedSource};

const WAIT: Duration = Duration::from_secs(5);

fn small_pool() -> ReceiverConfig {
    ReceiverConfig {
        pool: PoolConfig::new(8, 3),
        read_timeout: Duration::from_millis(5),
        ..ReceiverConfig::default()
    }
}

fn bytes_of(rx: &FrameReceiver) -> Vec<Vec<u8>> {
    rx.queue().drain().into_iter().map(|f| f.bytes).collect()
}

#[test]
fn overwrite_on_full_keeps_newest_three() {
    let source = ScriptedSource::new()
        .frames([b"A", b"B", b"C", b"D"].map(|b| b.to_vec()))
        .then_close();
    let mut rx = FrameReceiver::start(source, small_pool()).unwrap();
    assert!(rx.wait_until_stopped(WAIT));

    assert_eq!(rx.status(), RxStatus::Ready);
    let report = rx.stop();
    let ingest = report.ingest.unwrap();
    assert_eq!(ingest.exit, IngestExit::SourceClosed);
    assert_eq!(ingest.stats.frames, 4);
    assert_eq!(ingest.stats.evicted, 1);
    assert_eq!(
        bytes_of(&rx),
        vec![b"B".to_vec(), b"C".to_vec(), b"D".to_vec()]
    );
}

#[test]
fn drop_newest_keeps_first_three() {
    let source = ScriptedSource::new()
        .frames([b"A", b"B", b"C", b"D"].map(|b| b.to_vec()))
        .then_close();
    let config = ReceiverConfig {
        overflow: OverflowPolicy::DropNewest,
        ..small_pool()
    };
    let mut rx = FrameReceiver::start(source, config).unwrap();
    assert!(rx.wait_until_stopped(WAIT));
    assert_eq!(rx.stats().dropped, 1);
    rx.stop();
    assert_eq!(
        bytes_of(&rx),
        vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec()]
    );
}

#[test]
fn push_front_direction_still_pops_oldest_first() {
    let source = ScriptedSource::new()
        .frames([b"1", b"2", b"3", b"4"].map(|b| b.to_vec()))
        .then_close();
    let config = ReceiverConfig {
        direction: IngestDirection::PushFront,
        ..small_pool()
    };
    let rx = FrameReceiver::start(source, config).unwrap();
    assert!(rx.wait_until_stopped(WAIT));
    assert_eq!(rx.peek_oldest().unwrap().bytes, b"2");
    assert_eq!(rx.pop_oldest().unwrap().bytes, b"2");
    assert_eq!(rx.pop_oldest().unwrap().bytes, b"3");
    assert_eq!(rx.pop_oldest().unwrap().bytes, b"4");
    assert!(rx.pop_oldest().is_none());
}

#[test]
fn legacy_readiness_needs_two_frames() {
    let (tx, source) = ChannelSource::unbounded();
    let config = ReceiverConfig {
        readiness: Readiness::LEGACY,
        ..small_pool()
    };
    let rx = FrameReceiver::start(source, config).unwrap();
    assert_eq!(rx.status(), RxStatus::Idle);

    tx.send(b"one".to_vec()).unwrap();
    let deadline = Instant::now() + WAIT;
    while rx.queue().len() < 1 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(rx.status(), RxStatus::Idle, "one buffered frame is idle");

    tx.send(b"two".to_vec()).unwrap();
    while rx.queue().len() < 2 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(rx.status(), RxStatus::Ready);
}

#[test]
fn ready_status_still_allows_empty_pop() {
    let source = ScriptedSource::new().frame(b"only".to_vec()).then_close();
    let rx = FrameReceiver::start(source, small_pool()).unwrap();
    assert!(rx.wait_until_stopped(WAIT));
    assert_eq!(rx.status(), RxStatus::Ready);
    assert!(rx.pop_oldest().is_some());
    assert!(rx.pop_oldest().is_none());
    assert_eq!(rx.status(), RxStatus::Idle);
}

#[test]
fn transport_failure_stops_ingestion_and_keeps_frames() {
    let failure = TransportError::Read {
        reason: "overrun".into(),
    };
    let source = ScriptedSource::new()
        .frame(b"first".to_vec())
        .frame(b"second".to_vec())
        .fail(failure.clone())
        .frame(b"unreachable".to_vec());
    let mut rx = FrameReceiver::start(source, small_pool()).unwrap();
    assert!(rx.wait_until_stopped(WAIT));
    assert!(!rx.is_ingesting());

    let report = rx.stop();
    assert!(report.joined);
    assert_eq!(report.ingest.unwrap().exit, IngestExit::Failed(failure));
    rx.queue()
        .with_deque(|d| assert_eq!(d.arena().in_use(), 2, "no slot acquired after failure"));
    assert_eq!(
        bytes_of(&rx),
        vec![b"first".to_vec(), b"second".to_vec()]
    );
}

#[test]
fn stop_latency_is_bounded_by_read_timeout() {
    let config = ReceiverConfig {
        read_timeout: Duration::from_millis(20),
        ..small_pool()
    };
    let mut rx = FrameReceiver::start(ScriptedSource::new(), config).unwrap();
    std::thread::sleep(Duration::from_millis(30));

    let start = Instant::now();
    let report = rx.stop();
    assert!(report.joined);
    assert_eq!(report.ingest.unwrap().exit, IngestExit::Cancelled);
    assert!(
        start.elapsed() < Duration::from_secs(1),
        "stop took {:?}",
        start.elapsed()
    );
    rx.queue()
        .with_deque(|d| assert_eq!(d.arena().in_use(), 0, "no stranded slot"));
}

#[test]
fn channel_source_with_long_read_timeout_still_stops() {
    let (_tx, source) = ChannelSource::bounded(4);
    let config = ReceiverConfig {
        read_timeout: Duration::from_millis(50),
        ..small_pool()
    };
    let mut rx = FrameReceiver::start(source, config).unwrap();
    let report = rx.stop();
    assert!(report.joined);
    assert_eq!(report.ingest.unwrap().exit, IngestExit::Cancelled);
}

#[test]
fn wait_oldest_blocks_until_a_frame_arrives() {
    let (tx, source) = ChannelSource::unbounded();
    let rx = FrameReceiver::start(source, small_pool()).unwrap();
    let sender = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        tx.send(b"late".to_vec()).unwrap();
        tx
    });
    let frame = rx.wait_oldest(WAIT).unwrap();
    assert_eq!(frame.bytes, b"late");
    drop(sender.join().unwrap());
}

#[test]
fn oversize_reads_fill_successive_slots() {
    let source = ScriptedSource::new()
        .frame(b"0123456789AB".to_vec())
        .then_close();
    let rx = FrameReceiver::start(source, small_pool()).unwrap();
    assert!(rx.wait_until_stopped(WAIT));
    assert_eq!(
        bytes_of(&rx),
        vec![b"01234567".to_vec(), b"89AB".to_vec()]
    );
}

#[test]
fn invalid_configs_are_rejected_before_start() {
    let cases = [
        (
            ReceiverConfig {
                pool: PoolConfig::new(0, 3),
                ..ReceiverConfig::default()
            },
            ConfigError::ZeroSlotSize,
        ),
        (
            ReceiverConfig {
                pool: PoolConfig::new(8, 0),
                ..ReceiverConfig::default()
            },
            ConfigError::ZeroCapacity,
        ),
        (
            ReceiverConfig {
                readiness: Readiness::new(5),
                ..ReceiverConfig::default()
            },
            ConfigError::ReservationTooLarge {
                reserved: 5,
                capacity: 3,
            },
        ),
        (
            ReceiverConfig {
                read_timeout: Duration::ZERO,
                ..ReceiverConfig::default()
            },
            ConfigError::ZeroReadTimeout,
        ),
    ];
    for (config, expected) in cases {
        let err = FrameReceiver::start(ScriptedSource::new(), config).unwrap_err();
        assert_eq!(err, expected);
    }
}

#[test]
fn stats_track_timeouts_on_a_quiet_line() {
    let source = ScriptedSource::new().idle().idle().frame(b"x".to_vec()).then_close();
    let mut rx = FrameReceiver::start(source, small_pool()).unwrap();
    assert!(rx.wait_until_stopped(WAIT));
    let stats = rx.stop().ingest.unwrap().stats;
    assert_eq!(stats.timeouts, 2);
    assert_eq!(stats.frames, 1);
    assert_eq!(stats.bytes, 1);
}

/// Pop every buffered frame into `sink`, stopping at the first write
/// failure. Returns that failure, if any.
fn forward(rx: &FrameReceiver, sink: &mut impl FrameSink) -> Option<TransportError> {
    while let Some(frame) = rx.peek_oldest() {
        if let Err(err) = sink.send_frame(frame.as_bytes()) {
            return Some(err);
        }
        rx.pop_oldest();
    }
    None
}

#[test]
fn received_frames_forward_to_a_sink_in_order() {
    let source = ScriptedSource::new()
        .frames([b"ping", b"pong", b"done"].map(|b| b.to_vec()))
        .then_close();
    let rx = FrameReceiver::start(source, small_pool()).unwrap();
    assert!(rx.wait_until_stopped(WAIT));

    let mut sink = RecordingSink::new();
    assert_eq!(forward(&rx, &mut sink), None);
    assert_eq!(sink.frames(), [b"ping".to_vec(), b"pong".to_vec(), b"done".to_vec()]);
    assert_eq!(sink.bytes(), b"pingpongdone");
    assert!(rx.queue().is_empty());
}

#[test]
fn failed_forward_leaves_unsent_frames_buffered() {
    let source = ScriptedSource::new()
        .frames([b"a", b"b", b"c"].map(|b| b.to_vec()))
        .then_close();
    let rx = FrameReceiver::start(source, small_pool()).unwrap();
    assert!(rx.wait_until_stopped(WAIT));

    let mut sink = RecordingSink::failing_after(2);
    let err = forward(&rx, &mut sink).unwrap();
    assert!(matches!(err, TransportError::Write { .. }));
    assert_eq!(sink.bytes(), b"ab");
    assert_eq!(rx.pop_oldest().unwrap().bytes, b"c");
}
