//! Timing tests for the frame pacer.
//!
//! Bounds are loose so the tests hold on a loaded machine.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use lumenwall_app::FramePacer;
use rstest::rstest;

fn counting_pacer(fps: u32) -> (FramePacer, Arc<AtomicU32>) {
    common::init_logging();
    let pacer = FramePacer::new();
    pacer.set_target_fps(fps);
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    pacer.set_callback(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    });
    (pacer, calls)
}

#[rstest]
#[case(100)]
#[case(200)]
fn test_mean_period_tracks_target(#[case] fps: u32) {
    const ITERATIONS: u32 = 100;
    let (pacer, calls) = counting_pacer(fps);
    let deadline = Instant::now() + Duration::from_secs(20);
    let start = Instant::now();
    pacer.run().unwrap();
    while calls.load(Ordering::Relaxed) < ITERATIONS && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    pacer.stop().unwrap();
    let elapsed = start.elapsed();

    let n = calls.load(Ordering::Relaxed);
    assert!(n >= ITERATIONS, "only {n} ticks");
    let mean = elapsed / n;
    let ideal = Duration::from_secs(1) / fps;
    // Never faster than the target; slower only under heavy load.
    assert!(mean >= ideal.mul_f32(0.8), "mean {mean:?} vs ideal {ideal:?}");
    assert!(mean <= ideal * 3, "mean {mean:?} vs ideal {ideal:?}");
}

#[test]
fn test_counter_matches_callbacks() {
    let (pacer, calls) = counting_pacer(200);
    pacer.run().unwrap();
    thread::sleep(Duration::from_millis(100));
    pacer.stop().unwrap();

    let n = calls.load(Ordering::Relaxed);
    assert!(n > 0);
    let mut consumed = 0;
    while pacer.consume_frame() {
        consumed += 1;
    }
    assert_eq!(consumed, n);
    assert!(!pacer.has_pending_frame());
    assert!(!pacer.consume_frame());
}

#[test]
fn test_stop_wakes_long_wait() {
    let (pacer, calls) = counting_pacer(1);
    pacer.run().unwrap();
    while calls.load(Ordering::Relaxed) == 0 {
        thread::sleep(Duration::from_millis(1));
    }
    let start = Instant::now();
    pacer.stop().unwrap();
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_run_twice_is_noop() {
    let (pacer, calls) = counting_pacer(1);
    pacer.run().unwrap();
    pacer.run().unwrap();
    thread::sleep(Duration::from_millis(100));
    pacer.stop().unwrap();
    // A second loop would have ticked immediately too.
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn test_restart_after_stop() {
    let (pacer, calls) = counting_pacer(200);
    pacer.run().unwrap();
    pacer.stop().unwrap();
    let first = calls.load(Ordering::Relaxed);
    assert!(!pacer.is_running());

    pacer.run().unwrap();
    thread::sleep(Duration::from_millis(50));
    pacer.stop().unwrap();
    assert!(calls.load(Ordering::Relaxed) > first);
}

#[test]
fn test_drop_stops_loop() {
    let (pacer, calls) = counting_pacer(200);
    pacer.run().unwrap();
    thread::sleep(Duration::from_millis(20));
    drop(pacer);
    let after_drop = calls.load(Ordering::Relaxed);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(calls.load(Ordering::Relaxed), after_drop);
}
