//! Scroll trace: drives the motion engine with a few synthetic wheel events
//! and prints every pixel delta the tick thread emits.
//!
//! Usage:
//! ```text
//! cargo run --example scroll_trace                       # built-in defaults
//! cargo run --example scroll_trace -- motion.toml        # load a config file
//! RUST_LOG=glidepath=trace cargo run --example scroll_trace
//! ```

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use glidepath::animation::{Axis, Channel, InputEvent};
use glidepath::config::MotionConfig;
use glidepath::engine::MotionEngine;
use glidepath::math::Vector2;

fn main() -> glidepath::Result<()> {
    // Default: WARN for everything, INFO for glidepath.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("scroll_trace=info".parse().unwrap_or_default())
        .add_directive("glidepath=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = match std::env::args().nth(1) {
        Some(path) => MotionConfig::load(Path::new(&path))?,
        None => MotionConfig::default(),
    };
    let source = Box::new(config.fixed_tick_source()?);

    let (sink, events) = mpsc::channel();
    let engine = MotionEngine::spawn(config, source, sink)?;
    let input = engine.handle();

    // Two wheel notches, the second arriving mid-animation and superseding
    // the first, then a pointer nudge on its own channel.
    let origin = Instant::now();
    let inputs = [
        (0, InputEvent::new(Channel::Scroll, Vector2::new(0.0, 120.0), Duration::ZERO)),
        (90, InputEvent::new(Channel::Scroll, Vector2::new(0.0, -45.5), Duration::ZERO)),
        (100, InputEvent::new(Channel::Pointer, Vector2::new(17.3, -4.2), Duration::ZERO)),
    ];
    let feeder = thread::spawn(move || -> glidepath::Result<()> {
        for (at_ms, event) in inputs {
            let due = origin + Duration::from_millis(at_ms);
            thread::sleep(due.saturating_duration_since(Instant::now()));
            let handle = input.submit(&event)?;
            tracing::info!(handle = handle.serial(), channel = ?event.channel, "submitted");
        }
        Ok(())
    });

    let mut totals = [(0_i64, 0_i64); 2];
    while let Ok(event) = events.recv_timeout(Duration::from_millis(500)) {
        println!(
            "{:>8.3} ms  #{:<2} {:?} {:?} {:+}",
            event.timestamp.as_secs_f64() * 1e3,
            event.handle.serial(),
            event.channel,
            event.axis,
            event.delta,
        );
        let slot = match event.channel {
            Channel::Scroll => &mut totals[0],
            Channel::Pointer => &mut totals[1],
        };
        match event.axis {
            Axis::X => slot.0 += event.delta,
            Axis::Y => slot.1 += event.delta,
        }
    }

    match feeder.join() {
        Ok(result) => result?,
        Err(_) => tracing::warn!("input thread panicked"),
    }
    println!("scroll total:  {:?}", totals[0]);
    println!("pointer total: {:?}", totals[1]);
    engine.shutdown()
}
