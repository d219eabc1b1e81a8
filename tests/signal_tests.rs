//! Termination signal handling
//!
//! The signal is raised in a child copy of this test binary so the parent
//! test process is never targeted.

#![cfg(all(unix, feature = "signals"))]

use crossbeam_channel::{bounded, Receiver, Sender};
use discord_logger::prelude::*;
use discord_logger::WirePayload;
use once_cell::sync::OnceCell;
use signal_hook::consts::SIGTERM;
use std::process::Command;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const CHILD_ENV: &str = "DISCORD_LOGGER_SIGNAL_CHILD";
const CHILD_TEST: &str = "sigterm_child_scenario";

static DISPATCHER: OnceCell<Arc<Dispatcher>> = OnceCell::new();

/// Holds every send until released
struct GatedTransport {
    entered: Sender<()>,
    release: Receiver<()>,
}

impl Transport for GatedTransport {
    fn send(&self, _url: &str, _payload: &WirePayload) -> discord_logger::Result<u16> {
        let _ = self.entered.send(());
        let _ = self.release.recv_timeout(Duration::from_secs(5));
        Ok(200)
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// Runs only inside the child process started by the test below
#[test]
fn sigterm_child_scenario() {
    if std::env::var_os(CHILD_ENV).is_none() {
        return;
    }

    let (entered_tx, entered_rx) = bounded(8);
    let (release_tx, release_rx) = bounded(8);
    let transport = Arc::new(GatedTransport {
        entered: entered_tx,
        release: release_rx,
    });

    let config = DispatcherConfig::default()
        .handle_signals(true)
        .poll_interval(Duration::from_millis(20))
        .on_warning(Arc::new(|w: &Warning| {
            let state = DISPATCHER.get().map(|d| d.state());
            println!("warning: {} [state {:?}]", w, state);
        }));
    let dispatcher = Arc::new(Dispatcher::spawn(transport, config).unwrap());
    DISPATCHER.set(Arc::clone(&dispatcher)).unwrap();

    let logger = Logger::builder("Signals")
        .webhook_url("https://discord.test/api/webhooks/1/token")
        .dispatcher(Arc::clone(&dispatcher))
        .build()
        .unwrap();
    for i in 0..3 {
        logger.error(format!("queued {}", i));
    }

    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("first payload never reached the transport");
    signal_hook::low_level::raise(SIGTERM).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !dispatcher.is_stop_requested() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    println!("stop requested: {}", dispatcher.is_stop_requested());
    release_tx.send(()).unwrap();

    thread::sleep(Duration::from_secs(3));
    println!("still alive: state {:?}", dispatcher.state());
}

#[test]
fn test_sigterm_stops_worker_then_terminates_process() {
    let output = Command::new(std::env::current_exe().unwrap())
        .args([CHILD_TEST, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .expect("Failed to start child test process");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("stop requested: true"), "stdout: {}", stdout);
    assert!(
        stdout.contains(
            "warning: Dispatcher stopped with 2 pending payloads; they were discarded \
             [state Some(Stopped)]"
        ),
        "stdout: {}",
        stdout
    );
    assert!(!stdout.contains("still alive"), "stdout: {}", stdout);
    assert!(!output.status.success(), "child exited normally: {:?}", output.status);
}
