//! Background delivery worker
//!
//! One thread owns the receiving end of the payload queue. It waits on the
//! queue with a bounded timeout so that a stop request (explicit or from a
//! termination signal) is noticed even when nothing is being logged.
//!
//! Shutdown does not flush: once stopped, whatever is still queued is
//! counted, reported as [`Warning::PendingDiscarded`] and dropped. A payload
//! that was already dequeued is delivered to all of its destinations first.
//!
//! With signal handling enabled, SIGTERM / SIGINT / SIGQUIT stop the worker
//! and, once it has exited, the signal's default action is carried out so
//! the host process terminates as it would without the logger.

use super::{
    error::{LoggerError, Result},
    log_record::LogRecord,
    metrics::DispatchMetrics,
    payload::WirePayload,
    transport::Transport,
    warning::{redact_url, stderr_handler, Warning, WarningHandler},
};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long the worker waits for a payload before re-checking the stop flag
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default time [`Dispatcher::stop`] waits for the worker when dropped
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// One formatted record bound for one or more webhooks
#[derive(Debug, Clone)]
pub struct LogPayload {
    pub record: LogRecord,
    pub body: WirePayload,
    pub destinations: Arc<[String]>,
}

impl LogPayload {
    pub fn new(record: LogRecord, body: WirePayload, destinations: Arc<[String]>) -> Self {
        Self {
            record,
            body,
            destinations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DispatcherState {
    /// Waiting on the queue
    Idle = 0,
    /// Delivering a payload
    Draining = 1,
    /// Worker has exited
    Stopped = 2,
}

impl DispatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DispatcherState::Idle,
            1 => DispatcherState::Draining,
            _ => DispatcherState::Stopped,
        }
    }
}

#[derive(Clone)]
pub struct DispatcherConfig {
    pub poll_interval: Duration,
    /// `None` for an unbounded queue
    pub queue_capacity: Option<usize>,
    /// Stop the worker on SIGTERM / SIGINT / SIGQUIT
    pub handle_signals: bool,
    pub on_warning: WarningHandler,
}

impl DispatcherConfig {
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn handle_signals(mut self, enable: bool) -> Self {
        self.handle_signals = enable;
        self
    }

    #[must_use]
    pub fn on_warning(mut self, handler: WarningHandler) -> Self {
        self.on_warning = handler;
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            queue_capacity: None,
            handle_signals: cfg!(feature = "signals"),
            on_warning: stderr_handler(),
        }
    }
}

impl fmt::Debug for DispatcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field("poll_interval", &self.poll_interval)
            .field("queue_capacity", &self.queue_capacity)
            .field("handle_signals", &self.handle_signals)
            .finish_non_exhaustive()
    }
}

/// State shared between the handle, the worker and signal handlers
struct Shared {
    state: AtomicU8,
    stop: Arc<AtomicBool>,
    /// Set once the worker has reported what it discarded
    exited: AtomicBool,
    /// Held shared by producers around `try_send`, exclusively by the final sweep
    intake: RwLock<()>,
    metrics: DispatchMetrics,
    on_warning: WarningHandler,
}

impl Shared {
    fn set_state(&self, state: DispatcherState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn state(&self) -> DispatcherState {
        DispatcherState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    fn warn(&self, warning: &Warning) {
        tracing::trace!(target: "discord_logger", %warning, "reporting warning");
        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (self.on_warning)(warning)));
        if result.is_err() {
            eprintln!("[DISCORD LOGGER ERROR] Warning handler panicked while reporting: {}", warning);
        }
    }
}

struct Worker {
    receiver: Receiver<LogPayload>,
    transport: Arc<dyn Transport>,
    shared: Arc<Shared>,
    poll_interval: Duration,
}

impl Worker {
    fn run(self) {
        tracing::debug!(
            target: "discord_logger",
            transport = self.transport.name(),
            "dispatcher started"
        );

        loop {
            if self.shared.stop_requested() {
                break;
            }
            match self.receiver.recv_timeout(self.poll_interval) {
                Ok(payload) => {
                    self.shared.set_state(DispatcherState::Draining);
                    self.deliver(&payload);
                    self.shared.set_state(DispatcherState::Idle);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.set_state(DispatcherState::Stopped);

        // No producer can be between its stop check and `try_send` here
        let pending = {
            let _closed = self.shared.intake.write();
            self.receiver.try_iter().count()
        };
        drop(self.receiver);

        if pending > 0 {
            self.shared.metrics.record_discarded(pending as u64);
            self.shared.warn(&Warning::PendingDiscarded { count: pending });
        }
        tracing::debug!(target: "discord_logger", pending, "dispatcher stopped");
        self.shared.exited.store(true, Ordering::Release);
    }

    /// Send to every destination independently.
    ///
    /// A failing or panicking destination does not prevent the others from
    /// receiving the payload.
    fn deliver(&self, payload: &LogPayload) {
        for url in payload.destinations.iter() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                self.transport.send(url, &payload.body)
            }));

            match result {
                Ok(Ok(200)) => {
                    self.shared.metrics.record_delivered();
                    tracing::trace!(
                        target: "discord_logger",
                        url = %redact_url(url),
                        "payload delivered"
                    );
                }
                Ok(Ok(status)) => {
                    self.shared.metrics.record_failed();
                    self.shared.warn(&Warning::DeliveryFailed {
                        url: url.clone(),
                        status,
                    });
                }
                Ok(Err(e)) => {
                    self.shared.metrics.record_failed();
                    self.shared.warn(&Warning::TransportFailed {
                        url: url.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(panic_info) => {
                    let reason = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    self.shared.metrics.record_failed();
                    self.shared.warn(&Warning::TransportFailed {
                        url: url.clone(),
                        reason: format!("transport panicked: {}", reason),
                    });
                }
            }
        }
    }
}

/// Handle to the background delivery thread
///
/// # Example
///
/// ```
/// use discord_logger::transports::MemoryTransport;
/// use discord_logger::{Dispatcher, DispatcherConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let transport = Arc::new(MemoryTransport::new());
/// let dispatcher = Dispatcher::spawn(
///     transport,
///     DispatcherConfig::default().handle_signals(false),
/// )
/// .unwrap();
///
/// assert!(dispatcher.is_running());
/// assert!(dispatcher.stop(Duration::from_secs(5)));
/// assert!(!dispatcher.is_running());
/// ```
pub struct Dispatcher {
    sender: Sender<LogPayload>,
    shared: Arc<Shared>,
    capacity: Option<usize>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    #[cfg(all(feature = "signals", unix))]
    signals: Option<SignalGuard>,
}

impl Dispatcher {
    /// Start the worker thread
    pub fn spawn(transport: Arc<dyn Transport>, config: DispatcherConfig) -> Result<Self> {
        if config.queue_capacity == Some(0) {
            return Err(LoggerError::config(
                "DispatcherConfig",
                "queue capacity must be at least 1",
            ));
        }
        if config.poll_interval.is_zero() {
            return Err(LoggerError::config(
                "DispatcherConfig",
                "poll interval must be greater than zero",
            ));
        }

        let (sender, receiver) = match config.queue_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };

        let shared = Arc::new(Shared {
            state: AtomicU8::new(DispatcherState::Idle as u8),
            stop: Arc::new(AtomicBool::new(false)),
            exited: AtomicBool::new(false),
            intake: RwLock::new(()),
            metrics: DispatchMetrics::new(),
            on_warning: config.on_warning,
        });

        let worker = Worker {
            receiver,
            transport,
            shared: Arc::clone(&shared),
            poll_interval: config.poll_interval,
        };
        let handle = thread::Builder::new()
            .name("discord-logger-dispatcher".to_string())
            .spawn(move || worker.run())?;

        #[cfg(all(feature = "signals", unix))]
        let signals = if config.handle_signals {
            SignalGuard::install(&shared)
        } else {
            None
        };
        #[cfg(not(all(feature = "signals", unix)))]
        if config.handle_signals {
            tracing::debug!(
                target: "discord_logger",
                "signal handling requested but unavailable on this build"
            );
        }

        Ok(Self {
            sender,
            shared,
            capacity: config.queue_capacity,
            handle: Mutex::new(Some(handle)),
            #[cfg(all(feature = "signals", unix))]
            signals,
        })
    }

    /// Queue a payload for delivery.
    ///
    /// Never blocks: a full bounded queue fails with [`LoggerError::QueueFull`].
    /// A payload accepted here is either delivered or counted in the
    /// [`Warning::PendingDiscarded`] report.
    pub fn enqueue(&self, payload: LogPayload) -> Result<()> {
        let _open = self.shared.intake.read();
        if self.shared.stop_requested() {
            self.shared.metrics.record_dropped();
            return Err(LoggerError::DispatcherStopped);
        }

        match self.sender.try_send(payload) {
            Ok(()) => {
                self.shared.metrics.record_enqueued();
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.shared.metrics.record_dropped();
                Err(LoggerError::QueueFull {
                    capacity: self.capacity.unwrap_or_default(),
                })
            }
            Err(TrySendError::Disconnected(_)) => {
                self.shared.metrics.record_dropped();
                Err(LoggerError::DispatcherStopped)
            }
        }
    }

    /// Report a warning through the configured handler
    pub fn warn(&self, warning: &Warning) {
        self.shared.warn(warning);
    }

    /// Ask the worker to exit at its next wait-cycle boundary
    pub fn request_stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
    }

    /// Stop the worker and wait up to `timeout` for it to exit.
    ///
    /// Returns `true` if the worker has exited. Calling it from the worker
    /// thread itself (e.g. inside a warning handler) only requests the stop.
    pub fn stop(&self, timeout: Duration) -> bool {
        self.request_stop();

        let mut guard = self.handle.lock();
        let Some(handle) = guard.take() else {
            return self.state() == DispatcherState::Stopped;
        };
        if handle.thread().id() == thread::current().id() {
            *guard = Some(handle);
            return false;
        }

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[DISCORD LOGGER ERROR] Dispatcher thread panicked: {:?}", e);
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[DISCORD LOGGER WARNING] Dispatcher did not finish within {:?}; \
                     an in-flight delivery may still complete.",
                    timeout
                );
                *guard = Some(handle);
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() != DispatcherState::Stopped
    }

    pub fn is_stop_requested(&self) -> bool {
        self.shared.stop_requested()
    }

    /// Payloads waiting in the queue
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.shared.metrics
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        #[cfg(all(feature = "signals", unix))]
        if let Some(signals) = self.signals.take() {
            signals.uninstall();
        }
        self.stop(DEFAULT_SHUTDOWN_TIMEOUT);

        let dropped = self.shared.metrics.dropped();
        if dropped > 0 {
            eprintln!(
                "[DISCORD LOGGER WARNING] Dispatcher shut down after dropping {} payloads",
                dropped
            );
        }
    }
}

/// Termination signal handling owned by one dispatcher.
///
/// A helper thread turns the first signal into a stop request, waits for the
/// worker to report its discarded payloads, then emulates the signal's
/// default action. A second signal while that is in progress exits at once
/// with status 1.
#[cfg(all(feature = "signals", unix))]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    shutdown_ids: Vec<signal_hook::SigId>,
}

#[cfg(all(feature = "signals", unix))]
impl SignalGuard {
    fn install(shared: &Arc<Shared>) -> Option<Self> {
        use signal_hook::consts::TERM_SIGNALS;
        use signal_hook::flag;
        use signal_hook::iterator::Signals;

        let mut signals = match Signals::new(TERM_SIGNALS) {
            Ok(signals) => signals,
            Err(e) => {
                tracing::debug!(target: "discord_logger", error = %e, "signal handling unavailable");
                return None;
            }
        };
        let handle = signals.handle();

        let mut shutdown_ids = Vec::with_capacity(TERM_SIGNALS.len());
        for &signal in TERM_SIGNALS {
            match flag::register_conditional_shutdown(signal, 1, Arc::clone(&shared.stop)) {
                Ok(id) => shutdown_ids.push(id),
                Err(e) => {
                    tracing::debug!(target: "discord_logger", signal, error = %e, "signal not supported")
                }
            }
        }

        let shared = Arc::clone(shared);
        let spawned = thread::Builder::new()
            .name("discord-logger-signals".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    tracing::debug!(target: "discord_logger", signal, "termination signal received");
                    shared.stop.store(true, Ordering::SeqCst);

                    let deadline = Instant::now() + DEFAULT_SHUTDOWN_TIMEOUT;
                    while !shared.has_exited() && Instant::now() < deadline {
                        thread::sleep(Duration::from_millis(10));
                    }
                    if let Err(e) = signal_hook::low_level::emulate_default_handler(signal) {
                        eprintln!(
                            "[DISCORD LOGGER ERROR] Could not apply default action for signal {}: {}",
                            signal, e
                        );
                    }
                }
            });

        let guard = Self {
            handle,
            shutdown_ids,
        };
        match spawned {
            Ok(_) => Some(guard),
            Err(e) => {
                tracing::debug!(target: "discord_logger", error = %e, "signal thread not started");
                guard.uninstall();
                None
            }
        }
    }

    fn uninstall(self) {
        self.handle.close();
        for id in self.shutdown_ids {
            signal_hook::low_level::unregister(id);
        }
    }
}
