//! Plain message payloads with a custom sender identity
//!
//! Run with: cargo run --example plain_messages -- <webhook-url> [<webhook-url>...]

use discord_logger::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: plain_messages <webhook-url> [<webhook-url>...]");
        std::process::exit(2);
    }

    let dispatcher = Arc::new(Dispatcher::spawn(
        Arc::new(WebhookTransport::new()),
        DispatcherConfig::default().on_warning(Arc::new(|warning: &Warning| {
            eprintln!("webhook problem: {}", warning);
        })),
    )?);

    let logger = Logger::builder("PlainMessages")
        .webhook_urls(urls)
        .payload_type(PayloadType::Message)
        .embed(OptionalField::Thread, true)
        .embed(OptionalField::Line, true)
        .username("build-bot")
        .dispatcher(Arc::clone(&dispatcher))
        .build()?;

    logger.info("Build started");
    for step in ["fetch", "compile", "test"] {
        discord_logger::info!(logger, "Step '{}' finished", step);
    }
    logger.log(30, "Cache miss rate above 40%")?;

    // Stopping discards the queue, so wait for every send to settle first
    let expected = 5 * logger.webhook_urls().len() as u64;
    let metrics = dispatcher.metrics();
    while metrics.delivered() + metrics.failed() < expected && dispatcher.is_running() {
        std::thread::sleep(Duration::from_millis(50));
    }
    dispatcher.stop(Duration::from_secs(5));
    Ok(())
}
