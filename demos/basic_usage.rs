//! Basic webhook logger usage
//!
//! Sends embeds at each level to the webhook(s) in `DISCORDLOGGER_WEBHOOK_URL`.
//!
//! Run with: DISCORDLOGGER_WEBHOOK_URL=https://discord.com/api/webhooks/... \
//!           cargo run --example basic_usage

use discord_logger::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Discord Logger - Basic Usage Example ===\n");

    let logger = get_logger_with(
        "BasicUsage",
        LoggerConfig {
            level: LogLevel::Debug,
            ..LoggerConfig::default()
        },
    )?;
    println!("Sending to {} webhook(s)", logger.webhook_urls().len());

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");

    println!("2. Raising the threshold to WARNING (debug and info are dropped):");
    logger.set_level("WARNING")?;
    logger.debug("Debug message (hidden)");
    logger.info("Info message (hidden)");
    logger.warning("Warning message (visible)");

    println!("3. Embedding caller context:");
    logger.set_embed_all(true);
    discord_logger::error!(logger, "Job {} failed after {} retries", "nightly-report", 3);

    // Give the dispatcher a moment; shutdown discards anything still queued
    std::thread::sleep(Duration::from_secs(3));
    let dispatcher = logger.dispatcher();
    println!(
        "\nDelivered: {}, failed: {}",
        dispatcher.metrics().delivered(),
        dispatcher.metrics().failed()
    );
    shutdown(Duration::from_secs(5));

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
