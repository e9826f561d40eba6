//! Console logging setup.

use chrono::Local;
use eyre::Result;
use fern::Dispatch;

/// Sets up the console logger.
///
/// The level comes from `RUST_LOG` and defaults to `Info`.
///
/// # Errors
///
/// Returns an error if a logger was already installed.
pub fn setup_logger() -> Result<()> {
    Dispatch::new()
        .level(
            std::env::var("RUST_LOG")
                .map(|level| level.parse().unwrap_or(log::LevelFilter::Info))
                .unwrap_or(log::LevelFilter::Info),
        )
        .chain(std::io::stdout())
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
