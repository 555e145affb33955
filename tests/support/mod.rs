//! Shared test-only logging init, grounded on the teacher's `colored`
//! dependency (never exercised in the teacher's own source) plus
//! `marcosfpr-adarank/src/utils/logging.rs`'s level-colored formatter.
use std::io::Write;
use std::sync::Once;

use colored::Colorize;
use log::Level;

static INIT: Once = Once::new();

/// Call at the top of a test to get `RUST_LOG`-controlled, colorized
/// output on `cargo test -- --nocapture`. Safe to call from every test in
/// a binary; only the first call actually installs the logger.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .format(|buf, record| {
                writeln!(buf, "[{}] {}", color_by_level(record.level()), record.args())
            })
            .try_init();
    });
}

fn color_by_level(level: Level) -> colored::ColoredString {
    match level {
        Level::Error => "ERROR".red(),
        Level::Warn => "WARN".yellow(),
        Level::Info => "INFO".blue(),
        Level::Debug => "DEBUG".green(),
        Level::Trace => "TRACE".magenta(),
    }
}
