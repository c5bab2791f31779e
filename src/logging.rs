//! Logger setup: `env_logger` behind the `log` facade with local timestamps.

use std::io::Write;

use crate::config::Profile;

/// Install the global logger.
///
/// `RUST_LOG` takes precedence over the profile's default level. Calling this
/// more than once keeps the first logger.
pub fn init(profile: Profile) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(profile.default_log_level());
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format(|buf, record| {
        let now = chrono::Local::now();
        writeln!(
            buf,
            "{}  {:<5} [{}] {}",
            now.format("%Y-%m-%d %H:%M:%S%.6f"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    if builder.try_init().is_err() {
        log::debug!("logger already initialized");
    }
}
