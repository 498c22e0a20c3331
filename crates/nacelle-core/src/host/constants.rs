/// Application name
pub const APP_NAME: &str = "nacelle";

/// Application version
pub const APP_VERSION: &str = "0.1.0";

/// Default pilet feed file
pub const DEFAULT_FEED_FILE: &str = "pilets.json";

/// Default host configuration file
pub const DEFAULT_CONFIG_FILE: &str = "nacelle.toml";
