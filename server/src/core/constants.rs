// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Storefront";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "storefront";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".storefront";

/// Greeting returned from the root endpoint
pub const WELCOME_MESSAGE: &str = "Welcome to Storefront";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "storefront.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "STOREFRONT_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "STOREFRONT_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "STOREFRONT_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "STOREFRONT_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "STOREFRONT_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Default request body limit (1MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "STOREFRONT_DATA_DIR";

// =============================================================================
// Environment Variables - Catalog
// =============================================================================

/// Environment variable for the default page size
pub const ENV_PAGE_SIZE: &str = "STOREFRONT_PAGE_SIZE";

/// Environment variable for the maximum page size
pub const ENV_MAX_PAGE_SIZE: &str = "STOREFRONT_MAX_PAGE_SIZE";

/// Environment variable for the PayPal client id served to the checkout page
pub const ENV_PAYPAL_CLIENT_ID: &str = "STOREFRONT_PAYPAL_CLIENT_ID";

// =============================================================================
// Catalog Defaults
// =============================================================================

/// Products per page when the request sets no limit
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest page size a request may ask for
pub const MAX_PAGE_SIZE: u32 = 100;

/// Products returned by the top rated endpoint
pub const DEFAULT_TOP_RATED_LIMIT: u32 = 4;

/// Upper bound for the top rated `limit` query parameter
pub const MAX_TOP_RATED_LIMIT: u32 = 50;

/// Maximum product id length accepted in paths
pub const MAX_PRODUCT_ID_LENGTH: usize = 64;

/// Largest catalog import file (bytes)
pub const MAX_IMPORT_FILE_BYTES: u64 = 64 * 1024 * 1024;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "storefront.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Shutdown
// =============================================================================

/// Time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
