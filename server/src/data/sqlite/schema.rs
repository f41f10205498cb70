//! SQLite schema definitions

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- Products
-- The full product document is stored as JSON; name and rating are
-- extracted for ordering.
-- =============================================================================
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY CHECK(length(id) >= 1 AND length(id) <= 64),
    name TEXT NOT NULL,
    rating REAL NOT NULL DEFAULT 0,
    document TEXT NOT NULL CHECK(json_valid(document)),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_rating ON products(rating DESC);
"#;
