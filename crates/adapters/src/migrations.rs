pub const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS drafts (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        property_location_json TEXT,
        updated_at TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS draft_remote_images (
        position INTEGER PRIMARY KEY,
        url TEXT NOT NULL,
        location_json TEXT
    );",
    "CREATE TABLE IF NOT EXISTS draft_local_images (
        position INTEGER PRIMARY KEY,
        file_name TEXT NOT NULL,
        file_path TEXT NOT NULL UNIQUE,
        location_json TEXT
    );",
];
