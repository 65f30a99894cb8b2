//! `SQLite` schema definitions for outreach.
//!
//! Fresh databases get the full current layout from the `CREATE TABLE`
//! statements. Databases written by earlier releases are brought forward by
//! adding the columns in [`ADDITIVE_COLUMNS`].

/// SQL statement to create the doctor registry.
pub const CREATE_DOCTORS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS doctors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
)
";

/// SQL statement to create the camp entries table.
pub const CREATE_CAMP_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS camp_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    place TEXT,
    camp_date TEXT,
    administrator TEXT,
    doctor TEXT,
    optom TEXT,
    optom_intern TEXT,
    opd_m INTEGER,
    opd_f INTEGER,
    opd_t INTEGER,
    surg_m INTEGER,
    surg_f INTEGER,
    surg_t INTEGER,
    hosp_m INTEGER,
    hosp_f INTEGER,
    hosp_t INTEGER,
    ciplox INTEGER,
    ciplox_d INTEGER,
    cmc INTEGER,
    fedtive INTEGER,
    glucose_strips INTEGER DEFAULT 0,
    spectacles INTEGER,
    photo_name TEXT,
    latitude REAL,
    longitude REAL,
    accuracy REAL,
    created_at TEXT
)
";

/// Index backing the doctor delete-guard lookup.
pub const CREATE_DOCTOR_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_camp_entries_doctor ON camp_entries(doctor)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_DOCTORS_TABLE,
    CREATE_CAMP_ENTRIES_TABLE,
    CREATE_DOCTOR_INDEX,
];

/// Every `camp_entries` column in persisted order. Also the CSV header.
pub const ENTRY_COLUMNS: &[&str] = &[
    "id",
    "place",
    "camp_date",
    "administrator",
    "doctor",
    "optom",
    "optom_intern",
    "opd_m",
    "opd_f",
    "opd_t",
    "surg_m",
    "surg_f",
    "surg_t",
    "hosp_m",
    "hosp_f",
    "hosp_t",
    "ciplox",
    "ciplox_d",
    "cmc",
    "fedtive",
    "glucose_strips",
    "spectacles",
    "photo_name",
    "latitude",
    "longitude",
    "accuracy",
    "created_at",
];

/// Columns introduced after the first release, with the declaration used to
/// add them to an existing table.
pub const ADDITIVE_COLUMNS: &[(&str, &str)] = &[
    ("glucose_strips", "INTEGER DEFAULT 0"),
    ("photo_name", "TEXT"),
    ("latitude", "REAL"),
    ("longitude", "REAL"),
    ("accuracy", "REAL"),
];
