use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarreError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required table not found: {0} (run `barre init` first)")]
    MissingTable(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("{table} row {line}: {reason}")]
    BadRow {
        table: &'static str,
        line: usize,
        reason: String,
    },

    #[error("Invalid date: '{0}' (expected YYYY-MM-DD or M/D/YYYY)")]
    InvalidDate(String),

    #[error("Invalid amount: '{0}'")]
    InvalidMoney(String),

    #[error("Attendance {attendance_id} references unknown class: {class_id}")]
    UnresolvedClass {
        attendance_id: String,
        class_id: String,
    },

    #[error("Class {class_id} references unknown class group: {group_id}")]
    UnresolvedGroup { class_id: String, group_id: String },

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, BarreError>;
