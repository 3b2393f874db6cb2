use std::path::Path;

use rusqlite::Connection;

use crate::error::{BarreError, Result};
use crate::loader::parse_date;
use crate::models::{
    AdditionalFee, Attendance, ClassGroup, ClassSession, Family, Payment, Snapshot, Student,
};

// The seven record tables are logical joins only; no SQL-level foreign keys,
// so inconsistent references surface as explicit errors at compute time.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS families (
    id TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS students (
    id TEXT NOT NULL,
    family_id TEXT NOT NULL,
    class_group_id TEXT NOT NULL DEFAULT '',
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS class_groups (
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    price INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS classes (
    id TEXT NOT NULL DEFAULT '',
    class_group_id TEXT NOT NULL,
    date TEXT NOT NULL,
    price INTEGER
);

CREATE TABLE IF NOT EXISTS attendance (
    id TEXT NOT NULL,
    student_id TEXT NOT NULL,
    class_id TEXT NOT NULL,
    price INTEGER
);

CREATE TABLE IF NOT EXISTS additional_fees (
    id TEXT NOT NULL,
    student_id TEXT NOT NULL,
    date TEXT NOT NULL,
    price INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS payments (
    id TEXT NOT NULL,
    family_id TEXT NOT NULL,
    date TEXT NOT NULL,
    amount_paid INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    table_name TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT
);
";

pub const REQUIRED_TABLES: &[&str] = &[
    "families",
    "students",
    "class_groups",
    "classes",
    "attendance",
    "additional_fees",
    "payments",
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// A missing record table is a fatal configuration error.
pub fn require_table(conn: &Connection, name: &str) -> Result<()> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    if stmt.exists([name])? {
        Ok(())
    } else {
        Err(BarreError::MissingTable(name.to_string()))
    }
}

/// Read every record table into memory, in row order.
pub fn load_snapshot(conn: &Connection) -> Result<Snapshot> {
    for table in REQUIRED_TABLES {
        require_table(conn, table)?;
    }

    let mut snap = Snapshot::default();

    let mut stmt = conn.prepare("SELECT id, name FROM families ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    for row in rows {
        let (id, name) = row?;
        snap.families.push(Family { id, name });
    }

    let mut stmt = conn
        .prepare("SELECT id, family_id, class_group_id, is_active FROM students ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok(Student {
            id: row.get(0)?,
            family_id: row.get(1)?,
            class_group_id: row.get(2)?,
            is_active: row.get(3)?,
        })
    })?;
    for row in rows {
        snap.students.push(row?);
    }

    let mut stmt = conn.prepare("SELECT id, name, price FROM class_groups ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok(ClassGroup {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
        })
    })?;
    for row in rows {
        snap.class_groups.push(row?);
    }

    let mut stmt =
        conn.prepare("SELECT id, class_group_id, date, price FROM classes ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<i64>>(3)?,
        ))
    })?;
    for row in rows {
        let (id, class_group_id, date, price) = row?;
        snap.classes.push(ClassSession {
            id,
            class_group_id,
            date: parse_date(&date)?,
            price,
        });
    }

    let mut stmt =
        conn.prepare("SELECT id, student_id, class_id, price FROM attendance ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok(Attendance {
            id: row.get(0)?,
            student_id: row.get(1)?,
            class_id: row.get(2)?,
            price: row.get(3)?,
        })
    })?;
    for row in rows {
        snap.attendance.push(row?);
    }

    let mut stmt =
        conn.prepare("SELECT id, student_id, date, price FROM additional_fees ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;
    for row in rows {
        let (id, student_id, date, price) = row?;
        snap.additional_fees.push(AdditionalFee {
            id,
            student_id,
            date: parse_date(&date)?,
            price,
        });
    }

    let mut stmt =
        conn.prepare("SELECT id, family_id, date, amount_paid FROM payments ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;
    for row in rows {
        let (id, family_id, date, amount_paid) = row?;
        snap.payments.push(Payment {
            id,
            family_id,
            date: parse_date(&date)?,
            amount_paid,
        });
    }

    Ok(snap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        for table in REQUIRED_TABLES {
            require_table(&conn, table).unwrap();
        }
        require_table(&conn, "imports").unwrap();
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_missing_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("empty.db")).unwrap();
        let err = load_snapshot(&conn).err().unwrap();
        assert!(matches!(err, BarreError::MissingTable(_)), "got: {err}");
    }

    #[test]
    fn test_load_snapshot_preserves_row_order() {
        let (_dir, conn) = test_db();
        for id in ["F3", "F1", "F2"] {
            conn.execute(
                "INSERT INTO families (id, name) VALUES (?1, ?2)",
                [id, &format!("Family {id}")[..]],
            )
            .unwrap();
        }
        let snap = load_snapshot(&conn).unwrap();
        let ids: Vec<&str> = snap.families.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["F3", "F1", "F2"]);
    }

    #[test]
    fn test_load_snapshot_rejects_bad_stored_date() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO payments (id, family_id, date, amount_paid) VALUES ('P1', 'F1', 'soon', 100)",
            [],
        )
        .unwrap();
        let err = load_snapshot(&conn).err().unwrap();
        assert!(matches!(err, BarreError::InvalidDate(_)), "got: {err}");
    }

    #[test]
    fn test_load_snapshot_typed_fields() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO students (id, family_id, class_group_id, is_active) VALUES ('S1', 'F1', 'G1', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO classes (id, class_group_id, date, price) VALUES ('C1', 'G1', '2024-09-05', NULL)",
            [],
        )
        .unwrap();
        let snap = load_snapshot(&conn).unwrap();
        assert!(!snap.students[0].is_active);
        assert_eq!(snap.classes[0].price, None);
        assert_eq!(
            snap.classes[0].date,
            chrono::NaiveDate::from_ymd_opt(2024, 9, 5).unwrap()
        );
    }
}
