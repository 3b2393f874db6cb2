use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{BarreError, Result};

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Parse a money string into cents. Accepts `$`, thousands separators,
/// a leading `-`, and accounting-style parentheses for negatives.
pub fn parse_money(raw: &str) -> Result<i64> {
    let cleaned = raw.replace(',', "").replace('"', "").replace('$', "");
    let mut s = cleaned.trim();
    let mut negative = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest;
    }

    let (dollars, cents) = match s.split_once('.') {
        Some((d, c)) => (d, c),
        None => (s, ""),
    };
    if dollars.is_empty() && cents.is_empty() {
        return Err(BarreError::InvalidMoney(raw.to_string()));
    }
    if !dollars.chars().all(|c| c.is_ascii_digit())
        || !cents.chars().all(|c| c.is_ascii_digit())
        || cents.len() > 2
    {
        return Err(BarreError::InvalidMoney(raw.to_string()));
    }

    let dollar_part: i64 = if dollars.is_empty() {
        0
    } else {
        dollars
            .parse()
            .map_err(|_| BarreError::InvalidMoney(raw.to_string()))?
    };
    let cent_part: i64 = match cents.len() {
        0 => 0,
        1 => cents.parse::<i64>().unwrap_or(0) * 10,
        _ => cents.parse::<i64>().unwrap_or(0),
    };

    let total = dollar_part * 100 + cent_part;
    Ok(if negative { -total } else { total })
}

/// Empty field means "no override", not zero.
pub fn parse_opt_money(raw: &str) -> Result<Option<i64>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_money(raw).map(Some)
    }
}

/// Accept ISO dates and US-style M/D/YYYY. Anything else is a validation
/// failure, never a silently non-comparable value.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .map_err(|_| BarreError::InvalidDate(raw.to_string()))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Table kinds — enum dispatch, one importer per record table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableKind {
    Families,
    Students,
    ClassGroups,
    Classes,
    Attendance,
    AdditionalFees,
    Payments,
}

const ALL_TABLES: &[TableKind] = &[
    TableKind::Families,
    TableKind::Students,
    TableKind::ClassGroups,
    TableKind::Classes,
    TableKind::Attendance,
    TableKind::AdditionalFees,
    TableKind::Payments,
];

impl TableKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Families => "families",
            Self::Students => "students",
            Self::ClassGroups => "class_groups",
            Self::Classes => "classes",
            Self::Attendance => "attendance",
            Self::AdditionalFees => "additional_fees",
            Self::Payments => "payments",
        }
    }

    /// Minimum column count for a valid row.
    fn arity(&self) -> usize {
        match self {
            Self::Families => 2,
            // id, name (unused), family_id; group and active flag optional
            Self::Students => 3,
            Self::ClassGroups => 3,
            Self::Classes => 3,
            Self::Attendance => 3,
            // id, student_id, date, notes (unused), price
            Self::AdditionalFees => 5,
            Self::Payments => 4,
        }
    }

    fn insert_row(&self, conn: &Connection, record: &StringRecord, line: usize) -> Result<()> {
        if record.len() < self.arity() {
            return Err(BarreError::BadRow {
                table: self.key(),
                line,
                reason: format!(
                    "expected at least {} columns, got {}",
                    self.arity(),
                    record.len()
                ),
            });
        }
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let bad = |e: BarreError| BarreError::BadRow {
            table: self.key(),
            line,
            reason: e.to_string(),
        };

        match self {
            Self::Families => {
                conn.execute(
                    "INSERT INTO families (id, name) VALUES (?1, ?2)",
                    rusqlite::params![field(0), field(1)],
                )?;
            }
            Self::Students => {
                // Column 1 is the student's name; only the id matters here.
                // Flat-attendance era sheets have no active flag; absent
                // means active, present-but-blank means inactive.
                let is_active = match record.get(4) {
                    None => true,
                    Some(raw) => parse_bool(raw).ok_or_else(|| BarreError::BadRow {
                        table: self.key(),
                        line,
                        reason: format!("invalid boolean: '{}'", raw.trim()),
                    })?,
                };
                conn.execute(
                    "INSERT INTO students (id, family_id, class_group_id, is_active) \
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![field(0), field(2), field(3), is_active],
                )?;
            }
            Self::ClassGroups => {
                let price = parse_money(&field(2)).map_err(bad)?;
                conn.execute(
                    "INSERT INTO class_groups (id, name, price) VALUES (?1, ?2, ?3)",
                    rusqlite::params![field(0), field(1), price],
                )?;
            }
            Self::Classes => {
                let date = parse_date(&field(2)).map_err(bad)?;
                let price = parse_opt_money(&field(3)).map_err(bad)?;
                conn.execute(
                    "INSERT INTO classes (id, class_group_id, date, price) \
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![field(0), field(1), date.to_string(), price],
                )?;
            }
            Self::Attendance => {
                // Column 3 is unused in the sheet layout; price is column 4.
                let price = parse_opt_money(&field(4)).map_err(bad)?;
                conn.execute(
                    "INSERT INTO attendance (id, student_id, class_id, price) \
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![field(0), field(1), field(2), price],
                )?;
            }
            Self::AdditionalFees => {
                let date = parse_date(&field(2)).map_err(bad)?;
                let price = parse_money(&field(4)).map_err(bad)?;
                conn.execute(
                    "INSERT INTO additional_fees (id, student_id, date, price) \
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![field(0), field(1), date.to_string(), price],
                )?;
            }
            Self::Payments => {
                let date = parse_date(&field(2)).map_err(bad)?;
                let amount = parse_money(&field(3)).map_err(bad)?;
                conn.execute(
                    "INSERT INTO payments (id, family_id, date, amount_paid) \
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![field(0), field(1), date.to_string(), amount],
                )?;
            }
        }
        Ok(())
    }
}

pub fn get_by_key(key: &str) -> Option<TableKind> {
    ALL_TABLES.iter().find(|t| t.key() == key).copied()
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

pub struct ImportResult {
    pub imported: usize,
    pub duplicate_file: bool,
}

/// Import one CSV file into one record table. All-or-nothing: a malformed
/// row rolls back the whole file.
pub fn import_file(conn: &Connection, file_path: &Path, kind: TableKind) -> Result<ImportResult> {
    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt =
            conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1 AND table_name = ?2")?;
        if stmt.exists(rusqlite::params![checksum, kind.key()])? {
            return Ok(ImportResult {
                imported: 0,
                duplicate_file: true,
            });
        }
    }

    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let tx = conn.unchecked_transaction()?;
    let mut imported = 0usize;
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 1;
        // Header row and placeholder rows are ignored.
        if record
            .get(0)
            .is_some_and(|f| f.trim().eq_ignore_ascii_case("id"))
        {
            continue;
        }
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        kind.insert_row(&tx, &record, line)?;
        imported += 1;
    }

    tx.execute(
        "INSERT INTO imports (filename, table_name, record_count, checksum) \
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            kind.key(),
            imported as i64,
            checksum,
        ],
    )?;
    tx.commit()?;

    Ok(ImportResult {
        imported,
        duplicate_file: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("100").unwrap(), 10_000);
        assert_eq!(parse_money("$1,234.56").unwrap(), 123_456);
        assert_eq!(parse_money("42.5").unwrap(), 4_250);
        assert_eq!(parse_money("-25").unwrap(), -2_500);
        assert_eq!(parse_money("(25.00)").unwrap(), -2_500);
        assert_eq!(parse_money(".99").unwrap(), 99);
        assert!(parse_money("").is_err());
        assert!(parse_money("abc").is_err());
        assert!(parse_money("1.234").is_err());
    }

    #[test]
    fn test_parse_opt_money() {
        assert_eq!(parse_opt_money("").unwrap(), None);
        assert_eq!(parse_opt_money("  ").unwrap(), None);
        assert_eq!(parse_opt_money("15").unwrap(), Some(1_500));
        assert!(parse_opt_money("x").is_err());
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 5).unwrap();
        assert_eq!(parse_date("2024-09-05").unwrap(), expected);
        assert_eq!(parse_date("9/5/2024").unwrap(), expected);
        assert!(parse_date("not a date").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_get_by_key() {
        assert_eq!(get_by_key("families"), Some(TableKind::Families));
        assert_eq!(get_by_key("class_groups"), Some(TableKind::ClassGroups));
        assert_eq!(get_by_key("bogus"), None);
    }

    #[test]
    fn test_import_families() {
        let (dir, conn) = test_db();
        let path = write_csv(&dir, "families.csv", "id,name\nF1,Garcia\nF2,\n,\n");
        let result = import_file(&conn, &path, TableKind::Families).unwrap();
        // Placeholder (all-empty) row skipped; empty-name row kept.
        assert_eq!(result.imported, 2);
        let empty_names: i64 = conn
            .query_row("SELECT count(*) FROM families WHERE name = ''", [], |r| r.get(0))
            .unwrap();
        assert_eq!(empty_names, 1);
    }

    #[test]
    fn test_import_students_defaults() {
        let (dir, conn) = test_db();
        // Flat-era layout: no class group, no active flag.
        let path = write_csv(&dir, "students.csv", "S1,Ana Garcia,F1\n");
        import_file(&conn, &path, TableKind::Students).unwrap();
        let (group, active): (String, bool) = conn
            .query_row(
                "SELECT class_group_id, is_active FROM students WHERE id = 'S1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(group, "");
        assert!(active);
    }

    #[test]
    fn test_import_students_blank_flag_means_inactive() {
        let (dir, conn) = test_db();
        let path = write_csv(&dir, "students.csv", "S1,Ana Garcia,F1,G1,\n");
        import_file(&conn, &path, TableKind::Students).unwrap();
        let active: bool = conn
            .query_row("SELECT is_active FROM students WHERE id = 'S1'", [], |r| r.get(0))
            .unwrap();
        assert!(!active);
    }

    #[test]
    fn test_import_classes_price_override() {
        let (dir, conn) = test_db();
        let path = write_csv(
            &dir,
            "classes.csv",
            "C1,G1,2024-09-05,\nC2,G1,9/12/2024,120\n",
        );
        let result = import_file(&conn, &path, TableKind::Classes).unwrap();
        assert_eq!(result.imported, 2);
        let p1: Option<i64> = conn
            .query_row("SELECT price FROM classes WHERE id = 'C1'", [], |r| r.get(0))
            .unwrap();
        let p2: Option<i64> = conn
            .query_row("SELECT price FROM classes WHERE id = 'C2'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(p1, None);
        assert_eq!(p2, Some(12_000));
        // Dates normalized to ISO
        let d2: String = conn
            .query_row("SELECT date FROM classes WHERE id = 'C2'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(d2, "2024-09-12");
    }

    #[test]
    fn test_import_bad_row_aborts_file() {
        let (dir, conn) = test_db();
        let path = write_csv(
            &dir,
            "payments.csv",
            "P1,F1,2024-09-01,100\nP2,F1,whenever,50\n",
        );
        let err = import_file(&conn, &path, TableKind::Payments).err().unwrap();
        assert!(matches!(err, BarreError::BadRow { line: 2, .. }), "got: {err}");
        let count: i64 = conn
            .query_row("SELECT count(*) FROM payments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0, "bad row must roll back the whole file");
    }

    #[test]
    fn test_import_rejects_short_row() {
        let (dir, conn) = test_db();
        let path = write_csv(&dir, "payments.csv", "P1,F1\n");
        let err = import_file(&conn, &path, TableKind::Payments).err().unwrap();
        assert!(matches!(err, BarreError::BadRow { .. }), "got: {err}");
    }

    #[test]
    fn test_duplicate_file_skipped() {
        let (dir, conn) = test_db();
        let path = write_csv(&dir, "families.csv", "F1,Garcia\n");
        let first = import_file(&conn, &path, TableKind::Families).unwrap();
        assert!(!first.duplicate_file);
        let second = import_file(&conn, &path, TableKind::Families).unwrap();
        assert!(second.duplicate_file);
        let count: i64 = conn
            .query_row("SELECT count(*) FROM families", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_import_attendance_unused_column() {
        let (dir, conn) = test_db();
        let path = write_csv(&dir, "attendance.csv", "A1,S1,C1,note,25\nA2,S1,C2,,\n");
        let result = import_file(&conn, &path, TableKind::Attendance).unwrap();
        assert_eq!(result.imported, 2);
        let p1: Option<i64> = conn
            .query_row("SELECT price FROM attendance WHERE id = 'A1'", [], |r| r.get(0))
            .unwrap();
        let p2: Option<i64> = conn
            .query_row("SELECT price FROM attendance WHERE id = 'A2'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(p1, Some(2_500));
        assert_eq!(p2, None);
    }
}
