use rusqlite::Connection;

use crate::error::Result;
use crate::settings::get_data_dir;
use crate::store::{get_connection, init_db};

/// A small sample studio: two families, three class groups, a term of
/// sessions, a costume fee, and a couple of payments.
pub fn run() -> Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let conn = get_connection(&data_dir.join("barre.db"))?;
    init_db(&conn)?;

    let existing: i64 = conn.query_row("SELECT count(*) FROM families", [], |r| r.get(0))?;
    if existing > 0 {
        println!("Database already has families; demo data not loaded.");
        return Ok(());
    }

    seed(&conn)?;

    println!("Demo data loaded. Try:");
    println!("  barre balances --as-of 2024-10-31");
    println!("  barre balances --as-of 2024-10-31 --mode flat-attendance");
    Ok(())
}

fn seed(conn: &Connection) -> Result<()> {
    let families = [("F1", "Garcia"), ("F2", "Okafor")];
    for (id, name) in families {
        conn.execute("INSERT INTO families (id, name) VALUES (?1, ?2)", [id, name])?;
    }

    // (id, family, group, active)
    let students = [
        ("S1", "F1", "G1", true),
        ("S2", "F1", "G2", true),
        ("S3", "F2", "G1", true),
        ("S4", "F2", "G3", false),
    ];
    for (id, family_id, group_id, active) in students {
        conn.execute(
            "INSERT INTO students (id, family_id, class_group_id, is_active) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, family_id, group_id, active],
        )?;
    }

    // (id, name, default price in cents)
    let groups = [
        ("G1", "Beginner Hip Hop", 2_500i64),
        ("G2", "Intermediate Ballet", 3_000),
        ("G3", "Advanced Breaking", 3_500),
    ];
    for (id, name, price) in groups {
        conn.execute(
            "INSERT INTO class_groups (id, name, price) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, price],
        )?;
    }

    // Weekly sessions, September and October 2024. One October hip hop
    // session is a priced-up showcase rehearsal.
    let sessions: [(&str, &str, &str, Option<i64>); 8] = [
        ("C1", "G1", "2024-09-07", None),
        ("C2", "G1", "2024-09-14", None),
        ("C3", "G2", "2024-09-10", None),
        ("C4", "G2", "2024-09-17", None),
        ("C5", "G1", "2024-10-05", Some(4_000)),
        ("C6", "G1", "2024-10-12", None),
        ("C7", "G2", "2024-10-08", None),
        ("C8", "G3", "2024-10-11", None),
    ];
    for (id, group_id, date, price) in sessions {
        conn.execute(
            "INSERT INTO classes (id, class_group_id, date, price) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, group_id, date, price],
        )?;
    }

    let attendance: [(&str, &str, &str, Option<i64>); 7] = [
        ("A1", "S1", "C1", None),
        ("A2", "S1", "C2", None),
        ("A3", "S2", "C3", None),
        ("A4", "S2", "C4", Some(1_500)),
        ("A5", "S3", "C1", None),
        ("A6", "S1", "C5", None),
        ("A7", "S3", "C6", None),
    ];
    for (id, student_id, class_id, price) in attendance {
        conn.execute(
            "INSERT INTO attendance (id, student_id, class_id, price) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, student_id, class_id, price],
        )?;
    }

    conn.execute(
        "INSERT INTO additional_fees (id, student_id, date, price) VALUES ('X1', 'S2', '2024-09-20', 4500)",
        [],
    )?;

    let payments = [
        ("P1", "F1", "2024-09-25", 10_000i64),
        ("P2", "F2", "2024-10-01", 5_000),
    ];
    for (id, family_id, date, amount) in payments {
        conn.execute(
            "INSERT INTO payments (id, family_id, date, amount_paid) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, family_id, date, amount],
        )?;
    }

    Ok(())
}
