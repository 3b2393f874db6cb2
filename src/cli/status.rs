use crate::error::Result;
use crate::settings::load_settings;
use crate::store::{get_connection, require_table, REQUIRED_TABLES};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("barre.db");

    println!(
        "Studio:     {}",
        if settings.studio_name.is_empty() {
            "(not set)"
        } else {
            &settings.studio_name
        }
    );
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        println!();
        for table in REQUIRED_TABLES {
            require_table(&conn, table)?;
            let count: i64 =
                conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?;
            println!("{table:<16} {count}");
        }
    } else {
        println!();
        println!("Database not found. Run `barre init` to set up.");
    }

    Ok(())
}
