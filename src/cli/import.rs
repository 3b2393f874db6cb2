use std::path::PathBuf;

use crate::error::{BarreError, Result};
use crate::loader;
use crate::settings::get_data_dir;
use crate::store::{get_connection, require_table};

pub fn run(file: &str, table: &str) -> Result<()> {
    let kind = loader::get_by_key(table).ok_or_else(|| BarreError::UnknownTable(table.to_string()))?;

    let file_path = PathBuf::from(file);
    let conn = get_connection(&get_data_dir().join("barre.db"))?;
    require_table(&conn, kind.key())?;

    let result = loader::import_file(&conn, &file_path, kind)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!("{} rows imported into {}", result.imported, kind.key());
    Ok(())
}
