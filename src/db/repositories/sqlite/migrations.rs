use rusqlite::{Connection, Transaction};

use crate::db::repository::{RepositoryError, RepositoryResult};

const CURRENT_SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &mut Connection) -> RepositoryResult<()> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(RepositoryError::configuration(format!(
            "database version ({}) is newer than supported schema ({})",
            version, CURRENT_SCHEMA_VERSION
        )));
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let mut current = version;
    while current < CURRENT_SCHEMA_VERSION {
        let next_version = current + 1;
        apply_migration(&tx, next_version)
            .map_err(|err| err.with_operation(format!("migrate_to_v{next_version}")))?;
        current = next_version;
    }

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    tx.commit()?;

    Ok(())
}

fn apply_migration(tx: &Transaction<'_>, version: i32) -> RepositoryResult<()> {
    match version {
        1 => {
            tx.execute_batch(include_str!("schemas/schema_v1.sql"))?;
            Ok(())
        }
        _ => Err(RepositoryError::configuration(format!(
            "unknown migration target version: {version}"
        ))),
    }
}
