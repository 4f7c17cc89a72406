use log::*;

use crate::SqliteDatabase;

pub fn init_logging() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
}

/// A fresh, fully migrated database that lives only as long as the returned handle.
pub async fn in_memory_db() -> SqliteDatabase {
    init_logging();
    let db = SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating in-memory database");
    db.run_migrations().await.expect("Error running DB migrations");
    debug!("🚀️ In-memory database ready");
    db
}
