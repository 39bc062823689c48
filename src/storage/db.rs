use log::{debug, info, warn};
use sea_orm::sea_query::Index;
use sea_orm::sqlx::{Connection, SqliteConnection};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, EntityTrait, Schema,
    TransactionTrait,
};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::constants::LOG_SCHEMA_READY;
use crate::entities::{course, enrollment, program, student};
use crate::error::{RecordsError, Result};

const ENROLLMENT_PAIR_INDEX: &str = "idx_enrollments_student_course";

/// Local SQLite storage for academic records
pub struct Storage {
    pub conn: DatabaseConnection,
    /// Anchor connection outside the pool; a shared-cache in-memory database
    /// lives only while some connection to it is open.
    _anchor: Option<SqliteConnection>,
    /// Held for the whole of every write transaction. SQLite allows one
    /// writer; a second deferred transaction that has already read cannot
    /// upgrade its lock and fails with `database is locked`.
    write_gate: Mutex<()>,
}

/// A write transaction that owns the storage's write gate until it ends.
pub struct WriteTransaction<'a> {
    txn: DatabaseTransaction,
    _gate: MutexGuard<'a, ()>,
}

impl WriteTransaction<'_> {
    pub fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commit on `Ok`, roll back on `Err`, then release the gate.
    ///
    /// The rollback is awaited here so the next writer never finds this
    /// transaction's lock still held.
    pub async fn finish<T>(self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.txn.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.txn.rollback().await {
                    warn!("Rollback failed: {}", rollback);
                }
                Err(err)
            }
        }
    }
}

impl Storage {
    /// Open the database described by `config` and make sure the schema exists.
    pub async fn new(config: &DatabaseConfig) -> anyhow::Result<Self> {
        if config.in_memory {
            return Self::in_memory().await;
        }

        let path = config.resolved_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(config.max_connections)
            .min_connections(1)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let conn = Database::connect(options).await?;
        let storage = Self {
            conn,
            _anchor: None,
            write_gate: Mutex::new(()),
        };
        storage.init_schema().await?;

        info!("Opened database at {}", path.display());
        Ok(storage)
    }

    /// A fresh, private in-memory database.
    ///
    /// Each call gets its own database name, so two storages in the same
    /// process never see each other's rows.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let url = format!("sqlite:file:campus_records_{}?mode=memory&cache=shared", Uuid::new_v4().simple());

        let anchor = SqliteConnection::connect(&url).await?;

        let mut options = ConnectOptions::new(url);
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let conn = Database::connect(options).await?;

        let storage = Self {
            conn,
            _anchor: Some(anchor),
            write_gate: Mutex::new(()),
        };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Wait for the write gate, then open a transaction.
    pub async fn begin_write(&self) -> Result<WriteTransaction<'_>> {
        let gate = self.write_gate.lock().await;
        let txn = self.conn.begin().await?;
        Ok(WriteTransaction { txn, _gate: gate })
    }

    /// Create tables in foreign-key order, then the enrollment pair index.
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        self.create_table(&schema, program::Entity).await?;
        self.create_table(&schema, course::Entity).await?;
        self.create_table(&schema, student::Entity).await?;
        self.create_table(&schema, enrollment::Entity).await?;

        let index = Index::create()
            .name(ENROLLMENT_PAIR_INDEX)
            .table(enrollment::Entity)
            .col(enrollment::Column::StudentUuid)
            .col(enrollment::Column::CourseUuid)
            .unique()
            .if_not_exists()
            .to_owned();
        self.conn.execute(backend.build(&index)).await?;

        debug!("{}", LOG_SCHEMA_READY);
        Ok(())
    }

    async fn create_table<E>(&self, schema: &Schema, entity: E) -> Result<()>
    where
        E: EntityTrait,
    {
        let backend = self.conn.get_database_backend();
        let mut statement = schema.create_table_from_entity(entity);
        statement.if_not_exists();
        self.conn.execute(backend.build(&statement)).await?;
        Ok(())
    }

    /// Check if the database has any programs
    pub async fn has_data(&self) -> Result<bool> {
        use sea_orm::PaginatorTrait;
        Ok(program::Entity::find().count(&self.conn).await? > 0)
    }

    /// Clear all data from the database, children first
    pub async fn clear_all_data(&self) -> Result<()> {
        let write = self.begin_write().await?;
        let result = async {
            let txn = write.txn();
            enrollment::Entity::delete_many().exec(txn).await?;
            course::Entity::delete_many().exec(txn).await?;
            student::Entity::delete_many().exec(txn).await?;
            program::Entity::delete_many().exec(txn).await?;
            Ok::<_, RecordsError>(())
        }
        .await;
        write.finish(result).await
    }
}
