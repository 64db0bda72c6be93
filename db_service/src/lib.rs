mod encryption;

use std::fmt::{Display, Formatter};

use anyhow::Context;
use async_trait::async_trait;
use libsql::params::IntoParams;

pub use crate::encryption::{EncryptError, Encryptor};
use shared_lib::structs::Credentials;

/// Where the relay reads its Brevo credentials from. Handlers only see this
/// trait so tests can swap in their own store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Missing or unreadable values come back as empty strings
    async fn get_credentials(&self) -> Credentials;

    async fn set_credentials(&self, credentials: &Credentials) -> anyhow::Result<()>;
}

pub enum SettingKey {
    ApiKey,
    ListId,
}

impl Display for SettingKey {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            SettingKey::ApiKey => write!(f, "brevo_api_key"),
            SettingKey::ListId => write!(f, "brevo_list_id"),
        }
    }
}

pub struct DbService {
    db: libsql::Database,
    encryptor: Encryptor,
}

impl DbService {
    pub async fn open(path: &str, encryption_key: &str) -> anyhow::Result<DbService> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .with_context(|| format!("Failed to open database at {path}"))?;

        tracing::debug!("Initialized db at {}", path);

        Ok(DbService {
            db,
            encryptor: Encryptor::new(encryption_key),
        })
    }

    pub async fn init_tables(&self) -> anyhow::Result<()> {
        let conn = self.db.connect().context("Failed to connect to db")?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (key TEXT PRIMARY KEY, value BLOB NOT NULL)",
            libsql::params!(),
        )
        .await
        .context("Failed to create settings table")?;
        Ok(())
    }

    // execute the statement on the given connection and return the number of rows affected
    pub async fn execute(
        conn: &libsql::Connection,
        statement: &str,
        params: impl IntoParams,
        key: SettingKey,
    ) -> anyhow::Result<u64> {
        let result = conn.execute(statement, params).await?;

        if result == 0 {
            tracing::error!(
                "Failed to write to db, expected 1 row affected but got {}",
                result
            );
            return Err(anyhow::anyhow!(
                "Failed to write to db, expected 1 row affected but got {}",
                result
            ));
        }

        tracing::trace!("{} upserted to db", key);

        Ok(result)
    }

    async fn get_setting(&self, key: SettingKey) -> anyhow::Result<Option<Vec<u8>>> {
        let connection = self.db.connect().context("Failed to connect to db")?;
        let mut rows = connection
            .query(
                "SELECT value FROM settings WHERE key = ?1",
                libsql::params!(key.to_string()),
            )
            .await
            .context("Failed to get data from database")?;

        match rows.next().await.context("Failed to get data from database")? {
            Some(row) => Ok(Some(row.get::<Vec<u8>>(0)?)),
            None => Ok(None),
        }
    }

    async fn set_setting(
        conn: &libsql::Connection,
        key: SettingKey,
        value: Vec<u8>,
    ) -> anyhow::Result<()> {
        Self::execute(
            conn,
            "INSERT INTO settings (key, value) VALUES (?1, ?2) \
            ON CONFLICT (key) \
            DO UPDATE SET value = excluded.value",
            libsql::params!(key.to_string(), value),
            key,
        )
        .await?;
        Ok(())
    }

    async fn get_api_key(&self) -> anyhow::Result<String> {
        match self.get_setting(SettingKey::ApiKey).await? {
            Some(sealed) => Ok(self.encryptor.decrypt(&sealed)?),
            None => Ok(String::new()),
        }
    }

    async fn get_list_id(&self) -> anyhow::Result<String> {
        match self.get_setting(SettingKey::ListId).await? {
            Some(value) => Ok(String::from_utf8(value)?),
            None => Ok(String::new()),
        }
    }
}

#[async_trait]
impl SettingsStore for DbService {
    async fn get_credentials(&self) -> Credentials {
        let api_key = self.get_api_key().await.unwrap_or_else(|e| {
            tracing::error!("Failed to read Brevo api key from db: {:?}", e);
            String::new()
        });
        let list_id = self.get_list_id().await.unwrap_or_else(|e| {
            tracing::error!("Failed to read Brevo list id from db: {:?}", e);
            String::new()
        });

        Credentials { api_key, list_id }
    }

    async fn set_credentials(&self, credentials: &Credentials) -> anyhow::Result<()> {
        let api_key = self
            .encryptor
            .encrypt(&credentials.api_key)
            .context("Failed to encrypt api key")?;

        tracing::debug!("Updating Brevo settings in the DB");

        // both values or neither
        let conn = self.db.connect().context("Failed to connect to db")?;
        let tx = conn
            .transaction()
            .await
            .context("Failed to start settings transaction")?;

        let written = async {
            Self::set_setting(&tx, SettingKey::ApiKey, api_key).await?;
            Self::set_setting(&tx, SettingKey::ListId, credentials.list_id.clone().into_bytes())
                .await
        }
        .await;

        if let Err(e) = written {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Failed to roll back settings transaction: {:?}", rollback_err);
            }
            return Err(e);
        }

        tx.commit()
            .await
            .context("Failed to commit settings transaction")?;
        Ok(())
    }
}
