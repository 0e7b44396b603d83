use async_trait::async_trait;
use libsql::{named_params, params::IntoParams, Builder, Database as LibsqlDatabase, Value};

use crate::{
    records::{LookupError, SurveyRecords},
    store::{ConfigStore, StoreError},
};

#[derive(thiserror::Error, Debug)]
#[error("Error creating database: {0}")]
pub struct CreateError(#[from] libsql::Error);

#[derive(thiserror::Error, Debug)]
pub enum InitializationError {
    #[error("Error creating databse: {0}")]
    CreateError(#[from] CreateError),
    #[error("Error connecting to database: {0}")]
    ConnectionError(libsql::Error),
    #[error("Error executing create tables batch query: {0}")]
    CreateTablesError(libsql::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum StatementError {
    #[error("Error connecting to database: {0}")]
    ConnectionError(libsql::Error),
    #[error("Error preparing statement: {0}")]
    PrepareError(libsql::Error),
    #[error("Error exectuing statement: {0}")]
    ExecuteError(libsql::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum SingleRowQueryError {
    #[error("Error running statement: {0}")]
    StatementError(#[from] StatementError),
    #[error("Error reading value from row: {0}")]
    RowError(libsql::Error),
    #[error("Expected a text value but got {0:?}")]
    UnexpectedValue(Value),
}

/// Remote databases are reached over HTTP, everything else is a local file
fn is_remote(database_url: &str) -> bool {
    ["libsql://", "http://", "https://"]
        .iter()
        .any(|scheme| database_url.starts_with(scheme))
}

/// A wrapper around the libsql database to hide the database and provide access to predefined queries
pub struct Database(LibsqlDatabase);

impl Database {
    async fn create(database_url: String, auth_token: String) -> Result<Database, CreateError> {
        let database = if is_remote(&database_url) {
            Builder::new_remote(database_url, auth_token).build().await?
        } else {
            Builder::new_local(database_url).build().await?
        };

        Ok(Self(database))
    }

    /// Creates the database and initializes it with the tables
    pub async fn initialize(
        database_url: String,
        auth_token: String,
    ) -> Result<Database, InitializationError> {
        let database = Self::create(database_url, auth_token).await?;

        let connection = database
            .0
            .connect()
            .map_err(InitializationError::ConnectionError)?;

        let query = include_str!("./create_tables.sql");
        connection
            .execute_batch(query)
            .await
            .map_err(InitializationError::CreateTablesError)?;

        tracing::debug!("Tables created");

        Ok(database)
    }

    fn connect(&self) -> Result<libsql::Connection, StatementError> {
        self.0.connect().map_err(StatementError::ConnectionError)
    }

    async fn execute(
        &self,
        sql: &'static str,
        parameters: impl IntoParams,
    ) -> Result<(), StatementError> {
        let connection = self.connect()?;

        let mut statement = connection
            .prepare(sql)
            .await
            .map_err(StatementError::PrepareError)?;

        statement
            .execute(parameters)
            .await
            .map_err(StatementError::ExecuteError)?;

        Ok(())
    }

    /// Reads the first column of the first row. `None` if there is no row or the value is NULL.
    async fn query_text(
        &self,
        sql: &'static str,
        parameters: impl IntoParams,
    ) -> Result<Option<String>, SingleRowQueryError> {
        let connection = self.connect()?;
        let mut statement = connection
            .prepare(sql)
            .await
            .map_err(StatementError::PrepareError)?;

        let row = match statement.query_row(parameters).await {
            Ok(row) => row,
            Err(libsql::Error::QueryReturnedNoRows) => return Ok(None),
            Err(error) => return Err(SingleRowQueryError::RowError(error)),
        };

        match row.get_value(0).map_err(SingleRowQueryError::RowError)? {
            Value::Null => Ok(None),
            Value::Text(text) => Ok(Some(text)),
            // Hosts may keep participant ids as integers
            Value::Integer(number) => Ok(Some(number.to_string())),
            other => Err(SingleRowQueryError::UnexpectedValue(other)),
        }
    }
}

#[async_trait]
impl ConfigStore for Database {
    async fn survey_setting(
        &self,
        survey_id: &str,
        name: &str,
    ) -> Result<Option<String>, StoreError> {
        self.query_text(
            "SELECT value FROM survey_settings WHERE survey_id = :survey_id AND name = :name",
            named_params! {
                ":survey_id": survey_id,
                ":name": name,
            },
        )
        .await
        .map_err(StoreError::new)
    }

    async fn global_setting(&self, name: &str) -> Result<Option<String>, StoreError> {
        self.query_text(
            "SELECT value FROM global_settings WHERE name = :name",
            named_params![":name": name],
        )
        .await
        .map_err(StoreError::new)
    }

    async fn set_survey_setting(
        &self,
        survey_id: &str,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        self.execute(
            "INSERT INTO survey_settings (survey_id, name, value) VALUES (:survey_id, :name, :value)
            ON CONFLICT (survey_id, name) DO UPDATE SET value = excluded.value",
            named_params! {
                ":survey_id": survey_id,
                ":name": name,
                ":value": value,
            },
        )
        .await
        .map_err(StoreError::new)
    }

    async fn set_global_setting(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.execute(
            "INSERT INTO global_settings (name, value) VALUES (:name, :value)
            ON CONFLICT (name) DO UPDATE SET value = excluded.value",
            named_params! {
                ":name": name,
                ":value": value,
            },
        )
        .await
        .map_err(StoreError::new)
    }
}

#[async_trait]
impl SurveyRecords for Database {
    async fn response_token(
        &self,
        survey_id: &str,
        response_id: &str,
    ) -> Result<Option<String>, LookupError> {
        self.query_text(
            "SELECT token FROM survey_responses WHERE survey_id = :survey_id AND id = :id",
            named_params! {
                ":survey_id": survey_id,
                ":id": response_id,
            },
        )
        .await
        // An empty token is an anonymous response
        .map(|token| token.filter(|token| !token.is_empty()))
        .map_err(LookupError::new)
    }

    async fn participant_id(
        &self,
        survey_id: &str,
        token: &str,
    ) -> Result<Option<String>, LookupError> {
        self.query_text(
            "SELECT participant_id FROM survey_participants WHERE survey_id = :survey_id AND token = :token",
            named_params! {
                ":survey_id": survey_id,
                ":token": token,
            },
        )
        .await
        .map_err(LookupError::new)
    }
}
