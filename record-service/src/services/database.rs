use crate::config::MongoConfig;
use crate::models::{record, Record};
use crate::services::RecordStore;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, Credential, ServerAddress},
    Client as MongoClient, Collection, Database,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;

const APP_NAME: &str = "record-service";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoDb {
    /// Builds the client and pings the server. An unreachable store is an
    /// error here so the process never starts without one.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        let options = client_options(config).await?;
        tracing::info!(
            hosts = ?options.hosts,
            database = %config.database,
            collection = %config.collection,
            "Connecting to MongoDB"
        );

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(&config.database);

        let mongo = Self {
            client,
            db,
            collection: config.collection.clone(),
        };
        mongo.health_check().await?;

        tracing::info!(database = %config.database, "Successfully connected to MongoDB database");
        Ok(mongo)
    }

    pub fn records(&self) -> Collection<Document> {
        self.db.collection(&self.collection)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

#[async_trait]
impl RecordStore for MongoDb {
    async fn insert(&self, record: Record) -> Result<String, AppError> {
        let document = record::to_document(&record)?;

        let result = self
            .records()
            .insert_one(document, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %self.collection, "Failed to insert record: {}", e);
                AppError::from(e)
            })?;

        Ok(record::id_to_string(&result.inserted_id))
    }

    async fn list(&self) -> Result<Vec<Record>, AppError> {
        let cursor = self.records().find(None, None).await.map_err(|e| {
            tracing::error!(collection = %self.collection, "Failed to query records: {}", e);
            AppError::from(e)
        })?;

        let documents: Vec<Document> = cursor.try_collect().await.map_err(AppError::from)?;
        Ok(documents.into_iter().map(record::from_document).collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.db
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}

async fn client_options(config: &MongoConfig) -> Result<ClientOptions, AppError> {
    let mut options = match &config.uri {
        Some(uri) => ClientOptions::parse(uri.expose_secret()).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::from(e)
        })?,
        None => ClientOptions::builder()
            .hosts(vec![ServerAddress::Tcp {
                host: config.host.clone(),
                port: Some(config.port),
            }])
            .credential(credential(config))
            .build(),
    };

    if options.app_name.is_none() {
        options.app_name = Some(APP_NAME.to_string());
    }
    options.server_selection_timeout = Some(config.server_selection_timeout);

    Ok(options)
}

/// Credentials are only sent when a username is configured.
fn credential(config: &MongoConfig) -> Option<Credential> {
    let username = config.username.clone()?;
    Some(
        Credential::builder()
            .username(username)
            .password(config.password.as_ref().map(|p| p.expose_secret().clone()))
            .source(config.auth_source.clone())
            .build(),
    )
}
