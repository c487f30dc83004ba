use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::RwLock,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::utils::clock::Clock;

use super::entities::{TimeEntryDocument, TimeEntryFields};

pub const COLLECTION_FILE: &str = "time_entries.jsonl";

/// Interface for abstracting the entry document collection.
#[async_trait]
pub trait EntryStorage: Send + Sync + 'static {
    /// Stores a new document built from `fields` and returns it as stored.
    async fn create(&self, fields: TimeEntryFields) -> Result<TimeEntryDocument>;

    /// Every stored document in insertion order.
    async fn find_all(&self) -> Result<Vec<TimeEntryDocument>>;
}

/// The main realization of [EntryStorage].
///
/// The file locks block the calling thread, so tasks of this process queue on `access` before
/// taking them.
pub struct FileEntryStorage {
    collection_path: PathBuf,
    clock: Box<dyn Clock>,
    access: RwLock<()>,
}

impl FileEntryStorage {
    pub fn new(data_dir: PathBuf, clock: Box<dyn Clock>) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            collection_path: data_dir.join(COLLECTION_FILE),
            clock,
            access: RwLock::new(()),
        })
    }

    pub fn collection_path(&self) -> &Path {
        &self.collection_path
    }

    async fn append_document(&self, document: &TimeEntryDocument) -> Result<()> {
        let mut line = serde_json::to_vec(document)?;
        line.push(b'\n');

        let _guard = self.access.write().await;
        let mut file = File::options()
            .append(true)
            .create(true)
            .open(&self.collection_path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = async {
            file.write_all(&line).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        Ok(result?)
    }

    async fn read_documents(&self) -> Result<Vec<TimeEntryDocument>, std::io::Error> {
        let path = &self.collection_path;
        debug!("Reading collection {path:?}");
        let _guard = self.access.read().await;
        let file = File::open(path).await?;
        file.lock_shared()?;
        let mut lines = BufReader::new(file).lines();
        let mut documents = vec![];
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TimeEntryDocument>(&line) {
                Ok(v) => documents.push(v),
                Err(e) => {
                    // A write cut off by a crash leaves a partial last line.
                    warn!("Skipping illegal document in {:?}: {} {e}", path, &line)
                }
            }
        }

        lines.into_inner().into_inner().unlock_async().await?;

        Ok(documents)
    }
}

#[async_trait]
impl EntryStorage for FileEntryStorage {
    async fn create(&self, fields: TimeEntryFields) -> Result<TimeEntryDocument> {
        let now = self.clock.time();
        let document = TimeEntryDocument {
            document_id: Uuid::new_v4().simple().to_string().into(),
            fields,
            created_at: now,
            updated_at: now,
        };

        self.append_document(&document).await?;
        debug!("Stored document {}", document.document_id);
        Ok(document)
    }

    async fn find_all(&self) -> Result<Vec<TimeEntryDocument>> {
        match self.read_documents().await {
            Ok(documents) => Ok(documents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e)?,
        }
    }
}
