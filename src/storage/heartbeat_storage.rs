use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use crate::utils::time::date_to_record_name;

use super::entities::HeartbeatEntity;

/// Interface for abstracting storage of heartbeats.
pub trait HeartbeatStorage {
    /// Appends heartbeats into the record file of a UTC day.
    fn append(
        &self,
        date: NaiveDate,
        heartbeats: Vec<HeartbeatEntity>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Retrieves heartbeats stored for a UTC day.
    fn get_data_for(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<HeartbeatEntity>>> + Send;
}

impl<T: Deref> HeartbeatStorage for T
where
    T::Target: HeartbeatStorage,
{
    fn append(
        &self,
        date: NaiveDate,
        heartbeats: Vec<HeartbeatEntity>,
    ) -> impl Future<Output = Result<()>> + Send {
        self.deref().append(date, heartbeats)
    }

    fn get_data_for(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<HeartbeatEntity>>> + Send {
        self.deref().get_data_for(date)
    }
}

/// Stores heartbeats as json lines, one file per UTC day.
pub struct HeartbeatStorageImpl {
    record_dir: PathBuf,
}

impl HeartbeatStorageImpl {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self { record_dir })
    }

    fn record_path(&self, date: NaiveDate) -> PathBuf {
        self.record_dir.join(date_to_record_name(date))
    }

    async fn get_all_inner(path: &Path) -> Result<Vec<HeartbeatEntity>> {
        async fn extract(path: &Path) -> std::result::Result<Vec<HeartbeatEntity>, std::io::Error> {
            debug!("Extracting {path:?}");
            let file = File::open(path).await?;
            file.lock_shared()?;
            // Split on raw bytes. A line torn inside a multibyte character isn't valid UTF-8.
            let lock_handle = file.try_clone().await?;
            let mut lines = BufReader::new(file).split(b'\n');
            let mut heartbeats = vec![];
            while let Some(v) = lines.next_segment().await? {
                match serde_json::from_slice::<HeartbeatEntity>(&v) {
                    Ok(v) => heartbeats.push(v),
                    Err(e) => {
                        // A write cut off by a shutdown leaves a partial line behind.
                        warn!(
                            "During parsing in path {:?} found illegal json string {}:  {e}",
                            path,
                            String::from_utf8_lossy(&v)
                        )
                    }
                }
            }

            lock_handle.unlock_async().await?;

            Ok(heartbeats)
        }

        match extract(path).await {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e.into()),
        }
    }

    async fn append_with_file(file: &mut File, heartbeats: Vec<HeartbeatEntity>) -> Result<()> {
        let mut buffer = Vec::<u8>::new();
        for heartbeat in heartbeats {
            serde_json::to_writer(&mut buffer, &heartbeat)?;
            buffer.push(b'\n');
        }

        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

impl HeartbeatStorage for HeartbeatStorageImpl {
    async fn append(&self, date: NaiveDate, heartbeats: Vec<HeartbeatEntity>) -> Result<()> {
        let mut file = File::options()
            .append(true)
            .create(true)
            .open(self.record_path(date))
            .await?;

        file.lock_exclusive()?;
        let result = Self::append_with_file(&mut file, heartbeats).await;
        file.unlock_async().await?;
        result
    }

    async fn get_data_for(&self, date: NaiveDate) -> Result<Vec<HeartbeatEntity>> {
        Self::get_all_inner(&self.record_path(date)).await
    }
}
