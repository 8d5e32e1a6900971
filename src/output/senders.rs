use async_trait::async_trait;
use log::{debug, error};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::utils::error::GnssError;

#[async_trait]
pub trait DataSender: Send + Sync {
    async fn send(&self, data: &str) -> Result<(), GnssError>;
    /// Where the data ends up, for log lines.
    fn destination(&self) -> String;
}

pub struct ConsoleSender;

#[async_trait]
impl DataSender for ConsoleSender {
    async fn send(&self, data: &str) -> Result<(), GnssError> {
        println!("{}", data);
        Ok(())
    }

    fn destination(&self) -> String {
        "stdout".to_string()
    }
}

/// Appends one line per report, creating the file on first use.
pub struct FileSender {
    path: PathBuf,
}

impl FileSender {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DataSender for FileSender {
    async fn send(&self, data: &str) -> Result<(), GnssError> {
        debug!("📝 Appending {} bytes to {}", data.len(), self.path.display());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                error!("❌ Failed to open {}: {}", self.path.display(), e);
                GnssError::CommunicationError(format!("File open error: {}", e))
            })?;

        file.write_all(format!("{}\n", data).as_bytes())
            .await
            .map_err(|e| GnssError::CommunicationError(format!("File write error: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| GnssError::CommunicationError(format!("File write error: {}", e)))
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sender_appends() {
        let path = std::env::temp_dir().join(format!("panthyr_gnss_fixes_{}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let sender = FileSender::new(&path);
        sender.send("first").await.unwrap();
        sender.send("second").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");

        // A second sender on the same file keeps earlier reports
        FileSender::new(&path).send("third").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\nthird\n");
        assert_eq!(sender.destination(), path.display().to_string());

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_file_sender_reports_unwritable_path() {
        let path = std::env::temp_dir()
            .join(format!("panthyr_gnss_missing_{}", std::process::id()))
            .join("fixes.csv");
        let result = FileSender::new(&path).send("fix").await;
        assert!(matches!(result, Err(GnssError::CommunicationError(_))));
    }
}
