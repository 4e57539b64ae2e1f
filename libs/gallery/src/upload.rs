//! Staging area for files selected for upload

use tracing::debug;

use crate::{config::UploadLimits, error::UploadError};

/// A selected file, held in memory until it is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Queued,
    Uploading,
    Failed,
}

/// A staged file with its optional caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub file: UploadFile,
    pub caption: Option<String>,
    pub status: UploadStatus,
}

/// Files and captions sent in one upload request, paired by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    pub files: Vec<UploadFile>,
    pub captions: Vec<Option<String>>,
}

impl UploadBatch {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Local queue of uploads waiting to be committed
#[derive(Debug, Clone, Default)]
pub struct UploadQueue {
    entries: Vec<PendingUpload>,
    limits: UploadLimits,
}

impl UploadQueue {
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            entries: Vec::new(),
            limits,
        }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn entries(&self) -> &[PendingUpload] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a batch has been handed out and not yet resolved
    pub fn is_uploading(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.status == UploadStatus::Uploading)
    }

    /// Validate and stage a file; returns its index in the queue
    pub fn stage(&mut self, file: UploadFile, caption: Option<String>) -> Result<usize, UploadError> {
        if self.entries.len() >= self.limits.max_files {
            return Err(UploadError::TooManyFiles {
                limit: self.limits.max_files,
            });
        }

        if !self.limits.accepts(&file.content_type) {
            return Err(UploadError::UnsupportedType {
                content_type: file.content_type,
            });
        }

        if file.is_empty() {
            return Err(UploadError::EmptyFile {
                file_name: file.file_name,
            });
        }

        if file.len() > self.limits.max_file_bytes {
            return Err(UploadError::FileTooLarge {
                size: file.len(),
                limit: self.limits.max_file_bytes,
                file_name: file.file_name,
            });
        }

        debug!("Staged {} ({} bytes) for upload", file.file_name, file.len());

        self.entries.push(PendingUpload {
            file,
            caption: normalize_caption(caption),
            status: UploadStatus::Queued,
        });

        Ok(self.entries.len() - 1)
    }

    pub fn set_caption(&mut self, index: usize, caption: Option<String>) -> Result<(), UploadError> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(UploadError::NoSuchEntry(index))?;
        entry.caption = normalize_caption(caption);
        Ok(())
    }

    /// Drop a staged entry; entries that are being uploaded cannot be removed
    pub fn remove(&mut self, index: usize) -> Result<PendingUpload, UploadError> {
        match self.entries.get(index) {
            None => Err(UploadError::NoSuchEntry(index)),
            Some(entry) if entry.status == UploadStatus::Uploading => {
                Err(UploadError::UploadInProgress)
            }
            Some(_) => Ok(self.entries.remove(index)),
        }
    }

    /// Drop every entry that is not currently being uploaded
    pub fn clear(&mut self) {
        self.entries
            .retain(|entry| entry.status == UploadStatus::Uploading);
    }

    /// Mark all queued entries as uploading and hand them out as one batch
    pub fn begin_upload(&mut self) -> Result<UploadBatch, UploadError> {
        if self.is_uploading() {
            return Err(UploadError::UploadInProgress);
        }

        let mut batch = UploadBatch {
            files: Vec::new(),
            captions: Vec::new(),
        };

        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| entry.status == UploadStatus::Queued)
        {
            entry.status = UploadStatus::Uploading;
            batch.files.push(entry.file.clone());
            batch.captions.push(entry.caption.clone());
        }

        if batch.is_empty() {
            return Err(UploadError::EmptyBatch);
        }

        Ok(batch)
    }

    /// The store accepted the batch: the entries are discarded
    pub fn complete_upload(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.status != UploadStatus::Uploading);
        before - self.entries.len()
    }

    /// The batch failed: keep the entries so they can be retried
    pub fn fail_upload(&mut self) {
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| entry.status == UploadStatus::Uploading)
        {
            entry.status = UploadStatus::Failed;
        }
    }

    /// Queue failed entries again
    pub fn retry_failed(&mut self) -> usize {
        let mut count = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| entry.status == UploadStatus::Failed)
        {
            entry.status = UploadStatus::Queued;
            count += 1;
        }
        count
    }
}

fn normalize_caption(caption: Option<String>) -> Option<String> {
    caption
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn jpeg(name: &str) -> UploadFile {
        UploadFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    fn limits(max_files: usize, max_file_bytes: usize) -> UploadLimits {
        UploadLimits {
            max_files,
            max_file_bytes,
            ..UploadLimits::default()
        }
    }

    #[test]
    fn test_stage_validates_files() {
        let mut queue = UploadQueue::new(limits(2, 8));

        assert_eq!(
            queue.stage(UploadFile::new("notes.pdf", "application/pdf", vec![1]), None),
            Err(UploadError::UnsupportedType {
                content_type: "application/pdf".to_string()
            })
        );
        assert_eq!(
            queue.stage(UploadFile::new("empty.png", "image/png", Vec::new()), None),
            Err(UploadError::EmptyFile {
                file_name: "empty.png".to_string()
            })
        );
        assert!(matches!(
            queue.stage(UploadFile::new("big.png", "image/png", vec![0; 9]), None),
            Err(UploadError::FileTooLarge { size: 9, limit: 8, .. })
        ));

        assert_eq!(assert_ok!(queue.stage(jpeg("a.jpg"), None)), 0);
        assert_eq!(assert_ok!(queue.stage(jpeg("b.jpg"), None)), 1);
        assert_eq!(
            queue.stage(jpeg("c.jpg"), None),
            Err(UploadError::TooManyFiles { limit: 2 })
        );
    }

    #[test]
    fn test_captions_are_trimmed_and_blank_dropped() {
        let mut queue = UploadQueue::default();
        queue.stage(jpeg("a.jpg"), Some("  Lobby ".to_string())).unwrap();
        queue.stage(jpeg("b.jpg"), Some("   ".to_string())).unwrap();

        assert_eq!(queue.entries()[0].caption.as_deref(), Some("Lobby"));
        assert_eq!(queue.entries()[1].caption, None);

        queue.set_caption(1, Some("Kitchen".to_string())).unwrap();
        assert_eq!(queue.entries()[1].caption.as_deref(), Some("Kitchen"));
        assert_err!(queue.set_caption(5, None));
    }

    #[test]
    fn test_begin_upload_pairs_captions_by_position() {
        let mut queue = UploadQueue::default();
        queue.stage(jpeg("f1.jpg"), Some("c1".to_string())).unwrap();
        queue.stage(jpeg("f2.jpg"), None).unwrap();
        queue.stage(jpeg("f3.jpg"), Some("c3".to_string())).unwrap();

        let batch = queue.begin_upload().unwrap();
        let names: Vec<_> = batch.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["f1.jpg", "f2.jpg", "f3.jpg"]);
        assert_eq!(
            batch.captions,
            vec![Some("c1".to_string()), None, Some("c3".to_string())]
        );
        assert!(queue.is_uploading());
        assert_eq!(queue.begin_upload(), Err(UploadError::UploadInProgress));
    }

    #[test]
    fn test_empty_queue_has_no_batch() {
        let mut queue = UploadQueue::default();
        assert_eq!(queue.begin_upload(), Err(UploadError::EmptyBatch));
    }

    #[test]
    fn test_complete_discards_uploaded_entries_only() {
        let mut queue = UploadQueue::default();
        queue.stage(jpeg("a.jpg"), None).unwrap();
        queue.begin_upload().unwrap();
        queue.stage(jpeg("late.jpg"), None).unwrap();

        assert_eq!(queue.complete_upload(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.entries()[0].file.file_name, "late.jpg");
        assert_eq!(queue.entries()[0].status, UploadStatus::Queued);
    }

    #[test]
    fn test_failed_upload_can_be_retried() {
        let mut queue = UploadQueue::default();
        queue.stage(jpeg("a.jpg"), None).unwrap();
        queue.stage(jpeg("b.jpg"), None).unwrap();
        queue.begin_upload().unwrap();
        queue.fail_upload();

        assert!(queue
            .entries()
            .iter()
            .all(|entry| entry.status == UploadStatus::Failed));
        assert_eq!(queue.begin_upload(), Err(UploadError::EmptyBatch));

        assert_eq!(queue.retry_failed(), 2);
        assert_eq!(queue.begin_upload().unwrap().len(), 2);
    }

    #[test]
    fn test_remove_and_clear_keep_in_flight_entries() {
        let mut queue = UploadQueue::default();
        queue.stage(jpeg("a.jpg"), None).unwrap();
        queue.begin_upload().unwrap();
        queue.stage(jpeg("b.jpg"), None).unwrap();

        assert_eq!(queue.remove(0), Err(UploadError::UploadInProgress));
        assert_eq!(queue.remove(1).unwrap().file.file_name, "b.jpg");
        assert_eq!(queue.remove(4), Err(UploadError::NoSuchEntry(4)));

        queue.stage(jpeg("c.jpg"), None).unwrap();
        queue.clear();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.entries()[0].status, UploadStatus::Uploading);
    }
}
