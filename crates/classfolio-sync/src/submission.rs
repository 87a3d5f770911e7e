//! Batch download of a student's submissions.
//!
//! Attachments are grouped by assignment directory
//! (`root/<student>/<assignment>`). Within a directory each Drive file ID or link
//! URL is handled once per run; every remaining attachment becomes an
//! independent task. Tasks run concurrently, optionally bounded by a semaphore,
//! and finish in any order. A failing attachment is logged and reported without
//! affecting the others.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use log::{info, warn};
use tokio::sync::Semaphore;

use crate::attachment::{lock, AttachmentProcessor, AttachmentTarget};
use crate::config::PipelineConfig;
use crate::drive::DriveSource;
use crate::error::{SyncError, SyncResult};
use crate::model::{Attachment, DownloadedFileInfo, Student, Submission};
use crate::naming::DirectoryLedger;
use crate::sanitize::sanitize_segment;

/// What happened to one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentOutcome {
    /// Written (or overwritten) on disk.
    Written(DownloadedFileInfo),
    /// Same file or link already handled in this run for the directory.
    Skipped,
    /// Processing failed; the message is already logged.
    Failed(String),
}

/// Per-attachment result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentReport {
    pub directory: PathBuf,
    /// Drive file ID or link URL.
    pub key: String,
    pub outcome: AttachmentOutcome,
}

/// Results of one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub attachments: Vec<AttachmentReport>,
}

impl SyncReport {
    /// At least one attachment was written.
    pub fn changed(&self) -> bool {
        self.written().next().is_some()
    }

    pub fn written(&self) -> impl Iterator<Item = &DownloadedFileInfo> {
        self.attachments.iter().filter_map(|r| match &r.outcome {
            AttachmentOutcome::Written(info) => Some(info),
            _ => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, AttachmentOutcome::Failed(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, AttachmentOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&AttachmentOutcome) -> bool) -> usize {
        self.attachments.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Downloads submission attachments into a per-student directory tree.
///
/// The concurrency bound comes from [`PipelineConfig::max_concurrency`]. Share
/// one processor across students to apply a global bound; give each student its
/// own unbounded processor for full parallelism.
#[derive(Clone)]
pub struct SubmissionProcessor {
    attachments: AttachmentProcessor,
    slots: Option<Arc<Semaphore>>,
    config: PipelineConfig,
}

struct DirectoryBatch<'a> {
    assignment: String,
    attachments: Vec<&'a Attachment>,
}

impl SubmissionProcessor {
    pub fn new(source: Arc<dyn DriveSource>, config: PipelineConfig) -> Self {
        let slots = config
            .max_concurrency
            .map(|n| Arc::new(Semaphore::new(n.max(1))));
        Self {
            attachments: AttachmentProcessor::new(source),
            slots,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Directory for a student's assignment under `root`.
    pub fn assignment_dir(root: &Path, student: &Student, assignment: &str) -> PathBuf {
        root.join(sanitize_segment(&student.name))
            .join(sanitize_segment(assignment))
    }

    /// Download every attachment; `true` if any attachment was written.
    pub async fn process_submissions(
        &self,
        submissions: &[Submission],
        student: &Student,
        course_work: &HashMap<String, String>,
        root: &Path,
    ) -> bool {
        self.sync_submissions(submissions, student, course_work, root)
            .await
            .changed()
    }

    /// Download every attachment and report each outcome.
    ///
    /// `course_work` maps course-work IDs to assignment titles; submissions for
    /// unknown course work are filed under their ID.
    pub async fn sync_submissions(
        &self,
        submissions: &[Submission],
        student: &Student,
        course_work: &HashMap<String, String>,
        root: &Path,
    ) -> SyncReport {
        let mut batches: BTreeMap<PathBuf, DirectoryBatch<'_>> = BTreeMap::new();
        for submission in submissions {
            let assignment = course_work
                .get(&submission.course_work_id)
                .cloned()
                .unwrap_or_else(|| submission.course_work_id.clone());
            let dir = Self::assignment_dir(root, student, &assignment);
            batches
                .entry(dir)
                .or_insert_with(|| DirectoryBatch {
                    assignment,
                    attachments: Vec::new(),
                })
                .attachments
                .extend(submission.attachments.iter());
        }

        let mut reports = Vec::new();
        let mut tasks = Vec::new();
        let mut ledgers = Vec::new();

        for (dir, batch) in &batches {
            let ledger =
                Arc::new(Mutex::new(DirectoryLedger::load(dir, &self.config.manifest_file_name).await));
            ledgers.push((dir.clone(), Arc::clone(&ledger)));

            let mut seen = HashSet::new();
            for attachment in &batch.attachments {
                if !seen.insert(attachment.key()) {
                    reports.push(AttachmentReport {
                        directory: dir.clone(),
                        key: attachment.key().to_string(),
                        outcome: AttachmentOutcome::Skipped,
                    });
                    continue;
                }
                tasks.push(self.run_one(
                    attachment,
                    dir,
                    &batch.assignment,
                    student,
                    Arc::clone(&ledger),
                ));
            }
        }

        reports.extend(join_all(tasks).await);

        for (dir, ledger) in ledgers {
            let snapshot = lock(&ledger).clone();
            if snapshot.is_empty() {
                continue;
            }
            if let Err(e) = snapshot.save(&dir, &self.config.manifest_file_name).await {
                warn!("failed to write manifest in {}: {}", dir.display(), e);
            }
        }

        let report = SyncReport {
            attachments: reports,
        };
        info!(
            "synced {} for {}: {} written, {} skipped, {} failed",
            root.display(),
            student.name,
            report.written().count(),
            report.skipped_count(),
            report.failed_count()
        );
        report
    }

    async fn run_one(
        &self,
        attachment: &Attachment,
        dir: &Path,
        assignment: &str,
        student: &Student,
        ledger: Arc<Mutex<DirectoryLedger>>,
    ) -> AttachmentReport {
        let target = AttachmentTarget {
            dir,
            student: &student.name,
            assignment,
        };
        let outcome = match self.bounded(attachment, &target, &ledger).await {
            Ok(info) => AttachmentOutcome::Written(info),
            Err(e) => {
                warn!(
                    "attachment {} for {} / {} failed: {}",
                    attachment.key(),
                    student.name,
                    assignment,
                    e
                );
                AttachmentOutcome::Failed(e.to_string())
            }
        };
        AttachmentReport {
            directory: dir.to_path_buf(),
            key: attachment.key().to_string(),
            outcome,
        }
    }

    async fn bounded(
        &self,
        attachment: &Attachment,
        target: &AttachmentTarget<'_>,
        ledger: &Mutex<DirectoryLedger>,
    ) -> SyncResult<DownloadedFileInfo> {
        let _permit = match &self.slots {
            Some(slots) => Some(slots.acquire().await.map_err(|_| SyncError::Cancelled)?),
            None => None,
        };
        self.attachments.process(attachment, target, ledger).await
    }
}
