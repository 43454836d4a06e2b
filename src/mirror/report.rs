//! Per-run outcome reporting.

use std::fmt;

use crate::images::DownloadTally;
use crate::resource::ResourceKind;

/// What happened to one resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindStatus {
    /// Fetched and saved (for per-identifier kinds, at least partly).
    Mirrored,
    /// Already on disk; not fetched.
    Skipped,
    /// Aborted by a fetch or file error; other kinds carried on.
    Failed(String),
    /// No registry entry; logged and ignored.
    Unsupported,
}

impl fmt::Display for KindStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mirrored => f.write_str("mirrored"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Unsupported => f.write_str("unsupported"),
        }
    }
}

/// Outcome of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: ResourceKind,
    pub status: KindStatus,
    /// Records fetched in this run, or reloaded from disk when skipped.
    pub items: usize,
    /// Image counts, when image downloading ran for this kind.
    pub images: Option<DownloadTally>,
}

impl KindReport {
    #[must_use]
    pub fn new(kind: ResourceKind, status: KindStatus, items: usize) -> Self {
        Self {
            kind,
            status,
            items,
            images: None,
        }
    }

    #[must_use]
    pub fn failed(kind: ResourceKind, reason: impl fmt::Display) -> Self {
        Self::new(kind, KindStatus::Failed(reason.to_string()), 0)
    }

    #[must_use]
    pub fn unsupported(kind: ResourceKind) -> Self {
        Self::new(kind, KindStatus::Unsupported, 0)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, KindStatus::Failed(_))
    }
}

/// Outcome of a whole run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub kinds: Vec<KindReport>,
}

impl MirrorReport {
    /// Returns true when no kind failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.kinds.iter().filter(|k| k.is_failed()).count()
    }

    #[must_use]
    pub fn mirrored_count(&self) -> usize {
        self.count_status(&KindStatus::Mirrored)
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count_status(&KindStatus::Skipped)
    }

    /// Kinds that failed, in processing order.
    pub fn failed_kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.kinds.iter().filter(|k| k.is_failed()).map(|k| k.kind)
    }

    /// Sums the image tallies of every kind.
    #[must_use]
    pub fn image_totals(&self) -> DownloadTally {
        self.kinds
            .iter()
            .filter_map(|k| k.images)
            .fold(DownloadTally::default(), |mut total, tally| {
                total.downloaded += tally.downloaded;
                total.skipped += tally.skipped;
                total.errored += tally.errored;
                total.unsupported += tally.unsupported;
                total
            })
    }

    /// Looks up the report for `kind`.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    fn count_status(&self, status: &KindStatus) -> usize {
        self.kinds.iter().filter(|k| &k.status == status).count()
    }
}
