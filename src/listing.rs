//! Assembles the rows of a listing page.
//!
//! Enumerate, order, resolve labels, then fetch annotations and sign a
//! link for each build. Rows keep the sorted order whatever the
//! collaborators do.

use chrono::{DateTime, Utc};

use crate::build::{order_builds, Build};
use crate::config::{Config, ViewMode};
use crate::context::ServiceContext;
use crate::error::BuildListError;
use crate::ports::annotations::{get_ignore_case, Annotations};
use crate::sprint::{self, duplicate_labels, label_from_annotation, LabelAssignment, SprintLabel};

/// One row of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// The listed build.
    pub build: Build,
    /// Identity without its path prefix.
    pub name: String,
    /// Sprint number (QA) or short revision (developer).
    pub label: SprintLabel,
    /// Position-derived index, QA view only.
    pub raw_index: Option<i64>,
    /// Most recent build.
    pub is_latest: bool,
    /// Expiring download link.
    pub link: String,
    /// Metadata attached to the build.
    pub annotations: Annotations,
}

/// A fully assembled page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Audience the listing was built for.
    pub mode: ViewMode,
    /// Rows, newest first.
    pub entries: Vec<ListingEntry>,
    /// When the listing was assembled.
    pub generated_at: DateTime<Utc>,
}

impl Listing {
    /// Returns `true` when no builds were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the listing for one invocation.
///
/// Annotation failures degrade to "no annotations" for that build only.
///
/// # Errors
///
/// Returns an error if enumeration or link signing fails, or if the
/// configured sprint offset overflows for this many builds.
pub async fn assemble(ctx: &ServiceContext, config: &Config) -> Result<Listing, BuildListError> {
    let generated_at = ctx.clock.now();
    let ordered = order_builds(ctx.store.list_builds().await?);
    let assignments = sprint::resolve(&ordered, &config.label_scheme())?;
    tracing::info!(count = ordered.len(), mode = ?config.mode, "resolved build labels");

    let mut entries = Vec::with_capacity(ordered.len());
    for (build, assignment) in ordered.into_vec().into_iter().zip(assignments) {
        let annotations = ctx
            .annotations
            .fetch_annotations(&build.identity, build.revision.as_deref())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(identity = %build.identity, error = %e, "ignoring unreadable annotations");
                Annotations::new()
            });

        let LabelAssignment { raw_index, label, is_latest } = assignment;
        let label = match config.mode {
            ViewMode::Qa => annotated_label(&annotations).unwrap_or(label),
            ViewMode::Dev => label,
        };

        let link = ctx.signer.sign(&build.identity, build.revision.as_deref(), config.link_ttl)?;
        entries.push(ListingEntry {
            name: build.display_name().to_string(),
            build,
            label,
            raw_index,
            is_latest,
            link,
            annotations,
        });
    }

    if config.mode == ViewMode::Qa {
        for duplicate in duplicate_labels(entries.iter().map(|e| &e.label)) {
            tracing::warn!(label = %duplicate, "sprint label assigned to more than one build");
        }
    }

    Ok(Listing { mode: config.mode, entries, generated_at })
}

/// Label from a build's own `sprint` annotation, when it has one.
fn annotated_label(annotations: &Annotations) -> Option<SprintLabel> {
    get_ignore_case(annotations, sprint::SPRINT_KEY)
        .filter(|v| !v.trim().is_empty())
        .map(label_from_annotation)
}
