// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sentiment stage: score every repository's comments into the per-kind files.

use std::collections::HashMap;
use std::sync::Arc;

use ltcscope_core::{LtcError, Repository};
use ltcscope_features::{Layout, RepoOutcome};
use strum::IntoEnumIterator;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::comments::{CommentFile, CommentKind, ScoredComment, load_attributed, score_comments};

/// Shared state for the sentiment stage.
///
/// The three output files are shared by every repository task, so appends go
/// through one lock.
pub struct SentimentContext {
    pub layout: Layout,
    files: Mutex<HashMap<CommentKind, CommentFile>>,
}

impl SentimentContext {
    pub fn open(layout: Layout) -> Result<Self, LtcError> {
        let dir = layout.sentiment_dir();
        let files = CommentKind::iter()
            .map(|kind| Ok((kind, CommentFile::open(&dir.join(kind.file_name()))?)))
            .collect::<Result<HashMap<_, _>, LtcError>>()?;
        Ok(Self {
            layout,
            files: Mutex::new(files),
        })
    }

    async fn already_scored(&self, kind: CommentKind, repo_id: i64) -> bool {
        self.files
            .lock()
            .await
            .get(&kind)
            .is_some_and(|f| f.contains(repo_id))
    }
}

/// Load and score one kind on the blocking pool. Returns the number of
/// attributed comments with the scored survivors.
async fn score_kind(
    layout: &Layout,
    repo: &Repository,
    kind: CommentKind,
) -> Result<(usize, Vec<ScoredComment>), LtcError> {
    let layout = layout.clone();
    let name = repo.name.clone();
    let repo_id = repo.id;
    tokio::task::spawn_blocking(move || {
        let attributed = load_attributed(&layout, &name, kind)?;
        let total = attributed.len();
        Ok::<_, LtcError>((total, score_comments(repo_id, attributed)))
    })
    .await
    .map_err(|e| LtcError::Internal(format!("comment scoring panicked: {e}")))?
}

/// Clean, score and append the comments of one repository.
///
/// Kinds already present for the repository are skipped, as are kinds whose
/// dumps are missing. `written` counts stored comments, `skipped` counts
/// comments dropped by cleaning.
pub async fn score_repository(
    ctx: Arc<SentimentContext>,
    repo: Repository,
) -> Result<RepoOutcome, LtcError> {
    let mut written = 0usize;
    let mut dropped = 0usize;
    let mut available = 0usize;

    for kind in CommentKind::iter() {
        if ctx.already_scored(kind, repo.id).await {
            debug!(repo = %repo.name, %kind, "comments already scored");
            available += 1;
            continue;
        }
        let (total, scored) = match score_kind(&ctx.layout, &repo, kind).await {
            Ok(result) => result,
            Err(e) if e.is_missing_input() => {
                debug!(repo = %repo.name, %kind, "dumps missing, kind skipped");
                continue;
            }
            Err(e) => return Err(e),
        };
        available += 1;
        dropped += total - scored.len();
        written += scored.len();

        if let Some(file) = ctx.files.lock().await.get_mut(&kind) {
            file.append(&scored)?;
        }
        info!(repo = %repo.name, %kind, kept = scored.len(), total, "comments scored");
    }

    if available == 0 {
        return Ok(RepoOutcome::Skipped {
            reason: "no comment dumps".into(),
        });
    }
    Ok(RepoOutcome::Completed {
        written,
        skipped: dropped,
    })
}
