//! Session CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::display::{list_table, render_list};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{LabelingSession, SessionKind};
use crate::domain::ports::{DatasetRepository, NewSession};
use crate::services::session_service::SessionResults;
use crate::services::sampling::sample_image_slices;

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Create a labeling session over sampled images
    Create {
        /// Dataset ID
        #[arg(long)]
        dataset: i64,
        /// Session kind (classification, comparison_random, comparison_active_sort)
        #[arg(long, default_value = "comparison_active_sort")]
        kind: String,
        /// Session name
        name: String,
        /// The question shown to raters
        #[arg(long, default_value = "")]
        prompt: String,
        /// Comma-separated label options beyond the built-in First/Second
        #[arg(long, default_value = "")]
        label_options: String,
        /// Number of images to sample
        #[arg(long)]
        image_count: usize,
        /// Number of comparisons for random-comparison sessions (all pairs if omitted)
        #[arg(long)]
        comparison_count: Option<usize>,
    },
    /// List a dataset's sessions
    List {
        /// Dataset ID
        #[arg(long)]
        dataset: i64,
    },
    /// Show one session
    Show {
        /// Session ID
        id: i64,
    },
    /// Delete a session and all its elements and labels
    Delete {
        /// Session ID
        id: i64,
    },
    /// Compute a session's results
    Results {
        /// Session ID
        id: i64,
    },
}

pub async fn execute(args: SessionArgs, json: bool) -> Result<()> {
    let pool = super::open_pool().await?;
    let service = super::session_service(&pool);

    match args.command {
        SessionCommands::Create {
            dataset,
            kind,
            name,
            prompt,
            label_options,
            image_count,
            comparison_count,
        } => {
            let kind = SessionKind::from_str(&kind)
                .with_context(|| format!("unknown session kind: {kind}"))?;
            let datasets = super::dataset_repository(&pool);
            let images = datasets.images(dataset).await?;

            let mut rng = rand::thread_rng();
            let slices = sample_image_slices(&images, image_count, &mut rng)?;
            let session = service
                .create_session(
                    NewSession {
                        dataset_id: dataset,
                        kind,
                        name,
                        prompt,
                        label_options,
                        metadata_json: "{}".to_string(),
                    },
                    &slices,
                    comparison_count,
                    &mut rng,
                )
                .await?;
            output(&SessionOutput { session }, json);
        }
        SessionCommands::List { dataset } => {
            let sessions = service.list_sessions(dataset).await?;
            output(&SessionListOutput { sessions }, json);
        }
        SessionCommands::Show { id } => {
            let session = service.get_session(id).await?;
            output(&SessionOutput { session }, json);
        }
        SessionCommands::Delete { id } => {
            service.delete_session(id).await?;
            output(&DeletedOutput { id }, json);
        }
        SessionCommands::Results { id } => {
            let session = service.get_session(id).await?;
            let results = service.compute_results(&session).await?;
            output(&ResultsOutput { session, results }, json);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SessionOutput {
    session: LabelingSession,
}

impl CommandOutput for SessionOutput {
    fn to_human(&self) -> String {
        format!(
            "Session {}: {} [{}]\n  prompt: {}",
            self.session.id,
            self.session.name,
            self.session.kind.tags().join(", "),
            truncate(&self.session.prompt, 60)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct SessionListOutput {
    sessions: Vec<LabelingSession>,
}

impl CommandOutput for SessionListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "kind", "created"]);
        for session in &self.sessions {
            table.add_row(vec![
                session.id.to_string(),
                session.name.clone(),
                session.kind.as_str().to_string(),
                session.created_at.format("%Y-%m-%d").to_string(),
            ]);
        }
        render_list("session", &table, self.sessions.len())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct DeletedOutput {
    id: i64,
}

impl CommandOutput for DeletedOutput {
    fn to_human(&self) -> String {
        format!("Deleted session {}", self.id)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct ResultsOutput {
    session: LabelingSession,
    #[serde(skip)]
    results: SessionResults,
}

impl CommandOutput for ResultsOutput {
    fn to_human(&self) -> String {
        let status = if self.results.labeling_complete { "complete" } else { "in progress" };
        let mut table = list_table(&["rank", "image", "dim", "slice", "label"]);
        for (rank, result) in self.results.slice_results.iter().enumerate() {
            table.add_row(vec![
                (rank + 1).to_string(),
                result.slice.slice.image_id.to_string(),
                result.slice.slice.slice_dim.to_string(),
                result.slice.slice.slice_index.to_string(),
                result.latest_label.clone().unwrap_or_default(),
            ]);
        }
        format!(
            "Session {} results ({status}):\n{}",
            self.session.id,
            render_list("slice", &table, self.results.slice_results.len())
        )
    }

    fn to_json(&self) -> serde_json::Value {
        let slices: Vec<serde_json::Value> = self
            .results
            .slice_results
            .iter()
            .enumerate()
            .map(|(rank, r)| {
                serde_json::json!({
                    "rank": rank + 1,
                    "image_id": r.slice.slice.image_id,
                    "slice_dim": r.slice.slice.slice_dim,
                    "slice_index": r.slice.slice.slice_index,
                    "label": r.latest_label,
                })
            })
            .collect();
        serde_json::json!({
            "session_id": self.session.id,
            "labeling_complete": self.results.labeling_complete,
            "slices": slices,
        })
    }
}
