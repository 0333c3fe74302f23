//! Label CLI commands.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::display::{list_table, render_list};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Comparison, Label};
use crate::services::session_service::SessionElements;

#[derive(Args, Debug)]
pub struct LabelArgs {
    #[command(subcommand)]
    pub command: LabelCommands,
}

#[derive(Subcommand, Debug)]
pub enum LabelCommands {
    /// Record a label for an element
    Add {
        /// Session ID
        #[arg(long)]
        session: i64,
        /// Element ID
        #[arg(long)]
        element: i64,
        /// Label value (First/Second for comparisons, or a session label option)
        value: String,
        /// Relabel even when it discards later judgments
        #[arg(long)]
        force: bool,
    },
    /// Show an element's full label history
    History {
        /// Element ID
        element: i64,
    },
    /// Show the next unjudged comparison for an active-sort session
    Next {
        /// Session ID
        session: i64,
    },
}

pub async fn execute(args: LabelArgs, json: bool) -> Result<()> {
    let pool = super::open_pool().await?;
    let service = super::session_service(&pool);

    match args.command {
        LabelCommands::Add { session, element, value, force } => {
            let session = service.get_session(session).await?;

            if session.kind.is_active() && !force {
                let index = comparison_index(&service, &session, element).await?;
                if service.should_warn_about_label_overwrite(&session, index).await? {
                    anyhow::bail!(
                        "relabeling element {element} discards later judgments \
                         (use --force to proceed)"
                    );
                }
            }

            let now = Utc::now();
            service.add_label(&session, element, &value, now, now).await?;
            output(&LabelAddedOutput { session_id: session.id, element_id: element, value }, json);
        }
        LabelCommands::History { element } => {
            let labels = service.label_history(element).await?;
            output(&HistoryOutput { element_id: element, labels }, json);
        }
        LabelCommands::Next { session } => {
            let session = service.get_session(session).await?;
            let next = service.frontier(&session).await?;
            output(&NextOutput { session_id: session.id, next }, json);
        }
    }
    Ok(())
}

/// Resolve a comparison element's index within its session sequence.
async fn comparison_index(
    service: &super::Service,
    session: &crate::domain::models::LabelingSession,
    element_id: i64,
) -> Result<i64> {
    let elements = service.select_elements_to_label(session).await?;
    let SessionElements::Comparisons(comparisons) = elements else {
        anyhow::bail!("session {} has no comparison elements", session.id);
    };
    comparisons
        .iter()
        .find(|c| c.id == element_id)
        .map(|c| c.element_index)
        .with_context(|| format!("element {element_id} not found in session {}", session.id))
}

#[derive(Serialize)]
struct LabelAddedOutput {
    session_id: i64,
    element_id: i64,
    value: String,
}

impl CommandOutput for LabelAddedOutput {
    fn to_human(&self) -> String {
        format!(
            "Recorded label {:?} for element {} in session {}",
            self.value, self.element_id, self.session_id
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct HistoryOutput {
    element_id: i64,
    labels: Vec<Label>,
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "value", "finished"]);
        for label in &self.labels {
            table.add_row(vec![
                label.id.to_string(),
                label.value.clone(),
                label.finish_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]);
        }
        render_list("label", &table, self.labels.len())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct NextOutput {
    session_id: i64,
    next: Option<Comparison>,
}

impl CommandOutput for NextOutput {
    fn to_human(&self) -> String {
        match &self.next {
            Some(comparison) => format!(
                "Next comparison for session {}: element {} (index {})\n  first:  {}\n  second: {}",
                self.session_id,
                comparison.id,
                comparison.element_index,
                comparison.left,
                comparison.right
            ),
            None => format!("Session {} has no unjudged comparisons.", self.session_id),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
