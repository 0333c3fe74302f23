//! Dataset CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::Path;

use crate::cli::display::{list_table, render_list};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Dataset, DatasetImage};
use crate::domain::ports::DatasetRepository;

#[derive(Args, Debug)]
pub struct DatasetArgs {
    #[command(subcommand)]
    pub command: DatasetCommands,
}

#[derive(Subcommand, Debug)]
pub enum DatasetCommands {
    /// Register a dataset by scanning a directory for image files
    Add {
        /// Dataset name
        name: String,
        /// Directory containing the images
        root_path: String,
    },
    /// List registered datasets
    List,
    /// List a dataset's images
    Images {
        /// Dataset ID
        id: i64,
    },
}

pub async fn execute(args: DatasetArgs, json: bool) -> Result<()> {
    let pool = super::open_pool().await?;
    let repo = super::dataset_repository(&pool);

    match args.command {
        DatasetCommands::Add { name, root_path } => {
            let rel_paths = scan_images(Path::new(&root_path))?;
            let dataset = repo.insert(&name, &root_path, &rel_paths).await?;
            output(&DatasetOutput { dataset, image_count: rel_paths.len() }, json);
        }
        DatasetCommands::List => {
            let datasets = repo.list().await?;
            output(&DatasetListOutput { datasets }, json);
        }
        DatasetCommands::Images { id } => {
            let images = repo.images(id).await?;
            output(&ImageListOutput { images }, json);
        }
    }
    Ok(())
}

/// Collect relative paths of all regular files under `root`, sorted for a
/// stable element order.
fn scan_images(root: &Path) -> Result<Vec<String>> {
    fn walk(dir: &Path, root: &Path, acc: &mut Vec<String>) -> Result<()> {
        for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = entry?.path();
            if path.is_dir() {
                walk(&path, root, acc)?;
            } else if let Ok(rel) = path.strip_prefix(root) {
                acc.push(rel.to_string_lossy().into_owned());
            }
        }
        Ok(())
    }

    let mut rel_paths = Vec::new();
    walk(root, root, &mut rel_paths)?;
    rel_paths.sort();
    Ok(rel_paths)
}


#[derive(Serialize)]
struct DatasetOutput {
    dataset: Dataset,
    image_count: usize,
}

impl CommandOutput for DatasetOutput {
    fn to_human(&self) -> String {
        format!(
            "Registered dataset {} ({}) with {} images",
            self.dataset.id, self.dataset.name, self.image_count
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct DatasetListOutput {
    datasets: Vec<Dataset>,
}

impl CommandOutput for DatasetListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "root path", "created"]);
        for dataset in &self.datasets {
            table.add_row(vec![
                dataset.id.to_string(),
                dataset.name.clone(),
                dataset.root_path.clone(),
                dataset.created_at.format("%Y-%m-%d").to_string(),
            ]);
        }
        render_list("dataset", &table, self.datasets.len())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct ImageListOutput {
    images: Vec<DatasetImage>,
}

impl CommandOutput for ImageListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "rel path"]);
        for image in &self.images {
            table.add_row(vec![image.id.to_string(), image.rel_path.clone()]);
        }
        render_list("image", &table, self.images.len())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
