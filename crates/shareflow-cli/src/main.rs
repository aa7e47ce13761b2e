//! Shareflow CLI — command-line client for the Shareflow API.
//!
//! Point it at a server with `--url` or SHAREFLOW_URL (default
//! http://localhost:8080). Output is JSON on stdout.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use shareflow_cli::client::{self, UploadOptions};
use shareflow_cli::{init_tracing, ApiClient};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "shareflow", about = "Shareflow API CLI")]
struct Cli {
    /// Base URL of the Shareflow server
    #[arg(
        long,
        global = true,
        env = "SHAREFLOW_URL",
        default_value = "http://localhost:8080"
    )]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Lifetime in seconds before the file expires
        #[arg(long)]
        ttl: Option<u64>,
        /// Downloads allowed before the file is retired (0 = unlimited)
        #[arg(long)]
        max_downloads: Option<u32>,
        /// Password required to download the file
        #[arg(long)]
        password: Option<String>,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Download a file's content
    Download {
        /// File UUID
        id: Uuid,
        /// Password for protected files
        #[arg(long)]
        password: Option<String>,
        /// Output path (defaults to the server-advertised name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Get file metadata by ID
    Info {
        /// File UUID
        id: Uuid,
    },
    /// List files with pagination
    List {
        /// Maximum number of items
        #[arg(long)]
        limit: Option<usize>,
        /// Offset for pagination
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Search files by text, tag, and sort order
    Search {
        /// Text matched against names and descriptions
        #[arg(long, short)]
        query: Option<String>,
        /// Exact tag to filter by
        #[arg(long)]
        tag: Option<String>,
        /// Sort key: upload_time, size, or downloads
        #[arg(long)]
        sort: Option<String>,
    },
    /// Get aggregate stats
    Stats,
    /// Delete a file by ID
    Delete {
        /// File UUID
        id: Uuid,
    },
    /// Delete several files in one request
    BulkDelete {
        /// File UUIDs
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    // Load .env before clap reads SHAREFLOW_URL.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.url.clone())?;

    match cli.command {
        Commands::Upload {
            file,
            ttl,
            max_downloads,
            password,
            description,
            tags,
        } => {
            let options = UploadOptions {
                ttl_secs: ttl,
                max_downloads,
                password,
                description,
                tags,
            };
            let response = client.upload(&file, options).await?;
            print_json(&response)?;
        }
        Commands::Download {
            id,
            password,
            output,
        } => {
            let mut response = client.download(id, password.as_deref()).await?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(
                    client::suggested_filename(&response).unwrap_or_else(|| id.to_string()),
                )
            });

            let mut file = tokio::fs::File::create(&path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut bytes = 0u64;
            while let Some(chunk) = response
                .chunk()
                .await
                .context("Failed to read download stream")?
            {
                file.write_all(&chunk)
                    .await
                    .context("Failed to write output file")?;
                bytes += chunk.len() as u64;
            }
            file.flush().await.context("Failed to flush output file")?;

            print_json(&serde_json::json!({
                "saved_to": path.display().to_string(),
                "bytes": bytes,
            }))?;
        }
        Commands::Info { id } => {
            let response = client.info(id).await?;
            print_json(&response)?;
        }
        Commands::List { limit, offset } => {
            let response = client.list(limit, offset).await?;
            print_json(&response)?;
        }
        Commands::Search { query, tag, sort } => {
            let response = client
                .search(query.as_deref(), tag.as_deref(), sort.as_deref())
                .await?;
            print_json(&response)?;
        }
        Commands::Stats => {
            let response = client.stats().await?;
            print_json(&response)?;
        }
        Commands::Delete { id } => {
            client.delete_file(id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("File {} deleted", id) }),
            )?;
        }
        Commands::BulkDelete { ids } => {
            let response = client.bulk_delete(ids).await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
