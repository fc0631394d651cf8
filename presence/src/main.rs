use clap::{Args, Parser, Subcommand};
use icons::{IconTable, Settings};
use presence::{
    resolve_file_icon, resolve_repository_icon, Document, Git2Loader, PresenceContext,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "presence")]
#[command(about = "Resolve the presence icon for the file open in an editor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct WorkspaceArgs {
    /// Open workspace folder (repeatable, defaults to the current directory)
    #[arg(short, long = "workspace")]
    workspaces: Vec<PathBuf>,
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the icon for a document
    File {
        /// Path of the open document
        path: String,
        /// Editor language identifier of the document
        #[arg(short, long, default_value = "")]
        language: String,
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve only the repository icon URL
    Repo {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
    /// List the language identifiers with a known icon
    Languages {
        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::File {
            path,
            language,
            workspace,
            json,
        } => {
            let ctx = build_context(workspace)?;
            let document = Document::new(path, language);
            let icon = resolve_file_icon(&ctx, &document).await?;
            if json {
                let output = serde_json::json!({
                    "path": document.path,
                    "languageId": document.language_id,
                    "icon": icon,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", icon);
            }
        }
        Commands::Repo { workspace } => {
            let ctx = build_context(workspace)?;
            match resolve_repository_icon(&ctx).await? {
                Some(url) => println!("{}", url),
                None => info!("No repository icon for this workspace"),
            }
        }
        Commands::Languages { config } => {
            let settings = load_settings(config)?;
            let table = IconTable::from_settings(&settings)?;
            for (language, icon) in table.languages() {
                println!("{:<20} {}", language, icon);
            }
        }
    }

    Ok(())
}

fn load_settings(config: Option<PathBuf>) -> Result<Settings, Box<dyn std::error::Error>> {
    match config {
        Some(path) => Ok(Settings::load(path)?),
        None => Ok(Settings::default()),
    }
}

fn build_context(args: WorkspaceArgs) -> Result<PresenceContext, Box<dyn std::error::Error>> {
    let settings = load_settings(args.config)?;
    let workspaces = if args.workspaces.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        args.workspaces
    };
    let loader = Git2Loader::new(workspaces.clone());
    Ok(PresenceContext::new(Box::new(loader), workspaces, settings)?)
}
