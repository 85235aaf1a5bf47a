use anyhow::Result;
use clap::Parser;

mod cli;
mod ingest;
mod project_cmds;

use cli::{Cli, Commands, ProjectCommands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let format = cli.format;

    match cli.command {
        Commands::Ingest {
            path,
            recipients,
            cd,
        } => {
            let project_root = determine_project_root(cd.as_deref())?;
            ingest::handle_ingest(&project_root, &path, recipients.as_deref(), format).await
        }
        Commands::Extract { path } => ingest::handle_extract(&path, format),
        Commands::Project { cmd, cd } => {
            let project_root = determine_project_root(cd.as_deref())?;
            match cmd {
                ProjectCommands::Show { key } => {
                    project_cmds::handle_show(&project_root, &key, format).await
                }
                ProjectCommands::List => project_cmds::handle_list(&project_root, format).await,
            }
        }
        Commands::Init { cd } => {
            let project_root = determine_project_root(cd.as_deref())?;
            let path = om_config::Config::write_default(&project_root)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn determine_project_root(cd: Option<&str>) -> Result<std::path::PathBuf> {
    let path = if let Some(cd_path) = cd {
        std::path::PathBuf::from(cd_path)
    } else {
        std::env::current_dir()?
    };

    Ok(path.canonicalize()?)
}
