use anyhow::Result;
use clap::{Parser, Subcommand};
use spark_git::areas::repository::Repository;
use spark_git::errors::CommitError;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "spark-git",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small embedded git client",
    long_about = "Records a working directory as git commits. \
    Objects and refs are written in the on-disk format used by git, \
    so the result can be inspected with the regular git tools.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
        #[arg(short = 'b', long, help = "Name of the branch HEAD points to")]
        initial_branch: Option<String>,
    },
    #[command(
        name = "commit",
        about = "Record the working tree as a new commit",
        long_about = "This command snapshots every file of the working tree and records it \
        as a commit on the checked-out branch. Empty directories are not recorded."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "write-tree",
        about = "Store the working tree and print its tree id",
        long_about = "This command writes the blobs and trees of the working tree \
        without creating a commit, then prints the id of the root tree."
    )]
    WriteTree,
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the SHA of the object to be specified, abbreviated SHAs are accepted."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object SHA to print")]
        sha: String,
    },
}

fn open_repository(path: Option<&str>) -> Result<Repository> {
    match path {
        Some(path) => Repository::new(path, Box::new(std::io::stdout())),
        None => {
            let pwd = std::env::current_dir()?;
            Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init {
            path,
            initial_branch,
        } => {
            let repository = open_repository(path.as_deref())?;

            repository.init(initial_branch.as_deref()).await?
        }
        Commands::Commit { message } => {
            let repository = open_repository(None)?;

            if let Err(error) = repository.commit(message).await {
                return match error.downcast_ref::<CommitError>() {
                    Some(CommitError::NoChangesToCommit) => {
                        println!("{error}");
                        Ok(ExitCode::FAILURE)
                    }
                    Some(commit_error) if commit_error.is_recoverable() => {
                        eprintln!("warning: {error:#}");
                        Ok(ExitCode::FAILURE)
                    }
                    _ => Err(error),
                };
            }
        }
        Commands::WriteTree => {
            let repository = open_repository(None)?;

            repository.snapshot_tree().await?;
        }
        Commands::CatFile { sha } => {
            let repository = open_repository(None)?;

            repository.cat_file(sha).await?
        }
    }

    Ok(ExitCode::SUCCESS)
}
