use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;

use release_matrix::artifact::extractor::TarGzExtractor;
use release_matrix::artifact::fetcher::HttpFetcher;
use release_matrix::artifact::trunk::GitTrunk;
use release_matrix::artifact::{ArtifactCache, CacheLayout, Collaborators};
use release_matrix::config::{BootstrapSource, Settings, SettingsOverrides};
use release_matrix::logging::init_logging;
use release_matrix::matrix::{
    MatrixRunner, RunRequest, RunnerOptions, Selection, ShellExecutor, Summary,
};
use release_matrix::version::lister::release_lister;
use release_matrix::version::sort_versions;

#[derive(Parser)]
#[command(name = "release-matrix")]
#[command(
    version,
    about = "Run a command against every historical release of a project"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache root (overrides the settings file and RELEASE_MATRIX_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Release index URL
    #[arg(long, global = true)]
    releases_url: Option<String>,

    /// Result log path
    #[arg(long, global = true)]
    result_log: Option<PathBuf>,

    /// Read release identifiers from a JSON array instead of the index
    #[arg(long, global = true)]
    versions_from: Option<PathBuf>,

    /// More output; repeat for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Args)]
struct SelectionArgs {
    /// Resume from the first version starting with this value
    #[arg(long)]
    start: Option<String>,

    /// Only this version (wins over --start)
    #[arg(long = "version")]
    exact: Option<String>,
}

impl From<SelectionArgs> for Selection {
    fn from(args: SelectionArgs) -> Self {
        Selection {
            start: args.start,
            exact: args.exact,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print every known release identifier in release order
    List,
    /// Download and extract the selected releases without running anything
    Prepare {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Run a command or script against each selected release
    Run {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Interpreter prefixed to inline commands, exported as TEST_PYTHON
        #[arg(long)]
        python: Option<String>,

        /// Script path or inline command
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

impl Cli {
    fn verbosity(&self) -> i8 {
        if self.quiet {
            -1
        } else {
            self.verbose.min(i8::MAX as u8) as i8
        }
    }

    fn settings(&self) -> anyhow::Result<Settings> {
        let settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        Ok(settings.with_overrides(SettingsOverrides {
            cache_dir: self.cache_dir.clone(),
            releases_url: self.releases_url.clone(),
            result_log: self.result_log.clone(),
        }))
    }
}

fn runner(settings: &Settings) -> anyhow::Result<MatrixRunner> {
    let layout = CacheLayout::new(settings.resolved_cache_dir());
    let cache = ArtifactCache::new(
        layout,
        &settings.releases_url,
        BootstrapSource::parse(&settings.bootstrap_source),
        Collaborators {
            fetcher: Arc::new(HttpFetcher::new()),
            extractor: Arc::new(TarGzExtractor),
            trunk: Arc::new(GitTrunk::new(&settings.trunk_url, &settings.trunk_branch)),
        },
    )?;
    Ok(MatrixRunner::new(
        cache,
        Arc::new(ShellExecutor::default()),
        RunnerOptions::from(settings),
    ))
}

async fn execute(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let versions = release_lister(&settings, cli.versions_from.as_deref())
        .list_versions()
        .await
        .context("Failed to list releases")?;
    info!("Found {} releases", versions.len());

    match cli.command {
        Command::List => {
            for version in sort_versions(&versions)? {
                println!("{}", version);
            }
        }
        Command::Prepare { selection } => {
            let prepared = runner(&settings)?
                .prepare(&versions, &selection.into())
                .await?;
            for (version, dir) in prepared {
                println!("{}\t{}", version, dir.display());
            }
        }
        Command::Run {
            selection,
            python,
            command,
        } => {
            let request = RunRequest {
                selection: selection.into(),
                command: command.join(" "),
                interpreter: python,
            };
            let runs = runner(&settings)?.run(&versions, &request).await?;
            print!("{}", Summary::new(&runs));
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbosity(), cli.log_file.as_deref())?;
    let settings = cli.settings()?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(execute(cli, settings))
}
