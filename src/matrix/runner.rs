//! Sequential execution of a command against every selected version

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::artifact::ArtifactCache;
use crate::artifact::layout::bootstrap_script;
use crate::config::Settings;
use crate::matrix::command::{ExecutableRewriter, build_script, prepare_command};
use crate::matrix::error::MatrixError;
use crate::matrix::executor::{CommandExecutor, Invocation};
use crate::matrix::report::{ResultLog, TestRun};
use crate::matrix::selection::Selection;
use crate::version::sort_versions;

/// Environment conventions applied to every execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    pub executables: Vec<String>,
    pub version_env_var: String,
    pub interpreter_env_var: String,
    pub result_log: PathBuf,
}

impl From<&Settings> for RunnerOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            executables: settings.executables.clone(),
            version_env_var: settings.version_env_var.clone(),
            interpreter_env_var: settings.interpreter_env_var.clone(),
            result_log: settings.result_log.clone(),
        }
    }
}

/// What to run and against which versions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub selection: Selection,
    pub command: String,
    pub interpreter: Option<String>,
}

/// Runs one command against a matrix of prepared release environments.
///
/// Versions are processed strictly one after another. A failing test command
/// is recorded and the run moves on; an environment that cannot be prepared
/// aborts the whole run.
pub struct MatrixRunner {
    cache: ArtifactCache,
    executor: Arc<dyn CommandExecutor>,
    rewriter: ExecutableRewriter,
    options: RunnerOptions,
}

impl MatrixRunner {
    pub fn new(
        cache: ArtifactCache,
        executor: Arc<dyn CommandExecutor>,
        options: RunnerOptions,
    ) -> Self {
        Self {
            cache,
            executor,
            rewriter: ExecutableRewriter::new(&options.executables),
            options,
        }
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Order every known version, register them with the cache and apply the
    /// selection
    pub fn select(
        &mut self,
        all_versions: &[String],
        selection: &Selection,
    ) -> Result<Vec<String>, MatrixError> {
        let ordered = sort_versions(all_versions)?;
        self.cache.register(ordered.iter().cloned());
        Ok(selection.apply(&ordered))
    }

    /// Materialize the selected environments without running anything
    pub async fn prepare(
        &mut self,
        all_versions: &[String],
        selection: &Selection,
    ) -> Result<Vec<(String, PathBuf)>, MatrixError> {
        let selected = self.select(all_versions, selection)?;
        let mut prepared = Vec::with_capacity(selected.len());
        for version in selected {
            let dir = self.cache.ensure(&version).await?;
            info!("{} ready at {:?}", version, dir);
            prepared.push((version, dir));
        }
        Ok(prepared)
    }

    /// Run the request against every selected version, in order
    pub async fn run(
        &mut self,
        all_versions: &[String],
        request: &RunRequest,
    ) -> Result<Vec<TestRun>, MatrixError> {
        let log = ResultLog::create(&self.options.result_log)?;
        let selected = self.select(all_versions, &request.selection)?;
        let command = prepare_command(&request.command, request.interpreter.as_deref())?;

        let mut runs = Vec::with_capacity(selected.len());
        for version in selected {
            info!("###################################");
            info!("# TESTING: {}", version);
            info!("###################################");

            let run = self
                .run_version(&version, &command, request.interpreter.as_deref())
                .await?;
            log.append(&run)?;
            runs.push(run);
        }

        info!("###################################");
        info!("#            RESULTS              #");
        info!("###################################");
        for run in &runs {
            info!("{}", run.log_line());
        }

        Ok(runs)
    }

    async fn run_version(
        &mut self,
        version: &str,
        command: &str,
        interpreter: Option<&str>,
    ) -> Result<TestRun, MatrixError> {
        debug!("{}: pending", version);
        let env_dir = self.cache.ensure(version).await?;

        let bootstrap = bootstrap_script(&env_dir);
        if !bootstrap.is_file() {
            return Err(MatrixError::MissingBootstrap(env_dir));
        }
        debug!("{}: environment ready at {:?}", version, env_dir);

        let command = self.rewriter.rewrite(command, &env_dir.join("bin"));
        let mut env = vec![(self.options.version_env_var.clone(), version.to_string())];
        if let Some(interpreter) = interpreter {
            env.push((
                self.options.interpreter_env_var.clone(),
                interpreter.to_string(),
            ));
        }
        let invocation = Invocation {
            version: version.to_string(),
            script: build_script(&bootstrap, &command),
            env,
        };
        info!("{}", invocation.script);

        let started_at = Utc::now();
        let exit_code = self.executor.execute(&invocation).await?;
        let finished_at = Utc::now();
        debug!("{}: executed, exit code {}", version, exit_code);

        Ok(TestRun {
            version: version.to_string(),
            exit_code,
            started_at,
            finished_at,
        })
    }
}
