use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::docker::{ContainerCommand, ContainerResult, DockerExecutor, Executor};
use crate::error::{OrchestratorError, Result};

use super::commands::{build_and_publish_command, pull_command, run_script_command};
use super::types::{ImageReference, PlatformHint};

/// Translates build, pull and run requests into container runtime
/// invocations.
///
/// Holds only immutable configuration and the executor; every call is an
/// independent, blocking invocation.
pub struct ContainerOrchestrator<E = DockerExecutor> {
    config: Config,
    executor: E,
}

impl ContainerOrchestrator<DockerExecutor> {
    /// Orchestrator backed by the runtime binary named in `config`.
    pub fn from_config(config: Config) -> Self {
        let executor = DockerExecutor::new(config.docker_binary.clone());
        Self::new(config, executor)
    }
}

impl<E: Executor> ContainerOrchestrator<E> {
    pub fn new(config: Config, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Build the image for every configured platform and push it.
    pub fn build_and_publish(&self) -> Result<ContainerResult> {
        let cmd = self.plan_build_and_publish()?;
        info!(
            image = %self.config.image,
            platforms = %self.config.build_platforms.join(","),
            "Building and pushing image"
        );
        let result = self.invoke(&cmd)?;
        info!(image = %self.config.image, "Image published");
        Ok(result)
    }

    /// Pull `image` for the host's default platform.
    pub fn pull_image(&self, image: &str) -> Result<ContainerResult> {
        let image = ImageReference::parse(image)?;
        self.pull(&image, None)
    }

    /// Make `image` available locally, pinned to the architecture the hint
    /// selects. Without a hint this is a plain [`pull_image`](Self::pull_image).
    pub fn prepare_platform(
        &self,
        image: &str,
        hint: Option<PlatformHint>,
    ) -> Result<ContainerResult> {
        let image = ImageReference::parse(image)?;
        let result = self.pull(&image, hint)?;
        info!(image = %image, "Docker environment ready");
        Ok(result)
    }

    /// Run the host script inside an ephemeral container with the dataset
    /// mounted at `/data`. Paths are not checked for existence; the runtime
    /// reports missing ones.
    pub fn run_script(
        &self,
        image: &str,
        script_path: &Path,
        data_dir: &Path,
        hint: Option<PlatformHint>,
    ) -> Result<ContainerResult> {
        self.run_script_with_log(image, script_path, data_dir, hint, None)
    }

    /// [`run_script`](Self::run_script), additionally writing the captured
    /// container output to `log_path`.
    pub fn run_script_with_log(
        &self,
        image: &str,
        script_path: &Path,
        data_dir: &Path,
        hint: Option<PlatformHint>,
        log_path: Option<&Path>,
    ) -> Result<ContainerResult> {
        let mut cmd = self.plan_run_script(image, script_path, data_dir, hint)?;
        if let Some(path) = log_path {
            cmd = cmd.with_log_path(path);
        }
        info!(script = %script_path.display(), data = %data_dir.display(), "Running container with script");
        let result = self.invoke(&cmd)?;
        info!(script = %script_path.display(), "Script executed successfully inside container");
        Ok(result)
    }

    /// Validate inputs and return the `docker run` invocation without
    /// executing it.
    pub fn plan_run_script(
        &self,
        image: &str,
        script_path: &Path,
        data_dir: &Path,
        hint: Option<PlatformHint>,
    ) -> Result<ContainerCommand> {
        let image = ImageReference::parse(image)?;
        require_path("script path", script_path)?;
        require_path("data directory", data_dir)?;
        Ok(run_script_command(&image, script_path, data_dir, hint))
    }

    /// Validate inputs and return the `docker pull` invocation without
    /// executing it.
    pub fn plan_pull(&self, image: &str, hint: Option<PlatformHint>) -> Result<ContainerCommand> {
        let image = ImageReference::parse(image)?;
        Ok(pull_command(&image, hint))
    }

    /// Validate the configured build identifiers and return the
    /// `docker buildx build` invocation without executing it.
    pub fn plan_build_and_publish(&self) -> Result<ContainerCommand> {
        let cfg = &self.config;
        let image = ImageReference::parse(&cfg.image)?;
        if cfg.build_platforms.iter().all(|p| p.trim().is_empty()) {
            return Err(OrchestratorError::InvalidInput(
                "at least one build platform is required".into(),
            ));
        }
        if cfg.build_platforms.iter().any(|p| p.trim().is_empty()) {
            return Err(OrchestratorError::InvalidInput(
                "build platforms contain a blank entry".into(),
            ));
        }
        require_path("dockerfile", Path::new(&cfg.dockerfile))?;
        require_path("build context", Path::new(&cfg.build_context))?;
        Ok(build_and_publish_command(cfg, &image))
    }

    fn pull(&self, image: &ImageReference, hint: Option<PlatformHint>) -> Result<ContainerResult> {
        match hint {
            Some(h) => info!(image = %image, platform = h.emulation_platform(), "Pulling Docker image"),
            None => info!(image = %image, "Pulling Docker image"),
        }
        let result = self.invoke(&pull_command(image, hint))?;
        info!(image = %image, "Docker image pulled successfully");
        Ok(result)
    }

    fn invoke(&self, cmd: &ContainerCommand) -> Result<ContainerResult> {
        debug!(command = %cmd.command_line(self.executor.program()), "invoking");
        let result = self.executor.execute(cmd)?;
        if result.success() {
            return Ok(result);
        }

        let err = OrchestratorError::InvocationFailure {
            operation: cmd.operation,
            exit_code: result.exit_code,
            cancelled: result.cancelled,
            detail: result.failure_detail(),
        };
        warn!(error = %err, "invocation failed");
        Err(err)
    }
}

fn require_path(what: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(OrchestratorError::InvalidInput(format!(
            "{what} must not be empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Records every command and replays scripted exit codes (default 0).
    #[derive(Default)]
    struct RecordingExecutor {
        calls: RefCell<Vec<ContainerCommand>>,
        exit_codes: RefCell<VecDeque<Option<i32>>>,
    }

    impl RecordingExecutor {
        fn failing_with(code: i32) -> Self {
            let exec = Self::default();
            exec.exit_codes.borrow_mut().push_back(Some(code));
            exec
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().iter().map(|c| c.args.clone()).collect()
        }
    }

    impl Executor for RecordingExecutor {
        fn program(&self) -> &str {
            "docker"
        }

        fn execute(&self, cmd: &ContainerCommand) -> Result<ContainerResult> {
            self.calls.borrow_mut().push(cmd.clone());
            let exit_code = self.exit_codes.borrow_mut().pop_front().unwrap_or(Some(0));
            Ok(ContainerResult {
                exit_code,
                stderr: if exit_code == Some(0) {
                    String::new()
                } else {
                    "Error response from daemon: pull access denied\n".into()
                },
                ..Default::default()
            })
        }
    }

    fn orchestrator(exec: RecordingExecutor) -> ContainerOrchestrator<RecordingExecutor> {
        ContainerOrchestrator::new(Config::default(), exec)
    }

    #[test]
    fn empty_image_fails_before_any_invocation() {
        let orch = orchestrator(RecordingExecutor::default());
        let err = orch.pull_image("").unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(_)));

        let err = orch
            .run_script("", Path::new("/s.sh"), Path::new("/d"), None)
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(_)));
        assert!(orch.executor().calls().is_empty());
    }

    #[test]
    fn empty_paths_fail_before_any_invocation() {
        let orch = orchestrator(RecordingExecutor::default());
        let err = orch
            .run_script("img", Path::new(""), Path::new("/d"), None)
            .unwrap_err();
        assert!(err.to_string().contains("script path"));
        let err = orch
            .run_script("img", Path::new("/s.sh"), Path::new(""), None)
            .unwrap_err();
        assert!(err.to_string().contains("data directory"));
        assert!(orch.executor().calls().is_empty());
    }

    #[test]
    fn failed_pull_reports_invocation_failure() {
        let orch = orchestrator(RecordingExecutor::failing_with(2));
        let err = orch.pull_image("calvinwhow/freesurfer:latest").unwrap_err();
        match &err {
            OrchestratorError::InvocationFailure {
                operation,
                exit_code,
                cancelled,
                detail,
            } => {
                assert_eq!(*operation, "docker pull");
                assert_eq!(*exit_code, Some(2));
                assert!(!cancelled);
                assert!(detail.contains("pull access denied"));
            }
            other => panic!("expected InvocationFailure, got: {other:?}"),
        }
        assert_eq!(orch.executor().calls().len(), 1);
    }

    #[test]
    fn prepare_platform_dispatches_on_hint() {
        let orch = orchestrator(RecordingExecutor::default());
        orch.prepare_platform("img:1", Some(PlatformHint::Mac)).unwrap();
        orch.prepare_platform("img:1", Some(PlatformHint::Windows)).unwrap();
        orch.prepare_platform("img:1", None).unwrap();

        let calls = orch.executor().calls();
        assert_eq!(calls[0], vec!["pull", "--platform", "linux/arm64", "img:1"]);
        assert_eq!(calls[1], vec!["pull", "--platform", "linux/amd64", "img:1"]);
        assert_eq!(calls[2], vec!["pull", "img:1"]);
    }

    #[test]
    fn prepare_platform_propagates_pull_failure() {
        let orch = orchestrator(RecordingExecutor::failing_with(1));
        let err = orch
            .prepare_platform("img:1", Some(PlatformHint::Windows))
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn repeated_runs_are_independent_invocations() {
        let orch = orchestrator(RecordingExecutor::default());
        for _ in 0..2 {
            orch.run_script(
                "calvinwhow/freesurfer:latest",
                Path::new("/home/user/run.sh"),
                Path::new("/home/user/data"),
                None,
            )
            .unwrap();
        }
        let calls = orch.executor().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert!(calls[0].contains(&"/home/user/data:/data".into()));
        assert!(calls[0].contains(&"/home/user/run.sh:/scripts/run_reconall.sh".into()));
    }

    #[test]
    fn failed_run_carries_operation_name() {
        let orch = orchestrator(RecordingExecutor::failing_with(137));
        let err = orch
            .run_script("img", Path::new("/s.sh"), Path::new("/d"), Some(PlatformHint::Mac))
            .unwrap_err();
        assert!(err.to_string().starts_with("docker run failed (exit status 137)"));
    }

    #[test]
    fn build_failure_is_returned_to_caller() {
        let orch = orchestrator(RecordingExecutor::failing_with(1));
        let err = orch.build_and_publish().unwrap_err();
        assert!(err.to_string().starts_with("docker buildx build failed"));
        assert_eq!(&orch.executor().calls()[0][..2], ["buildx", "build"]);
    }

    #[test]
    fn blank_build_identifiers_fail_before_any_invocation() {
        let cases = [
            Config {
                image: String::new(),
                ..Config::default()
            },
            Config {
                build_platforms: Vec::new(),
                ..Config::default()
            },
            Config {
                build_platforms: vec!["linux/amd64".into(), " ".into()],
                ..Config::default()
            },
            Config {
                dockerfile: String::new(),
                ..Config::default()
            },
            Config {
                build_context: String::new(),
                ..Config::default()
            },
        ];
        for cfg in cases {
            let orch = ContainerOrchestrator::new(cfg, RecordingExecutor::default());
            let err = orch.build_and_publish().unwrap_err();
            assert!(matches!(err, OrchestratorError::InvalidInput(_)), "{err}");
            assert!(orch.executor().calls().is_empty());
        }
    }

    #[test]
    fn planning_does_not_execute() {
        let orch = orchestrator(RecordingExecutor::default());
        let cmd = orch.plan_pull("img", Some(PlatformHint::Mac)).unwrap();
        assert_eq!(cmd.command_line("docker"), "docker pull --platform linux/arm64 img");
        orch.plan_build_and_publish().unwrap();
        assert!(orch.executor().calls().is_empty());
    }
}
