use std::path::Path;

use crate::config::Config;
use crate::docker::ContainerCommand;

use super::paths::mount_path;
use super::types::{
    CONTAINER_DATA_DIR, CONTAINER_SCRIPT_PATH, CONTAINER_SHELL, ImageReference, PlatformHint,
    platform_args,
};

/// Build a multi-platform `docker buildx build ... --push` command tagged
/// with `image`.
pub fn build_and_publish_command(cfg: &Config, image: &ImageReference) -> ContainerCommand {
    let args = vec![
        "buildx".into(),
        "build".into(),
        "--platform".into(),
        cfg.build_platforms.join(","),
        "-f".into(),
        cfg.dockerfile.clone(),
        "-t".into(),
        image.to_string(),
        "--push".into(),
        cfg.build_context.clone(),
    ];
    ContainerCommand::new("docker buildx build", args)
}

/// Build a `docker pull` command, optionally pinned to a platform.
pub fn pull_command(image: &ImageReference, hint: Option<PlatformHint>) -> ContainerCommand {
    let mut args = vec!["pull".into()];
    args.extend(platform_args(hint));
    args.push(image.to_string());
    ContainerCommand::new("docker pull", args)
}

/// Build the ephemeral `docker run` that executes the mounted script
/// against the mounted dataset.
pub fn run_script_command(
    image: &ImageReference,
    script_path: &Path,
    data_dir: &Path,
    hint: Option<PlatformHint>,
) -> ContainerCommand {
    let mut args = vec!["run".into()];
    args.extend(platform_args(hint));
    args.extend([
        "--rm".into(),
        "-v".into(),
        format!("{}:{CONTAINER_DATA_DIR}", mount_path(data_dir)),
        "-v".into(),
        format!("{}:{CONTAINER_SCRIPT_PATH}", mount_path(script_path)),
        image.to_string(),
        CONTAINER_SHELL.into(),
        CONTAINER_SCRIPT_PATH.into(),
    ]);
    ContainerCommand::new("docker run", args)
}
