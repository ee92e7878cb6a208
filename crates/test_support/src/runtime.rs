use anyhow::{bail, Result};
use std::{
    env,
    os::unix::net::UnixStream,
    path::{Path, PathBuf},
    sync::OnceLock,
    thread,
    time::{Duration, Instant},
};

const SOCKET_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Ensure a container runtime socket is available for testcontainers.
///
/// `DOCKER_HOST` wins when set. Otherwise the Docker socket is tried first,
/// then the usual Podman locations, and `DOCKER_HOST` is pointed at the
/// first one that accepts connections.
///
/// # Errors
/// Returns an error if no Docker/Podman socket can be found or reached.
pub fn ensure_container_runtime() -> Result<()> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();
    match INIT.get_or_init(init_container_runtime) {
        Ok(()) => Ok(()),
        Err(message) => bail!("{message}"),
    }
}

fn init_container_runtime() -> Result<(), String> {
    if let Ok(docker_host) = env::var("DOCKER_HOST") {
        return validate_docker_host(&docker_host);
    }

    let docker_socket = Path::new(DOCKER_SOCKET);
    if wait_for_socket(docker_socket, SOCKET_WAIT_TIMEOUT) {
        return Ok(());
    }

    if let Some(path) = podman_socket_candidates()
        .into_iter()
        .find(|path| path.exists())
    {
        if wait_for_socket(&path, SOCKET_WAIT_TIMEOUT) {
            set_docker_host(&path);
            return Ok(());
        }
        return Err(format!(
            "Podman socket found at `{}`, but it is not accepting connections. Start `podman.socket` or run `podman system service`.",
            path.display()
        ));
    }

    if docker_socket.exists() {
        return Err(format!(
            "Docker socket found at `{DOCKER_SOCKET}`, but it is not accepting connections. Start the Docker daemon or set `DOCKER_HOST`."
        ));
    }

    Err("No container runtime socket found. Start Docker, start `podman.socket`, or set `DOCKER_HOST`.".to_string())
}

fn validate_docker_host(docker_host: &str) -> Result<(), String> {
    let path = docker_host
        .strip_prefix("unix://")
        .or_else(|| docker_host.starts_with('/').then_some(docker_host));

    // tcp:// and friends are left to testcontainers
    let Some(path) = path else {
        return Ok(());
    };

    if wait_for_socket(Path::new(path), SOCKET_WAIT_TIMEOUT) {
        Ok(())
    } else {
        Err(format!(
            "`DOCKER_HOST` points to `{docker_host}`, but the socket is not accepting connections."
        ))
    }
}

fn podman_socket_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(runtime_dir) = env::var("XDG_RUNTIME_DIR") {
        candidates.push(PathBuf::from(runtime_dir).join("podman/podman.sock"));
    }
    candidates.push(PathBuf::from("/var/run/podman/podman.sock"));
    candidates.push(PathBuf::from("/run/podman/podman.sock"));
    candidates
}

fn wait_for_socket(path: &Path, timeout: Duration) -> bool {
    if !path.exists() {
        return false;
    }
    let start = Instant::now();
    while start.elapsed() < timeout {
        if UnixStream::connect(path).is_ok() {
            return true;
        }
        thread::sleep(Duration::from_millis(200));
    }
    false
}

fn set_docker_host(path: &Path) {
    // Set once, before any container is started.
    env::set_var("DOCKER_HOST", format!("unix://{}", path.display()));
}
