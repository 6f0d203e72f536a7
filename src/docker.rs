use crate::errors::{Error, Result};
use crate::logging::{LogTarget, Logger};
use std::process::Command;
use std::time::{Duration, Instant};

const NEO4J_CONTAINER: &str = "autosched-neo4j";
const CHROMA_CONTAINER: &str = "autosched-chromadb";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(90);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Bring up the database containers with docker compose and wait for
/// their health checks. Failures are soft: the caller falls back to
/// in-memory stores either way.
pub fn ensure_services(logger: &Logger) -> Result<()> {
    compose_available()?;

    logger.info("Starting database containers...", LogTarget::ConsoleAndFile);
    let output = Command::new("docker")
        .args(["compose", "up", "-d"])
        .output()
        .map_err(|e| Error::store(format!("Failed to run docker compose: {e}")))?;
    if !output.status.success() {
        return Err(Error::store(format!(
            "docker compose up failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    for container in [NEO4J_CONTAINER, CHROMA_CONTAINER] {
        wait_for_health(container, logger)?;
    }
    Ok(())
}

fn compose_available() -> Result<()> {
    let output = Command::new("docker")
        .args(["compose", "version"])
        .output()
        .map_err(|e| Error::store(format!("docker is not available: {e}")))?;
    if !output.status.success() {
        return Err(Error::store(
            "docker compose is not available; install Docker or set AUTO_START_SERVICES=False.",
        ));
    }
    Ok(())
}

fn wait_for_health(container: &str, logger: &Logger) -> Result<()> {
    let started = Instant::now();
    loop {
        match inspect_health(container)? {
            HealthState::Healthy => {
                logger.info(format!("{container} is healthy."), LogTarget::FileOnly);
                return Ok(());
            }
            // No healthcheck configured counts as up once running.
            HealthState::NoHealthCheck => return Ok(()),
            HealthState::Pending(state) => {
                if started.elapsed() > HEALTH_TIMEOUT {
                    return Err(Error::store(format!(
                        "Timed out waiting for {container} to become healthy (last state: {state})."
                    )));
                }
                std::thread::sleep(HEALTH_POLL_INTERVAL);
            }
        }
    }
}

enum HealthState {
    Healthy,
    NoHealthCheck,
    Pending(String),
}

fn inspect_health(container: &str) -> Result<HealthState> {
    let output = Command::new("docker")
        .args([
            "inspect",
            "--format",
            "{{if .State.Health}}{{.State.Health.Status}}{{else}}{{.State.Status}}{{end}}",
            container,
        ])
        .output()
        .map_err(|e| Error::store(format!("Failed to inspect {container}: {e}")))?;
    if !output.status.success() {
        return Err(Error::store(format!(
            "Container {container} not found: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    let state = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(match state.as_str() {
        "healthy" => HealthState::Healthy,
        "running" => HealthState::NoHealthCheck,
        _ => HealthState::Pending(state),
    })
}
