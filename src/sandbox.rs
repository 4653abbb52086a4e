//! boundary for the external sandbox executor
//!
//! materializes the working tree onto the host filesystem and runs an
//! entry point inside a container with quotas and a wall-clock budget.
//! the engine core never depends on any of this.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use crate::error::{Error, IoResultExt, Result};
use crate::repo::Repo;

/// container execution settings
#[derive(Clone, Debug)]
pub struct SandboxConfig {
    /// container image
    pub image: String,
    /// explicit command; `None` derives the default from the entry point
    pub command: Option<Vec<String>>,
    /// extra environment variables
    pub env: Vec<(String, String)>,
    /// memory quota in container-runtime syntax, e.g. "512m"
    pub memory_limit: String,
    /// cpu quota, e.g. "1.0"
    pub cpus: String,
    /// wall-clock budget; the container is stopped when it expires
    pub timeout: Duration,
    /// optional host package cache, mounted read-only
    pub package_cache: Option<PathBuf>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            image: "node:20-alpine".to_string(),
            command: None,
            env: vec![],
            memory_limit: "512m".to_string(),
            cpus: "1.0".to_string(),
            timeout: Duration::from_secs(30),
            package_cache: None,
        }
    }
}

/// captured container result
#[derive(Debug)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    /// process exit code, `None` when killed by signal
    pub exit_code: Option<i32>,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// run an entry point from the working tree inside a container
///
/// the tree is materialized into a temporary directory bound read-only
/// into the container. exceeding the wall-clock budget kills the
/// container and fails the call.
pub fn run(repo: &Repo, entry: &str, config: &SandboxConfig) -> Result<RunOutput> {
    let dir = TempDir::new().map_err(|e| Error::Io {
        path: PathBuf::from("<tempdir>"),
        source: e,
    })?;
    materialize(repo, dir.path())?;

    let command = config
        .command
        .clone()
        .unwrap_or_else(|| default_command(entry));

    let mut cmd = Command::new("docker");
    cmd.arg("run")
        .arg("--rm")
        .arg("--network")
        .arg("none")
        .arg("--memory")
        .arg(&config.memory_limit)
        .arg("--cpus")
        .arg(&config.cpus)
        .arg("-v")
        .arg(format!("{}:/workspace:ro", dir.path().display()));
    if let Some(cache) = &config.package_cache {
        cmd.arg("-v")
            .arg(format!("{}:/workspace/node_modules:ro", cache.display()));
    }
    for (key, value) in &config.env {
        cmd.arg("-e").arg(format!("{}={}", key, value));
    }
    cmd.arg("-w").arg("/workspace").arg(&config.image);
    cmd.args(&command);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| Error::SandboxFailed(format!("failed to spawn container runtime: {}", e)))?;

    // drain pipes on threads so a chatty container can't block on a full
    // pipe while we poll
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let deadline = Instant::now() + config.timeout;
    let status = loop {
        match child
            .try_wait()
            .map_err(|e| Error::SandboxFailed(e.to_string()))?
        {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::SandboxTimeout(config.timeout));
            }
            None => std::thread::sleep(Duration::from_millis(50)),
        }
    };

    Ok(RunOutput {
        stdout: join_reader(stdout_reader),
        stderr: join_reader(stderr_reader),
        exit_code: status.code(),
    })
}

/// default command: a `<name>.ts` entry runs its compiled `out/<name>.js`
fn default_command(entry: &str) -> Vec<String> {
    let name = entry.rsplit('/').next().unwrap_or(entry);
    let stem = name.strip_suffix(".ts").unwrap_or(name);
    vec!["node".to_string(), format!("out/{}.js", stem)]
}

/// write every live file under `dir`, creating parent directories
fn materialize(repo: &Repo, dir: &Path) -> Result<()> {
    for file in repo.get_all_files() {
        let rel = repo.worktree.rel_path(&file.path);
        let target = dir.join(&rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }
        fs::write(&target, &file.content).with_path(&target)?;
    }
    Ok(())
}

fn spawn_reader(mut stream: impl Read + Send + 'static) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = stream.read_to_string(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<std::thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
