use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

#[derive(Debug)]
pub struct CodyRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl CodyRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// A throwaway project: `.beads/` for the store, `.cody/project/build/` for
/// artifacts, `logs/` for per-run transcripts.
pub struct CodyWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl CodyWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        fs::create_dir_all(root.join(".beads")).expect("beads dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    /// Workspace with `issues.jsonl` already written.
    pub fn with_issues(jsonl: &str) -> Self {
        let workspace = Self::new();
        workspace.write_issues(jsonl);
        workspace
    }

    pub fn issues_path(&self) -> PathBuf {
        self.root.join(".beads").join("issues.jsonl")
    }

    pub fn write_issues(&self, jsonl: &str) {
        fs::write(self.issues_path(), jsonl).expect("write issues");
    }

    pub fn write_project_config(&self, yaml: &str) {
        fs::write(self.root.join(".beads").join("cody-sync.yaml"), yaml).expect("write config");
    }

    pub fn build_root(&self) -> PathBuf {
        self.root.join(".cody").join("project").join("build")
    }

    /// Pre-create a version directory (normally done by version tooling).
    pub fn add_version_dir(&self, version: &str) -> PathBuf {
        let dir = self.build_root().join(version);
        fs::create_dir_all(&dir).expect("version dir");
        dir
    }

    pub fn backlog_path(&self) -> PathBuf {
        self.build_root().join("feature-backlog.md")
    }

    pub fn tasklist_path(&self, version: &str) -> PathBuf {
        self.build_root().join(version).join("tasklist.md")
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
    }
}

pub fn run_cody<I, S>(workspace: &CodyWorkspace, args: I, label: &str) -> CodyRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_cody_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_cody_with_env<I, S, E, K, V>(
    workspace: &CodyWorkspace,
    args: I,
    env_vars: E,
    label: &str,
) -> CodyRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cody-sync"));
    cmd.current_dir(&workspace.root);
    cmd.env_remove("CODY_SYNC_ROOT");
    cmd.env_remove("CODY_SYNC_BUILD_ROOT");
    cmd.env_remove("CODY_SYNC_ISSUES_PATH");
    cmd.args(args);
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "cody_sync=debug");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);

    let start = Instant::now();
    let output = cmd.output().expect("run cody-sync");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let timestamp = SystemTime::now();
    let log_body = format!(
        "label: {label}\nstarted: {:?}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        timestamp,
        duration,
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
        workspace.root.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    CodyRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}

/// JSON error envelope printed on stderr. Log lines may precede it.
pub fn parse_error_envelope(stderr: &str) -> serde_json::Value {
    let start = stderr.find("{\n").unwrap_or_else(|| panic!("no JSON in stderr:\n{stderr}"));
    serde_json::from_str(&stderr[start..]).expect("error envelope")
}
