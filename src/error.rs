use thiserror::Error;

use crate::terraform::Step;

/// Why a single external command did not succeed.
///
/// The driver treats every variant as the same failure; the variants only
/// exist so a caller can tell a missing binary from a timeout when reading
/// diagnostics.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("exited with {}", exit_label(.code))]
    Exit { code: Option<i32> },

    #[error("deadline exceeded, process killed")]
    DeadlineExceeded,
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Fatal lifecycle failures. Destroy failures never end up here; they are
/// logged and recorded in the report instead.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("terraform {step} failed: {source}\ncommand: {command}\nstdout: {stdout}\nstderr: {stderr}")]
    Step {
        step: Step,
        command: String,
        stdout: String,
        stderr: String,
        #[source]
        source: RunError,
    },

    #[error("failed to parse {name} output: {source}\noutput: {output}")]
    Decode {
        name: String,
        output: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected non-empty value for output {name}, got empty string")]
    EmptyOutput { name: String },

    #[error("provisioning task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),

    #[error("configuration error: {0}")]
    Config(String),
}
