//! Scripted stand-in for the terraform binary.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::RunError;
use crate::runner::{CommandRunner, Invocation, InvocationResult};

#[derive(Debug, Clone)]
pub enum Reply {
    Stdout(String),
    Exit { code: i32, stderr: String },
    /// Succeeds with empty stdout after the delay.
    Slow(Duration),
    Panic,
}

/// Answers by subcommand key: `init`, `apply`, `destroy`, or `output <name>`.
/// Unscripted outputs echo `"<name>-value"`; everything else succeeds.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
    deadlines: Mutex<Vec<Instant>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, key: &str, reply: Reply) -> Self {
        self.replies.insert(key.to_string(), reply);
        self
    }

    pub fn fail(self, key: &str) -> Self {
        self.reply(
            key,
            Reply::Exit {
                code: 1,
                stderr: format!("Error: {key} exploded"),
            },
        )
    }

    pub fn stdout(self, key: &str, stdout: &str) -> Self {
        self.reply(key, Reply::Stdout(stdout.to_string()))
    }

    /// Full command lines in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deadlines(&self) -> Vec<Instant> {
        self.deadlines.lock().unwrap().clone()
    }

    pub fn count(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|line| line.split(' ').nth(1) == Some(subcommand))
            .count()
    }

    fn key(invocation: &Invocation) -> String {
        let args = invocation.arguments();
        match args.first().map(String::as_str) {
            Some("output") => format!("output {}", args.last().map(String::as_str).unwrap_or_default()),
            Some(subcommand) => subcommand.to_string(),
            None => String::new(),
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> InvocationResult {
        self.calls.lock().unwrap().push(invocation.command_line());
        self.deadlines.lock().unwrap().push(invocation.deadline());

        let key = Self::key(invocation);
        let reply = self.replies.get(&key).cloned().unwrap_or_else(|| {
            match key.strip_prefix("output ") {
                Some(name) => Reply::Stdout(format!("\"{name}-value\"\n")),
                None => Reply::Stdout(String::new()),
            }
        });

        match reply {
            Reply::Stdout(stdout) => InvocationResult::success(stdout, ""),
            Reply::Exit { code, stderr } => {
                InvocationResult::failure("", stderr, RunError::Exit { code: Some(code) })
            }
            Reply::Slow(delay) => {
                tokio::time::sleep(delay).await;
                InvocationResult::success("", "")
            }
            Reply::Panic => panic!("scripted panic during {key}"),
        }
    }
}
