//! Object store backed by long-running `git cat-file` processes.

use crate::config::StoreConfig;
use crate::count::Count;
use crate::error::{Error, Result};
use crate::object::ObjectType;
use crate::oid::Oid;
use crate::store::{BatchChannel, ObjectStore};
use crate::tree::Tree;
use std::io::{BufReader, BufWriter};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

type ProcessChannel = BatchChannel<BufWriter<ChildStdin>, BufReader<ChildStdout>>;

/// One store process and the channel to it.
#[derive(Debug)]
struct BatchProcess {
    child: Child,
    channel: ProcessChannel,
}

impl BatchProcess {
    fn spawn(config: &StoreConfig, mode: &str) -> Result<Self> {
        let mut child = Command::new(&config.git)
            .arg("-C")
            .arg(&config.repo)
            .arg("cat-file")
            .arg(mode)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::protocol("Store process has no stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::protocol("Store process has no stdout"))?;

        tracing::debug!(
            pid = child.id(),
            repo = %config.repo.display(),
            mode,
            "spawned store process"
        );

        Ok(Self {
            child,
            channel: BatchChannel::new(BufWriter::new(stdin), BufReader::new(stdout)),
        })
    }
}

impl Drop for BatchProcess {
    fn drop(&mut self) {
        // Requests are synchronous, so there is never anything in flight.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A repository queried through two independent store processes: one
/// answering header-only queries and one returning full payloads.
#[derive(Debug)]
pub struct Repository {
    config: StoreConfig,
    check: BatchProcess,
    batch: BatchProcess,
}

impl Repository {
    /// Start both store processes for the configured repository.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let check = BatchProcess::spawn(&config, "--batch-check")?;
        let batch = BatchProcess::spawn(&config, "--batch")?;
        Ok(Self {
            config,
            check,
            batch,
        })
    }

    /// The configuration this repository was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl ObjectStore for Repository {
    fn read_header(&mut self, oid: &Oid) -> Result<(ObjectType, Count)> {
        self.check.channel.read_header(oid)
    }

    fn read_tree(&mut self, oid: &Oid) -> Result<Tree> {
        self.batch.channel.read_tree(oid)
    }
}
