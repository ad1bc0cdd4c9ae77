//! The planner's SQLite store.
//!
//! One thread owns the connection for the life of the app. Async callers hand
//! it closures and await the result, so the UI thread never blocks on disk.

use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

const IN_MEMORY: &str = ":memory:";

type StoreJob = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum Job {
    Run(StoreJob),
    Close,
}

struct StoreThread {
    jobs: Sender<Job>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreThread {
    fn drop(&mut self) {
        let handle = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return;
        };

        // Jobs queued before Close still run; the thread exits after them.
        if self.jobs.send(Job::Close).is_err() {
            error!("Session store thread already gone at shutdown");
        }
        if let Err(panic) = handle.join() {
            error!("Session store thread panicked: {panic:?}");
        }
    }
}

/// Handle to the session store. Clones share the same store thread, which
/// stops when the last clone is dropped.
#[derive(Clone)]
pub struct Database {
    thread: Arc<StoreThread>,
}

impl Database {
    /// Opens the store file, creating it and its directory if needed, and
    /// brings the schema up to date. `":memory:"` gives a private store.
    pub fn new(db_path: PathBuf) -> Result<Self> {
        let conn = open_store(&db_path)?;
        let (jobs, queue) = mpsc::channel::<Job>();

        let handle = thread::Builder::new()
            .name("trainplan-store".into())
            .spawn(move || serve(conn, queue))
            .context("failed to start the session store thread")?;

        info!("Session store ready at {}", db_path.display());

        Ok(Self {
            thread: Arc::new(StoreThread {
                jobs,
                handle: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Runs `task` on the store thread and waits for its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let job = Job::Run(Box::new(move |conn| {
            // The caller may have been cancelled; nothing to do then
            let _ = reply_tx.send(task(conn));
        }));

        self.thread
            .jobs
            .send(job)
            .map_err(|_| anyhow!("session store is closed"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("session store stopped before answering"))?
    }
}

fn open_store(db_path: &Path) -> Result<Connection> {
    let mut conn = if db_path == Path::new(IN_MEMORY) {
        Connection::open_in_memory().context("failed to open in-memory session store")?
    } else {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }
        Connection::open(db_path)
            .with_context(|| format!("failed to open session store {}", db_path.display()))?
    };

    // Clearing a category must null out sessions, which needs enforced keys
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;

    run_migrations(&mut conn).context("failed to migrate session store")?;
    Ok(conn)
}

fn serve(mut conn: Connection, queue: Receiver<Job>) {
    for job in queue {
        match job {
            Job::Run(task) => task(&mut conn),
            Job::Close => break,
        }
    }
    info!("Session store thread stopped");
}
