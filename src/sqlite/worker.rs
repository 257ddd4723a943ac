//! Row streaming for open `SQLite` cursors.
//!
//! rusqlite rows borrow the statement, which borrows the connection, so a
//! lazily consumed result set cannot leave the thread that owns the lock. A
//! dedicated worker holds the lock and hands rows over a rendezvous channel
//! one at a time. Dropping the receiver stops the worker at its next send.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use rusqlite::{Connection, params_from_iter};

use super::lock_connection;
use super::query::extract_row;
use crate::error::SqlAnywhereDbError;
use crate::types::RowValues;

pub(super) enum Frame {
    /// The statement executed and the first row (if any) was fetched.
    Ready(Arc<Vec<String>>),
    Row(Vec<RowValues>),
    Done,
    Failed(SqlAnywhereDbError),
}

pub(super) struct CursorWorker {
    pub(super) frames: Receiver<Frame>,
    pub(super) handle: JoinHandle<()>,
}

impl CursorWorker {
    pub(super) fn spawn(
        conn: Arc<Mutex<Connection>>,
        sql: String,
        params: Vec<rusqlite::types::Value>,
    ) -> Result<Self, SqlAnywhereDbError> {
        let (sender, frames) = mpsc::sync_channel::<Frame>(0);
        let handle = thread::Builder::new()
            .name("sqlite-cursor".into())
            .spawn(move || run_cursor(&conn, &sql, &params, &sender))
            .map_err(|err| {
                SqlAnywhereDbError::ConnectionError(format!(
                    "failed to spawn SQLite cursor thread: {err}"
                ))
            })?;
        tracing::trace!("SQLite cursor thread started");
        Ok(Self { frames, handle })
    }

    /// Stop streaming and wait for the worker to give the connection back.
    pub(super) fn shutdown(self) {
        let Self { frames, handle } = self;
        drop(frames);
        if handle.join().is_err() {
            tracing::error!("SQLite cursor thread panicked");
        } else {
            tracing::trace!("SQLite cursor thread stopped");
        }
    }
}

fn run_cursor(
    conn: &Mutex<Connection>,
    sql: &str,
    params: &[rusqlite::types::Value],
    sender: &SyncSender<Frame>,
) {
    let result =
        lock_connection(conn).and_then(|guard| stream_rows(&guard, sql, params, sender));
    if let Err(err) = result {
        // The receiver may already be gone; nothing else to report to.
        let _ = sender.send(Frame::Failed(err));
    }
}

fn stream_rows(
    conn: &Connection,
    sql: &str,
    params: &[rusqlite::types::Value],
    sender: &SyncSender<Frame>,
) -> Result<(), SqlAnywhereDbError> {
    let mut stmt = conn.prepare_cached(sql)?;
    let columns: Arc<Vec<String>> = Arc::new(
        stmt.column_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    );
    let width = columns.len();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;

    let mut next = rows.next()?.map(|row| extract_row(row, width)).transpose()?;
    if sender.send(Frame::Ready(columns)).is_err() {
        return Ok(());
    }
    while let Some(values) = next {
        if sender.send(Frame::Row(values)).is_err() {
            return Ok(());
        }
        next = rows.next()?.map(|row| extract_row(row, width)).transpose()?;
    }
    let _ = sender.send(Frame::Done);
    Ok(())
}
