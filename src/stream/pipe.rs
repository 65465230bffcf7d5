//! Bounded in-process pipe between a producer thread and a reader
//!
//! The producer writes chunks into a bounded channel and blocks when the
//! reader falls behind. It finishes with [`PipeWriter::close`] or
//! [`PipeWriter::close_with_error`]; the error is returned by the reader's
//! next read once the chunks before it are drained. Dropping the reader makes
//! the producer's next write fail with `BrokenPipe`, which lets it stop and
//! release its source.

use crate::core::error::UpdateError;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::{self, Read, Write};
use std::thread;
use tracing::{debug, warn};

/// Default number of in-flight chunks
pub const DEFAULT_CAPACITY: usize = 16;

enum Message {
    Data(Vec<u8>),
    Eof,
    Error(io::Error),
}

/// Create a connected writer/reader pair holding at most `capacity` chunks
pub fn pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        PipeWriter {
            tx: Some(tx),
            disconnected: false,
        },
        PipeReader {
            rx,
            chunk: Vec::new(),
            pos: 0,
            finished: None,
        },
    )
}

/// Run `produce` on a named thread, feeding the returned reader.
///
/// Whatever `produce` returns closes the pipe: `Ok` as end-of-stream, `Err`
/// as the error the reader observes.
pub fn spawn_producer<F>(name: &str, capacity: usize, produce: F) -> PipeReader
where
    F: FnOnce(&mut PipeWriter) -> io::Result<()> + Send + 'static,
{
    let (mut writer, reader) = pipe(capacity);
    let (fallback, fallback_reader) = pipe(1);
    let thread_name = name.to_string();

    let spawned = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            let result = produce(&mut writer);
            match result {
                Ok(()) => writer.close(),
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe && writer.is_disconnected() => {
                    debug!(thread = %thread_name, "reader went away; producer stopped");
                },
                Err(err) => {
                    debug!(thread = %thread_name, error = %err, "producer failed");
                    writer.close_with_error(err);
                },
            }
        });

    match spawned {
        Ok(_) => {
            drop(fallback);
            reader
        },
        Err(err) => {
            warn!(error = %err, "failed to spawn stream producer");
            fallback.close_with_error(err);
            fallback_reader
        },
    }
}

/// Producer end of a pipe
pub struct PipeWriter {
    tx: Option<Sender<Message>>,
    disconnected: bool,
}

impl PipeWriter {
    /// Signal a clean end-of-stream
    pub fn close(mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Message::Eof);
        }
    }

    /// Deliver `err` to the reader after any chunks already queued
    pub fn close_with_error(mut self, err: io::Error) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Message::Error(err));
        }
    }

    /// True once the reader has been dropped
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))?;
        if tx.send(Message::Data(buf.to_vec())).is_err() {
            self.disconnected = true;
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "pipe reader dropped",
            ));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Consumer end of a pipe
pub struct PipeReader {
    rx: Receiver<Message>,
    chunk: Vec<u8>,
    pos: usize,
    finished: Option<Result<(), UpdateError>>,
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.pos < self.chunk.len() {
                let n = buf.len().min(self.chunk.len() - self.pos);
                buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }

            match &self.finished {
                Some(Ok(())) => return Ok(0),
                Some(Err(err)) => return Err(err.replay().into_io()),
                None => {},
            }

            match self.rx.recv() {
                Ok(Message::Data(data)) => {
                    self.chunk = data;
                    self.pos = 0;
                },
                Ok(Message::Eof) => {
                    self.finished = Some(Ok(()));
                },
                Ok(Message::Error(err)) => {
                    let err = UpdateError::from(err);
                    self.finished = Some(Err(err.replay()));
                    return Err(err.into_io());
                },
                Err(_) => {
                    let err = UpdateError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "stream producer exited without closing",
                    ));
                    self.finished = Some(Err(err.replay()));
                    return Err(err.into_io());
                },
            }
        }
    }
}
