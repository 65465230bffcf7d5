//! Lazy zstd compression over the bounded pipe
//!
//! Each call spawns one producer thread that pulls from the source and pushes
//! into a [`PipeReader`]. Errors from the source keep their original
//! `UpdateError` variant; errors raised by the codec itself surface as
//! `UpdateError::Compression`.

use crate::core::error::UpdateError;
use crate::stream::pipe::{spawn_producer, PipeReader, DEFAULT_CAPACITY};
use std::io::{self, Read};

/// zstd level used for uploads
pub const DEFAULT_LEVEL: i32 = 3;

/// Compress `source` lazily
pub fn compress<R>(source: R) -> PipeReader
where
    R: Read + Send + 'static,
{
    compress_with_level(source, DEFAULT_LEVEL)
}

/// Compress `source` lazily at the given zstd level
pub fn compress_with_level<R>(source: R, level: i32) -> PipeReader
where
    R: Read + Send + 'static,
{
    spawn_producer("selfupdate-compress", DEFAULT_CAPACITY, move |writer| {
        let mut source = TaggedSource(source);
        let mut encoder = zstd::stream::write::Encoder::new(writer, level).map_err(codec_error)?;
        io::copy(&mut source, &mut encoder).map_err(codec_error)?;
        encoder.finish().map_err(codec_error)?;
        Ok(())
    })
}

/// Decompress `source` lazily
pub fn decompress<R>(source: R) -> PipeReader
where
    R: Read + Send + 'static,
{
    spawn_producer("selfupdate-decompress", DEFAULT_CAPACITY, move |writer| {
        let source = TaggedSource(source);
        let mut decoder = zstd::stream::read::Decoder::new(source).map_err(codec_error)?;
        io::copy(&mut decoder, writer).map_err(codec_error)?;
        Ok(())
    })
}

/// Marks source errors so they can be told apart from codec errors
struct TaggedSource<R>(R);

impl<R: Read> Read for TaggedSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).map_err(|err| {
            if carries_update_error(&err) {
                err
            } else {
                io::Error::new(err.kind(), UpdateError::Io(err))
            }
        })
    }
}

fn carries_update_error(err: &io::Error) -> bool {
    err.get_ref()
        .map(|inner| inner.is::<UpdateError>())
        .unwrap_or(false)
}

fn codec_error(err: io::Error) -> io::Error {
    // BrokenPipe means the consumer left; let the pipe treat it as a stop
    if carries_update_error(&err) || err.kind() == io::ErrorKind::BrokenPipe {
        return err;
    }
    UpdateError::compression(err.to_string()).into_io()
}
