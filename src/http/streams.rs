//! Streamed video delivery.
//!
//! The rendered file is sent in bounded chunks so a multi-gigabyte output
//! never sits in memory. The stream owns the render's cleanup guard: when
//! the body is dropped — after the final chunk, or early because the caller
//! disconnected — the guard deletes both temp files.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use bytes::Bytes;
use futures_util::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::core::render::TempFileGuard;

/// Chunked file stream carrying the render's temp-file guard.
pub struct CleanupStream {
    inner: ReaderStream<File>,
    _guard: TempFileGuard,
}

impl CleanupStream {
    pub fn new(file: File, chunk_bytes: usize, guard: TempFileGuard) -> Self {
        Self {
            inner: ReaderStream::with_capacity(file, chunk_bytes),
            _guard: guard,
        }
    }
}

impl Stream for CleanupStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

/// Wraps the rendered file into a response body. Chunks arrive in byte
/// order; a read error mid-stream terminates the body, which drops the
/// guard and cleans up.
pub fn video_stream_body(file: File, chunk_bytes: usize, guard: TempFileGuard) -> Body {
    Body::from_stream(CleanupStream::new(file, chunk_bytes, guard))
}
