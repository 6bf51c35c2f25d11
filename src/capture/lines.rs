//! # Line-oriented capture with early stop.
//!
//! [`capture_lines`] reads successive text lines from a byte source and feeds
//! them to caller logic. Returning `false` stops the capture **before the
//! next read** — remaining output is left unread, not merely ignored.
//!
//! Bytes are decoded lossily as UTF-8; invalid sequences degrade to the
//! replacement character instead of failing the capture.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::executor::Executor;
use crate::handles::AsyncHandle;

use super::stream::capture_read;

/// Feeds each line of `reader` to `f` until EOF or until `f` returns `false`.
///
/// The trailing newline (and a preceding `\r`, if any) is stripped before the
/// line reaches `f`. The returned handle settles `Succeeded(())` on EOF or
/// early stop, `Failed` on a read error, `Canceled` if canceled first.
///
/// # Example
/// ```
/// use procap::{capture_lines, Executor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let data: &[u8] = b"one\ntwo\nthree\n";
/// let handle = capture_lines(data, &Executor::current(), |line| line != "two");
/// handle.wait().await;
/// # }
/// ```
pub fn capture_lines<R, F>(reader: R, executor: &Executor, mut f: F) -> AsyncHandle<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    F: FnMut(&str) -> bool + Send + 'static,
{
    capture_read(reader, executor, move |r| async move {
        let mut reader = BufReader::new(r);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).await?;
            if n == 0 {
                return Ok(()); // EOF
            }
            let line = trim_line_ending(&buf);
            if !f(&String::from_utf8_lossy(line)) {
                return Ok(());
            }
        }
    })
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
