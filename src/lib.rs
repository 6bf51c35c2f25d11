//! # procap
//!
//! **procap** provides a cancellable, observable handle for asynchronous
//! work, a scheduler binding tasks to execution strategies, and a process
//! session that launches an external command while capturing its three
//! standard streams concurrently — with the guarantee that nothing outlives
//! the session.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ProcessSession::start(command)
//!        │
//!        ├── spawn child process (stdin/stdout/stderr piped)
//!        │
//!        ├── capture_write(stdin,  stdin executor,  stdin_fn)
//!        ├── capture_read(stdout,  stdout executor, stdout_fn)
//!        └── capture_read(stderr,  stderr executor, stderr_fn)
//!                 │ each capture:
//!                 ▼
//!        TaskOnce(body) ──► schedule(Immediate, executor) ──► AsyncHandle<()>
//!                                     │
//!                                     ▼
//!                       ┌──────────────────────────────┐
//!                       │ driver (one per handle)      │
//!                       │  - runs activations          │
//!                       │  - observes cancel token     │
//!                       │  - settles handle exactly    │
//!                       │    once (prefer Canceled)    │
//!                       └──────────────────────────────┘
//!
//!   RunningSession::wait()
//!        ├── wait for exit (optional deadline)
//!        └── teardown on every path:
//!              kill child if alive → cancel captures → await all terminal
//! ```
//!
//! ### Handle lifecycle
//! ```text
//! Pending ──► Running ──► Succeeded | Failed | Canceled      (terminal, immutable)
//!    │
//!    └── cancel() before start ──► Canceled, body never runs
//! ```
//!
//! ## Features
//! | Area           | Description                                                   | Key types / functions                      |
//! |----------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Tasks**      | Async, cancelable units with typed outputs.                   | [`Task`], [`TaskFn`], [`TaskOnce`], [`TaskRef`] |
//! | **Handles**    | Observable, cancellable placeholders for eventual outcomes.   | [`AsyncHandle`], [`Outcome`], [`HandleState`]   |
//! | **Scheduling** | Immediate, delayed, fixed-rate, and fixed-delay execution.    | [`schedule`], [`ScheduleSpec`], [`Executor`]    |
//! | **Capture**    | Hand raw stream endpoints to caller logic.                    | [`capture_read`], [`capture_write`], [`capture_lines`] |
//! | **Sessions**   | One child process, three captures, bounded lifetime.          | [`ProcessSession`], [`RunningSession`], [`SessionCommand`] |
//! | **Events**     | Standalone bounded fan-out bus.                               | [`Bus`], [`Subscribe`]                          |
//! | **Errors**     | Typed errors for tasks and sessions.                          | [`TaskError`], [`SessionError`]                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use procap::{Executor, ProcessSession, SessionCommand};
//! use tokio::io::{AsyncBufReadExt, BufReader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), procap::SessionError> {
//!     let exec = Executor::current();
//!     let command = SessionCommand::new("ls").arg("-a").arg("-1");
//!
//!     let status = ProcessSession::new(command, &exec)
//!         .run(
//!             |stdin| async move {
//!                 drop(stdin); // nothing to feed
//!                 Ok(())
//!             },
//!             |stdout| async move {
//!                 let mut lines = BufReader::new(stdout).lines();
//!                 while let Some(line) = lines.next_line().await? {
//!                     println!("{line}");
//!                 }
//!                 Ok(())
//!             },
//!             |stderr| async move {
//!                 let mut lines = BufReader::new(stderr).lines();
//!                 while let Some(line) = lines.next_line().await? {
//!                     eprintln!("{line}");
//!                 }
//!                 Ok(())
//!             },
//!         )
//!         .await?;
//!
//!     assert_eq!(status, "0");
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod events;
mod executor;
mod handles;
mod scheduling;
mod session;
mod tasks;

// ---- Public re-exports ----

pub use capture::{capture_lines, capture_read, capture_write};
pub use error::{SessionError, TaskError};
pub use events::{Bus, Subscribe};
pub use executor::Executor;
pub use handles::{AsyncHandle, HandleState, Outcome};
pub use scheduling::{ScheduleSpec, schedule};
pub use session::{ProcessSession, RunningSession, SessionCommand};
pub use tasks::{Task, TaskFn, TaskOnce, TaskRef};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogWriter;
