//! Request replay against two hosts
//!
//! The [`Dispatcher`] replays recorded rows against a "before" and an
//! "after" host and hands each completed pair of responses to a
//! [`ResponseHandler`](apicmp_core::ResponseHandler).
//!
//! # Architecture
//!
//! ```text
//!   rows ──► chunk 0 ──► chunk 1 ──► ... ──► chunk n      (sequential)
//!               │
//!     ┌─────────┼─────────┐
//!     ▼         ▼         ▼                               (≤ threads rows)
//!   row a     row b     row c
//!   ┌─┴─┐     ┌─┴─┐     ┌─┴─┐
//!   B   A     B   A     B   A                             (both hosts at once)
//!     │         │         │
//!     └─────────┴─────────┴──► handler (one call at a time)
//! ```
//!
//! Retries are fixed-backoff and capped; cancellation goes through a shared
//! [`CancelToken`] that every in-flight request watches.

mod cancel;
mod chunk;
mod dispatcher;
mod error;
mod request;
mod retry;
mod transport;

pub use cancel::CancelToken;
pub use chunk::chunk_ranges;
pub use dispatcher::{Dispatcher, DispatcherConfig, RunOutcome, RunState};
pub use error::{DispatchError, DispatchResult};
pub use request::{validate_header, KnownHeaders, RequestFactory, DEFAULT_KNOWN_HEADERS};
pub use retry::{RetryPolicy, DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS};
pub use transport::{HttpResponse, HttpTransport, Transport, TransportError};
