//! # regc-state — History Navigation and State Requests
//!
//! The middle layer of the registry engine, built on the `regc-store`
//! transaction capability:
//!
//! - **`history`** — read-only navigation of the append-only version
//!   chain (`previous_of`, `next_of`, `record_at`) and the point-in-time
//!   state view (`states_at`). Chain corruption (two records claiming the
//!   same successor) surfaces as the fatal `AmbiguousChain` error.
//! - **`request`** — `create`: validate and insert one or more
//!   co-starting state intervals, enforcing the no-overlap invariant
//!   under the object advisory lock. All-or-nothing across the whole
//!   state set.
//! - **`cancel`** — `cancel` (generic: silent no-op when nothing
//!   matches) and `cancel_admin` (administrative: missing states are an
//!   error). The asymmetry is deliberate; administrative callers expect
//!   their target state to exist.
//!
//! Every operation takes the caller's transaction — this crate never
//! begins or commits one.

pub mod cancel;
pub mod history;
pub mod request;

pub use request::CreateRequest;
