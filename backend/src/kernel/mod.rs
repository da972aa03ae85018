//! Event-dispatch substrate that drives the queue → round start → result →
//! round end transitions (spec.md §4.4).
//!
//! `EventMap` is kind-keyed: each `EventKind` owns an ordered bucket of
//! handlers, newest registration first. Dispatch removes a bucket from the
//! map for the duration of the walk (see `Matchmaker::dispatch`) so handlers
//! can freely mutate engine state — including registering further handlers
//! or dispatching nested events — without the borrow checker seeing a
//! container mutably aliasing itself mid-iteration.

pub mod event;
pub mod map;

pub use event::{ClosedRound, Event, EventContext, EventKind, HandlerTag, OriginatingContext};
pub use map::{EventHandler, EventMap, HandlingResult};
