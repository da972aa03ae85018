use std::collections::HashMap;
use std::fmt;

use super::event::{Event, EventContext, EventKind, HandlerTag};
use crate::error::MatchmakerError;
use crate::matchmaker::Matchmaker;

pub type HandlingResult = Result<(), MatchmakerError>;

/// A handler reacting to one `EventKind` (spec.md §4.4).
///
/// `is_ready`/`handle` take the engine by reference/mutable-reference
/// rather than the context alone: built-in handlers need to read queue
/// length, in-game completion, and config (`is_ready`), and to mutate
/// queue/games/event-map state and dispatch follow-on events (`handle`).
/// The context still carries everything the spec's informal contract
/// names (origin, player/team/match/round) for handlers that don't need
/// more than that.
pub trait EventHandler: fmt::Debug {
    fn kind(&self) -> EventKind;
    fn tag(&self) -> HandlerTag;
    fn is_ready(&self, engine: &Matchmaker, ctx: &EventContext) -> bool;
    fn handle(&self, engine: &mut Matchmaker, ctx: &EventContext) -> HandlingResult;
    fn requeue(&self) -> bool;
}

/// Kind-keyed handler registry (spec.md §4.4).
#[derive(Default)]
pub struct EventMap {
    buckets: HashMap<EventKind, Vec<Box<dyn EventHandler>>>,
}

impl fmt::Debug for EventMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMap")
            .field("kinds", &self.buckets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends the handler into the bucket for its kind, so it is visited
    /// before every handler already registered for that kind.
    pub fn register(&mut self, handler: Box<dyn EventHandler>) {
        self.buckets.entry(handler.kind()).or_default().insert(0, handler);
    }

    /// Removes a handler by `tag` equality within its kind's bucket.
    pub fn deregister(&mut self, kind: EventKind, tag: &HandlerTag) {
        if let Some(bucket) = self.buckets.get_mut(&kind) {
            bucket.retain(|h| &h.tag() != tag);
        }
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Yields the handlers in `kind`'s bucket whose `is_ready` holds,
    /// newest-first (spec.md §4.4's `poll`).
    pub fn poll<'a>(&'a self, kind: EventKind, engine: &Matchmaker, ctx: &EventContext) -> Vec<&'a dyn EventHandler> {
        self.buckets
            .get(&kind)
            .into_iter()
            .flatten()
            .filter(|h| h.is_ready(engine, ctx))
            .map(|h| h.as_ref())
            .collect()
    }

    fn take_bucket(&mut self, kind: EventKind) -> Vec<Box<dyn EventHandler>> {
        self.buckets.remove(&kind).unwrap_or_default()
    }

    /// Restores `kind`'s bucket after a dispatch, absorbing (in front of
    /// the survivors) anything registered for that kind while the bucket
    /// was taken out.
    fn restore_bucket(&mut self, kind: EventKind, survivors: Vec<Box<dyn EventHandler>>) {
        let mut merged = self.buckets.remove(&kind).unwrap_or_default();
        merged.extend(survivors);
        self.buckets.insert(kind, merged);
    }

    /// Absorbs every bucket of `other` into `self`, with `other`'s entries
    /// (registered more recently) ahead of `self`'s existing ones.
    ///
    /// Used by `Matchmaker::dispatch` to fold registrations and nested
    /// dispatches that happened on the temporarily-emptied live map back
    /// into the bucket this call took ownership of (see that method's
    /// comment for why the map must be emptied at all).
    pub fn merge_from(&mut self, other: &mut EventMap) {
        for (kind, mut handlers) in other.buckets.drain() {
            let existing = self.buckets.entry(kind).or_default();
            handlers.append(existing);
            *existing = handlers;
        }
    }

    /// Dispatches `event` to its kind's bucket: invokes every ready
    /// handler, newest-first, recording the last error. A handler whose
    /// `requeue()` is false, or that errored on this invocation, is
    /// deregistered only after the whole walk completes — so a peer
    /// handler dispatched in the same round never observes the removal
    /// mid-iteration (spec.md §4.4, §8 invariant 10).
    pub fn handle(&mut self, event: Event, engine: &mut Matchmaker) -> Option<MatchmakerError> {
        let kind = event.kind;
        let bucket = self.take_bucket(kind);

        let mut last_err = None;
        let mut remove: Vec<HandlerTag> = Vec::new();

        for handler in &bucket {
            if !handler.is_ready(engine, &event.context) {
                continue;
            }
            let result = handler.handle(engine, &event.context);
            if let Err(ref e) = result {
                last_err = Some(MatchmakerError::HandlingError {
                    handler: handler.tag().to_string(),
                    message: e.to_string(),
                });
            }
            if !handler.requeue() || result.is_err() {
                remove.push(handler.tag());
            }
        }

        let survivors = bucket.into_iter().filter(|h| !remove.contains(&h.tag())).collect();
        self.restore_bucket(kind, survivors);
        last_err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::kernel::event::OriginatingContext;
    use crate::principal::PrincipalKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            database_max_connections: 1,
            base_elo: 1000.0,
            points_per_match: 1.0,
            k_factor: 32.0,
            period_active: 10,
            period_duty_cycle: 2.5,
            trigger_threshold: 10,
            max_history: 0,
            principal: PrincipalKind::MaxSum,
        }
    }

    #[derive(Debug)]
    struct Recorder {
        name: &'static str,
        requeue: bool,
        fails: bool,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl EventHandler for Recorder {
        fn kind(&self) -> EventKind {
            EventKind::Queue
        }
        fn tag(&self) -> HandlerTag {
            HandlerTag::Named(self.name.to_string())
        }
        fn is_ready(&self, _engine: &Matchmaker, _ctx: &EventContext) -> bool {
            true
        }
        fn handle(&self, _engine: &mut Matchmaker, _ctx: &EventContext) -> HandlingResult {
            self.log.borrow_mut().push(self.name);
            if self.fails {
                Err(MatchmakerError::InvalidConfig(self.name.to_string()))
            } else {
                Ok(())
            }
        }
        fn requeue(&self) -> bool {
            self.requeue
        }
    }

    #[test]
    fn handlers_visited_in_reverse_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut map = EventMap::new();
        map.register(Box::new(Recorder { name: "first", requeue: true, fails: false, log: log.clone() }));
        map.register(Box::new(Recorder { name: "second", requeue: true, fails: false, log: log.clone() }));
        map.register(Box::new(Recorder { name: "third", requeue: true, fails: false, log: log.clone() }));

        let mut mm = Matchmaker::new(test_config());
        let event = Event::new(EventKind::Queue, EventContext::new(OriginatingContext::Queue));
        let err = map.handle(event, &mut mm);

        assert!(err.is_none());
        assert_eq!(*log.borrow(), vec!["third", "second", "first"]);
    }

    #[test]
    fn errors_do_not_stop_later_handlers_and_last_error_wins() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut map = EventMap::new();
        map.register(Box::new(Recorder { name: "a", requeue: true, fails: true, log: log.clone() }));
        map.register(Box::new(Recorder { name: "b", requeue: true, fails: false, log: log.clone() }));

        let mut mm = Matchmaker::new(test_config());
        let event = Event::new(EventKind::Queue, EventContext::new(OriginatingContext::Queue));
        let err = map.handle(event, &mut mm);

        assert_eq!(*log.borrow(), vec!["b", "a"], "both handlers ran despite a's error");
        match err.unwrap() {
            MatchmakerError::HandlingError { handler, .. } => assert_eq!(handler, "a"),
            other => panic!("expected HandlingError wrapping a's failure, got {other:?}"),
        }
    }

    #[test]
    fn non_requeueable_and_errored_handlers_are_removed_after_the_walk() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut map = EventMap::new();
        map.register(Box::new(Recorder { name: "one-shot", requeue: false, fails: false, log: log.clone() }));
        map.register(Box::new(Recorder { name: "erroring", requeue: true, fails: true, log: log.clone() }));
        map.register(Box::new(Recorder { name: "stays", requeue: true, fails: false, log: log.clone() }));

        let mut mm = Matchmaker::new(test_config());
        let event = Event::new(EventKind::Queue, EventContext::new(OriginatingContext::Queue));
        map.handle(event, &mut mm);
        assert_eq!(*log.borrow(), vec!["stays", "erroring", "one-shot"]);

        log.borrow_mut().clear();
        let event = Event::new(EventKind::Queue, EventContext::new(OriginatingContext::Queue));
        map.handle(event, &mut mm);
        assert_eq!(*log.borrow(), vec!["stays"], "one-shot and erroring handlers were deregistered");
    }
}
