use chrono::{DateTime, Utc};

pub type RoundId = i64;

/// One batch of matches formed from one triggering of the queue.
///
/// `end_time` is `None` while the round is in progress; once set it is
/// `>= start_time`. `round_id` strictly increases across rounds formed by
/// the same queue (spec.md §3).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Round {
    pub round_id: RoundId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub participants: i32,
}

impl Round {
    pub fn new(round_id: RoundId, participants: usize, now: DateTime<Utc>) -> Self {
        Self { round_id, start_time: now, end_time: None, participants: participants as i32 }
    }

    pub fn is_in_progress(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn end(&mut self, now: DateTime<Utc>) {
        debug_assert!(now >= self.start_time);
        self.end_time = Some(now);
    }
}
