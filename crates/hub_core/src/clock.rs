//! Simulation clock and the time-ordered event queue.
//!
//! Time is held in integer simulation milliseconds. Events are ordered by
//! `(timestamp, sequence)`; the sequence number is handed out by the clock at
//! scheduling time, so two events sharing a timestamp always pop in the order
//! they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

pub const ONE_SEC_MS: u64 = 1000;
pub const ONE_MIN_MS: u64 = 60 * ONE_SEC_MS;
pub const ONE_HOUR_MS: u64 = 60 * ONE_MIN_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new ride request materializes; the next arrival is chained from here.
    Arrival,
    /// A vehicle finishes the round trip for the subject request.
    Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Request(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub sequence: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap on (timestamp, sequence).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being processed. Inserted by the runner before the schedule runs.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_sequence: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule an event at an absolute timestamp. Timestamps in the past are
    /// clamped to `now` so the clock never moves backward.
    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.events.push(Event {
            timestamp: timestamp.max(self.now),
            sequence,
            kind,
            subject,
        });
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now.saturating_add(delay_ms), kind, subject);
    }

    pub fn schedule_in_secs(&mut self, delay_secs: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_in(delay_secs.saturating_mul(ONE_SEC_MS), kind, subject);
    }

    /// Remove the earliest event and advance `now` to its timestamp.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

/// Convert a duration in (fractional) seconds to whole milliseconds.
///
/// Results are clamped to at least one millisecond: a zero-length service or
/// arrival gap would otherwise complete at the instant it was scheduled.
/// Non-finite input maps to `u64::MAX`, i.e. "never".
pub fn secs_to_duration_ms(secs: f64) -> u64 {
    if !secs.is_finite() {
        return u64::MAX;
    }
    let ms = (secs * ONE_SEC_MS as f64).round();
    if ms >= u64::MAX as f64 {
        u64::MAX
    } else {
        (ms as u64).max(1)
    }
}

pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / ONE_SEC_MS as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::Arrival, None);
        clock.schedule_at(5, EventKind::Arrival, None);
        clock.schedule_at(20, EventKind::Arrival, None);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);
        assert_eq!(clock.now(), 10);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn equal_timestamps_pop_in_scheduling_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(7, EventKind::Completion, None);
        clock.schedule_at(7, EventKind::Arrival, None);
        clock.schedule_at(7, EventKind::Completion, None);

        let kinds: Vec<EventKind> = std::iter::from_fn(|| clock.pop_next())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![EventKind::Completion, EventKind::Arrival, EventKind::Completion]
        );
    }

    #[test]
    fn peek_does_not_advance_time() {
        let mut clock = SimulationClock::default();
        clock.schedule_in_secs(3, EventKind::Arrival, None);
        assert_eq!(clock.next_event_time(), Some(3 * ONE_SEC_MS));
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.pending_events(), 1);
    }

    #[test]
    fn past_timestamps_are_clamped_to_now() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(100, EventKind::Arrival, None);
        clock.pop_next();
        clock.schedule_at(40, EventKind::Arrival, None);
        let event = clock.pop_next().expect("event");
        assert_eq!(event.timestamp, 100);
        assert_eq!(clock.now(), 100);
    }

    #[test]
    fn secs_to_duration_rounds_and_clamps() {
        assert_eq!(secs_to_duration_ms(432.000_000_000_1), 432_000);
        assert_eq!(secs_to_duration_ms(0.0), 1);
        assert_eq!(secs_to_duration_ms(0.0004), 1);
        assert_eq!(secs_to_duration_ms(f64::INFINITY), u64::MAX);
        assert_eq!(ms_to_secs(1500), 1.5);
    }
}
