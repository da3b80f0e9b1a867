//! Generic plane-sweep driver.
//!
//! A [`SweepHandler`] supplies the algorithm: what an event means and
//! what status it keeps. The [`SweepEngine`] owns the event queue and
//! feeds the handler in sweep order.
use std::fmt::Debug;

use geo::GeoFloat;
use log::trace;

use crate::events::{EventQueue, SweepPoint};

/// Algorithm specific part of a sweep.
pub trait SweepHandler<T: GeoFloat> {
    /// Event payload. Orders the events at one sweep point.
    type Event: Ord + Debug;

    /// Handle one event at `point`. Events pushed to `queue` at
    /// `point` itself are handled before the sweep advances.
    fn handle_event(
        &mut self,
        point: SweepPoint<T>,
        event: Self::Event,
        queue: &mut EventQueue<T, Self::Event>,
    );

    /// Called once after all events at `point` were handled.
    fn complete_point(&mut self, _point: SweepPoint<T>, _queue: &mut EventQueue<T, Self::Event>) {}
}

/// Drives a [`SweepHandler`] over its events.
pub struct SweepEngine<T: GeoFloat, H: SweepHandler<T>> {
    queue: EventQueue<T, H::Event>,
    handler: H,
}

impl<T: GeoFloat, H: SweepHandler<T>> SweepEngine<T, H> {
    pub fn new(handler: H, queue: EventQueue<T, H::Event>) -> Self {
        SweepEngine { queue, handler }
    }

    /// Process the next sweep point. Returns the point, or `None` if
    /// the queue is exhausted.
    pub fn step(&mut self) -> Option<SweepPoint<T>> {
        let point = self.queue.peek_point()?;
        trace!("sweep at {:?}", point);
        while let Some(event) = self.queue.pop_at(point) {
            self.handler.handle_event(point, event, &mut self.queue);
        }
        self.handler.complete_point(point, &mut self.queue);
        Some(point)
    }

    /// Run the sweep to completion and return the handler.
    pub fn run(mut self) -> H {
        while self.step().is_some() {}
        self.handler
    }

    #[inline]
    pub fn handler(&self) -> &H {
        &self.handler
    }
}
