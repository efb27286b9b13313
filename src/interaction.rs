// src/interaction.rs
// Interaction monitoring over a message channel. The host's event glue
// publishes pointer/key/touch events for the life of the page (there is no
// explicit stop); the monitor drains the channel synchronously and derives a
// "looks human" boolean from volume and movement uniformity.

use std::sync::mpsc::{channel, Receiver, Sender};

/// Trip the idle check once this much of the page lifetime has elapsed...
const IDLE_WINDOW_MS: u64 = 2000;
/// ...with fewer than this many total interactions.
const MIN_INTERACTIONS: u64 = 3;
/// Uniformity is only judged with more than this many movement samples.
const MIN_SAMPLES_FOR_UNIFORMITY: usize = 5;
/// Fraction of exactly-repeated consecutive samples that fails the check.
const UNIFORMITY_LIMIT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    PointerMove { x: f64, y: f64, at_ms: u64 },
    PointerDown { at_ms: u64 },
    KeyDown { at_ms: u64 },
    TouchStart { at_ms: u64 },
    TouchMove { at_ms: u64 },
}

/// One velocity/heading pair derived from consecutive pointer positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementSample {
    /// Pixels per millisecond.
    pub velocity: f64,
    /// Radians, `atan2(dy, dx)`.
    pub direction: f64,
}

/// Running aggregate for one page load. Mutated only by draining the event
/// channel; read once at submission time; never persisted.
#[derive(Debug, Clone, Default)]
pub struct InteractionData {
    pub mouse_moves: u64,
    pub mouse_clicks: u64,
    pub key_presses: u64,
    pub touch_events: u64,
    pub last_position: Option<(f64, f64)>,
    pub samples: Vec<MovementSample>,
    pub start_time_ms: u64,
    last_move_at_ms: Option<u64>,
}

impl InteractionData {
    pub fn new(start_time_ms: u64) -> Self {
        InteractionData {
            start_time_ms,
            ..InteractionData::default()
        }
    }

    pub fn total_interactions(&self) -> u64 {
        self.mouse_moves + self.mouse_clicks + self.key_presses + self.touch_events
    }

    fn apply(&mut self, event: InteractionEvent) {
        match event {
            InteractionEvent::PointerMove { x, y, at_ms } => self.record_move(x, y, at_ms),
            InteractionEvent::PointerDown { .. } => self.mouse_clicks += 1,
            InteractionEvent::KeyDown { .. } => self.key_presses += 1,
            InteractionEvent::TouchStart { .. } | InteractionEvent::TouchMove { .. } => {
                self.touch_events += 1
            }
        }
    }

    fn record_move(&mut self, x: f64, y: f64, at_ms: u64) {
        self.mouse_moves += 1;
        if let (Some((px, py)), Some(prev_at)) = (self.last_position, self.last_move_at_ms) {
            let dt = at_ms.saturating_sub(prev_at);
            // dt == 0 would divide by zero; drop the sample, keep the count.
            if dt > 0 {
                let dx = x - px;
                let dy = y - py;
                let distance = (dx * dx + dy * dy).sqrt();
                self.samples.push(MovementSample {
                    velocity: distance / dt as f64,
                    direction: dy.atan2(dx),
                });
            }
        }
        self.last_position = Some((x, y));
        self.last_move_at_ms = Some(at_ms);
    }
}

/// Cloneable send handle, owned by the host event glue.
#[derive(Clone)]
pub struct InteractionPublisher {
    tx: Sender<InteractionEvent>,
}

impl InteractionPublisher {
    /// Publishing never fails from the host's perspective; once the monitor
    /// is gone the event is silently dropped.
    pub fn publish(&self, event: InteractionEvent) {
        let _ = self.tx.send(event);
    }
}

/// Receiving side: drains published events into the aggregate on demand.
pub struct InteractionMonitor {
    rx: Receiver<InteractionEvent>,
    data: InteractionData,
}

impl InteractionMonitor {
    pub fn start(now_ms: u64) -> (InteractionPublisher, InteractionMonitor) {
        let (tx, rx) = channel();
        (
            InteractionPublisher { tx },
            InteractionMonitor {
                rx,
                data: InteractionData::new(now_ms),
            },
        )
    }

    /// Drains every queued event and returns the up-to-date aggregate. All
    /// publishing happens on the page's one thread, so a drain observes
    /// everything published before it.
    pub fn snapshot(&mut self) -> &InteractionData {
        while let Ok(event) = self.rx.try_recv() {
            self.data.apply(event);
        }
        &self.data
    }
}

/// The "looks human" check. Fails when the page sat idle past the window
/// with almost no input, or when movement repeats itself too precisely.
pub fn evaluate(data: &InteractionData, now_ms: u64) -> bool {
    let elapsed = now_ms.saturating_sub(data.start_time_ms);
    if elapsed > IDLE_WINDOW_MS && data.total_interactions() < MIN_INTERACTIONS {
        return false;
    }
    if data.samples.len() > MIN_SAMPLES_FOR_UNIFORMITY {
        // Exact float repeats only: real pointer input essentially never
        // produces identical consecutive velocities or headings.
        let repeats = data
            .samples
            .windows(2)
            .filter(|pair| {
                pair[1].velocity == pair[0].velocity || pair[1].direction == pair[0].direction
            })
            .count();
        let fraction = repeats as f64 / data.samples.len() as f64;
        if fraction > UNIFORMITY_LIMIT {
            return false;
        }
    }
    true
}
