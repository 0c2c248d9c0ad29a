//! CONTEXT: Recording host doubles for the board capabilities
//! OWNERS: @port-team
//!
//! Every double appends to a shared event log so a test can assert the order
//! in which the boot sequence touched the hardware.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use keel::hal::{ClockFreqs, ClockTree, Direction, LineSettings, Status, TickTimer, Usart};
use keel::{Collector, HeapRegion, Platform, RootRange, Runtime, Wait};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    ClockConfigured,
    TickPriority(u8),
    TickStarted(u32),
    UsartClocks,
    UsartPins,
    LineSet(LineSettings),
    UsartEnabled(Direction),
    LineChangedMidByte,
    Tx(u8),
    HeapRegistered(usize),
    RootsMarked { low: usize, high: usize },
    EntryPoint,
}

impl Event {
    /// Boot steps, as opposed to console traffic.
    pub fn is_step(&self) -> bool {
        !matches!(self, Event::Tx(_))
    }
}

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<Event> {
        self.events().into_iter().filter(Event::is_step).collect()
    }

    pub fn sent(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Tx(byte) => Some(byte),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|event| pred(event)).count()
    }
}

pub struct MockClock {
    pub log: EventLog,
    pub core_hz: u32,
}

impl ClockTree for MockClock {
    fn configure(&mut self) -> ClockFreqs {
        self.log.push(Event::ClockConfigured);
        ClockFreqs::uniform(self.core_hz)
    }
}

pub struct MockTick {
    pub log: EventLog,
}

impl TickTimer for MockTick {
    const MAX_RELOAD: u32 = 0x00ff_ffff;

    fn set_priority(&mut self, priority: u8) {
        self.log.push(Event::TickPriority(priority));
    }

    fn start(&mut self, reload: u32) {
        self.log.push(Event::TickStarted(reload));
    }
}

/// USART whose transmitter takes `shift_polls` status reads to drain a byte.
pub struct MockUsart {
    pub log: EventLog,
    pub rx: VecDeque<u8>,
    pub shift_polls: u32,
    /// Transmit register never empties.
    pub stalled: bool,
    in_flight: Cell<u32>,
}

impl MockUsart {
    pub fn new(log: EventLog) -> Self {
        Self { log, rx: VecDeque::new(), shift_polls: 0, stalled: false, in_flight: Cell::new(0) }
    }

    pub fn with_input(mut self, input: &[u8]) -> Self {
        self.rx.extend(input);
        self
    }

    pub fn transmitting(&self) -> bool {
        self.in_flight.get() > 0
    }
}

impl Usart for MockUsart {
    fn enable_clocks(&mut self) {
        self.log.push(Event::UsartClocks);
    }

    fn route_pins(&mut self) {
        self.log.push(Event::UsartPins);
    }

    fn set_line(&mut self, settings: &LineSettings) {
        if self.transmitting() {
            self.log.push(Event::LineChangedMidByte);
        }
        self.log.push(Event::LineSet(*settings));
    }

    fn enable(&mut self, direction: Direction) {
        self.log.push(Event::UsartEnabled(direction));
    }

    fn status(&self) -> Status {
        if self.stalled {
            return Status::empty();
        }
        let mut status = Status::TBE;
        match self.in_flight.get() {
            0 => status |= Status::TC,
            left => self.in_flight.set(left - 1),
        }
        status.set(Status::RBNE, !self.rx.is_empty());
        status
    }

    fn write_data(&mut self, byte: u8) {
        self.log.push(Event::Tx(byte));
        self.in_flight.set(self.shift_polls);
    }

    fn read_data(&mut self) -> u8 {
        self.rx.pop_front().unwrap_or(0)
    }
}

/// Runtime double: records the collector hand-off, scans roots once, then
/// unwinds out of `boot` so the test can inspect the log.
pub struct EntryRecorder {
    pub log: EventLog,
}

pub const ENTRY_REACHED: &str = "runtime entry point reached";

impl Collector for EntryRecorder {
    fn register_heap(&mut self, heap: HeapRegion) {
        self.log.push(Event::HeapRegistered(heap.len()));
    }

    fn mark_roots(&mut self, roots: RootRange) {
        self.log.push(Event::RootsMarked { low: roots.low(), high: roots.high() });
    }
}

impl Runtime for EntryRecorder {
    fn run<U: Usart, W: Wait + Clone>(&mut self, platform: &'static Platform<U, W>) {
        self.log.push(Event::EntryPoint);
        platform.collect_roots(self).unwrap();
        panic!("{}", ENTRY_REACHED);
    }
}

/// Marks roots into a plain list.
#[derive(Default)]
pub struct RootRecorder {
    pub ranges: Vec<RootRange>,
}

impl Collector for RootRecorder {
    fn register_heap(&mut self, _heap: HeapRegion) {}

    fn mark_roots(&mut self, roots: RootRange) {
        self.ranges.push(roots);
    }
}
