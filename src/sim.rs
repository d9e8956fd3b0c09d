//! Simulated TIMER peripheral and interrupt controller for host tests

use core::sync::atomic::{AtomicUsize, Ordering};
use std::boxed::Box;
use std::sync::{Mutex, MutexGuard};
use std::vec::Vec;

use crate::interrupt::{Interrupt, InterruptController};
use crate::registers::{Bitmode, Mode, TimerPeripheral, CC_NUM};
use crate::timer::Timers;

/// Register access recorded by [`SimTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Start,
    Stop,
    Shutdown,
    Clear,
    Capture(u8),
    ReadCompare(u8),
    SetCompare(u8, u32),
    ReadEvent(u8),
    ClearEvent(u8),
    IntEnSet(u8),
    IntEnClr(u8),
    ShortSet(u8),
    ShortClr(u8),
    Mode(Mode),
    Bitmode(Bitmode),
    Prescaler(u8),
    Power(bool),
}

struct State {
    running: bool,
    powered: bool,
    counter: u32,
    bitmode: Bitmode,
    cc: [u32; CC_NUM],
    events: [bool; CC_NUM],
    inten: [bool; CC_NUM],
    shorts: [bool; CC_NUM],
}

/// TIMER model clocked by hand
///
/// Tasks take effect immediately. Every [`tick`](Self::tick) of a running
/// timer increments the counter, wraps it at the configured bit width and
/// raises the compare events of matching CC registers, applying COMPAREn to
/// CLEAR shortcuts after the match.
pub struct SimTimer {
    state: Mutex<State>,
    ops: Mutex<Vec<Op>>,
    cc_num: u8,
}

impl SimTimer {
    /// Stopped timer in its reset state
    pub const fn new() -> Self {
        Self::with_cc_num(CC_NUM as u8)
    }

    /// Timer implementing only the first `cc_num` capture/compare registers
    pub const fn with_cc_num(cc_num: u8) -> Self {
        SimTimer {
            state: Mutex::new(State {
                running: false,
                powered: false,
                counter: 0,
                bitmode: Bitmode::_16Bit,
                cc: [0; CC_NUM],
                events: [false; CC_NUM],
                inten: [false; CC_NUM],
                shorts: [false; CC_NUM],
            }),
            ops: Mutex::new(Vec::new()),
            cc_num,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn log(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }

    /// One prescaled clock cycle
    pub fn tick(&self) {
        let mut s = self.state();
        if !s.running {
            return;
        }

        s.counter = s.counter.wrapping_add(1) & s.bitmode.mask();

        let mut clear = false;
        for ch in 0..CC_NUM {
            if s.cc[ch] == s.counter {
                s.events[ch] = true;
                clear |= s.shorts[ch];
            }
        }
        if clear {
            s.counter = 0;
        }
    }

    pub fn advance(&self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Sets the compare event of `channel` as if the hardware had matched
    pub fn raise(&self, channel: u8) {
        self.state().events[usize::from(channel)] = true;
    }

    /// Returns `true` if an enabled compare event is set
    pub fn irq_pending(&self) -> bool {
        let s = self.state();
        (0..CC_NUM).any(|ch| s.events[ch] && s.inten[ch])
    }

    /// Register accesses since the last call
    pub fn take_ops(&self) -> Vec<Op> {
        core::mem::take(&mut *self.ops.lock().unwrap())
    }

    pub fn running(&self) -> bool {
        self.state().running
    }

    pub fn powered(&self) -> bool {
        self.state().powered
    }

    pub fn counter(&self) -> u32 {
        self.state().counter
    }

    pub fn event(&self, channel: u8) -> bool {
        self.state().events[usize::from(channel)]
    }

    pub fn interrupt_enabled(&self, channel: u8) -> bool {
        self.state().inten[usize::from(channel)]
    }

    pub fn clear_on_compare(&self, channel: u8) -> bool {
        self.state().shorts[usize::from(channel)]
    }

    /// CC register content, without recording a read
    pub fn compare_value_of(&self, channel: u8) -> u32 {
        self.state().cc[usize::from(channel)]
    }
}

impl TimerPeripheral for SimTimer {
    fn cc_num(&self) -> u8 {
        self.cc_num
    }

    fn start(&self) {
        self.log(Op::Start);
        self.state().running = true;
    }

    fn stop(&self) {
        self.log(Op::Stop);
        self.state().running = false;
    }

    fn shutdown(&self) {
        self.log(Op::Shutdown);
        self.state().running = false;
    }

    fn clear(&self) {
        self.log(Op::Clear);
        self.state().counter = 0;
    }

    fn capture(&self, channel: u8) {
        self.log(Op::Capture(channel));
        let mut s = self.state();
        s.cc[usize::from(channel)] = s.counter;
    }

    fn compare_value(&self, channel: u8) -> u32 {
        self.log(Op::ReadCompare(channel));
        self.state().cc[usize::from(channel)]
    }

    fn set_compare_value(&self, channel: u8, value: u32) {
        self.log(Op::SetCompare(channel, value));
        let mut s = self.state();
        let mask = s.bitmode.mask();
        s.cc[usize::from(channel)] = value & mask;
    }

    fn compare_event(&self, channel: u8) -> bool {
        self.log(Op::ReadEvent(channel));
        self.state().events[usize::from(channel)]
    }

    fn clear_compare_event(&self, channel: u8) {
        self.log(Op::ClearEvent(channel));
        self.state().events[usize::from(channel)] = false;
    }

    fn enable_compare_interrupt(&self, channel: u8) {
        self.log(Op::IntEnSet(channel));
        self.state().inten[usize::from(channel)] = true;
    }

    fn disable_compare_interrupt(&self, channel: u8) {
        self.log(Op::IntEnClr(channel));
        self.state().inten[usize::from(channel)] = false;
    }

    fn enable_clear_on_compare(&self, channel: u8) {
        self.log(Op::ShortSet(channel));
        self.state().shorts[usize::from(channel)] = true;
    }

    fn disable_clear_on_compare(&self, channel: u8) {
        self.log(Op::ShortClr(channel));
        self.state().shorts[usize::from(channel)] = false;
    }

    fn set_mode(&self, mode: Mode) {
        self.log(Op::Mode(mode));
    }

    fn set_bitmode(&self, bitmode: Bitmode) {
        self.log(Op::Bitmode(bitmode));
        self.state().bitmode = bitmode;
    }

    fn set_prescaler(&self, prescaler: u8) {
        self.log(Op::Prescaler(prescaler));
    }

    fn set_power(&self, on: bool) {
        self.log(Op::Power(on));
        self.state().powered = on;
    }
}

/// Interrupt controller that records what the driver asks of it
pub struct MockIc {
    unmasked: Mutex<Vec<Interrupt>>,
    eoi: AtomicUsize,
}

impl MockIc {
    pub const fn new() -> Self {
        MockIc {
            unmasked: Mutex::new(Vec::new()),
            eoi: AtomicUsize::new(0),
        }
    }

    pub fn unmasked(&self) -> Vec<Interrupt> {
        self.unmasked.lock().unwrap().clone()
    }

    pub fn end_of_interrupts(&self) -> usize {
        self.eoi.load(Ordering::SeqCst)
    }
}

impl InterruptController for MockIc {
    fn unmask(&self, interrupt: Interrupt) {
        self.unmasked.lock().unwrap().push(interrupt);
    }

    fn end_of_interrupt(&self) {
        self.eoi.fetch_add(1, Ordering::SeqCst);
    }
}

/// Channels reported to [`record`], in callback order
pub struct Hits(Mutex<Vec<u8>>);

impl Hits {
    pub const fn new() -> Self {
        Hits(Mutex::new(Vec::new()))
    }

    pub fn channels(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

/// Callback that records the channel into `hits`
pub fn record(hits: &'static Hits, channel: u8) {
    hits.0.lock().unwrap().push(channel);
}

pub type SimTimers<const N: usize> = Timers<&'static SimTimer, &'static MockIc, &'static Hits, N>;

pub fn leak<T: 'static>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

/// Clocks `sim` for `ticks` cycles, dispatching whenever its interrupt is
/// pending, and returns the `(tick, channel)` pairs of the callbacks that ran
pub fn run<const N: usize>(
    timers: &SimTimers<N>,
    sim: &SimTimer,
    hits: &Hits,
    tim: usize,
    ticks: usize,
) -> Vec<(usize, u8)> {
    let mut fired = Vec::new();
    for tick in 0..ticks {
        sim.tick();
        if sim.irq_pending() {
            let before = hits.channels().len();
            timers.on_interrupt(tim);
            fired.extend(hits.channels()[before..].iter().map(|&ch| (tick, ch)));
        }
    }
    fired
}
