use notos::background::BackgroundStyle;
use notos::display::{DisplayState, DragState, PointerEvent, SizeTier, Transition, WindowGeometry};
use notos::gpu::{GpuMetric, GpuChain, GpuSource};
use notos::poller::Poller;
use notos::sensors::{CounterSource, IoCounters, LoadSource};
use notos::{Config, Result, WidgetError};
use std::collections::VecDeque;

struct Idle;
impl LoadSource for Idle {
    fn cpu_percent(&mut self) -> f64 { 3.0 }
    fn memory_percent(&mut self) -> f64 { 41.0 }
    fn cpu_temp_c(&mut self) -> Option<f64> { Some(52.4) }
}

struct Ticks(VecDeque<IoCounters>);
impl CounterSource for Ticks {
    fn read(&mut self) -> Result<IoCounters> {
        self.0.pop_front().ok_or_else(|| WidgetError::unsupported("no more ticks"))
    }
}

struct BrokenSmi;
impl GpuSource for BrokenSmi {
    fn name(&self) -> &'static str { "smi" }
    fn query(&mut self, _m: GpuMetric) -> Result<Vec<f64>> { Err(WidgetError::command("exit status 9")) }
}

struct TwoGpus;
impl GpuSource for TwoGpus {
    fn name(&self) -> &'static str { "lib" }
    fn query(&mut self, m: GpuMetric) -> Result<Vec<f64>> {
        Ok(match m { GpuMetric::Utilization => vec![10.0, 30.0], GpuMetric::Temperature => vec![60.0, 71.0] })
    }
}

fn ticks(items: &[(u64, u64)]) -> Box<Ticks> {
    Box::new(Ticks(items.iter().map(|&(a, b)| IoCounters::new(a, b)).collect()))
}

#[test]
fn disk_speed_after_two_ticks() {
    let mut p = Poller::new(
        Box::new(Idle),
        ticks(&[]),
        ticks(&[(1_048_576, 2_097_152), (2_097_152, 3_145_728)]),
        GpuChain::new(vec![]),
    );
    p.tick();
    assert_eq!(p.tick().disk, "R 1.0MB/s W 1.0MB/s");
}

#[test]
fn gpu_falls_back_and_averages_both_metrics() {
    let mut p = Poller::new(Box::new(Idle), ticks(&[]), ticks(&[]), GpuChain::new(vec![Box::new(BrokenSmi), Box::new(TwoGpus)]));
    let r = p.tick().clone();
    assert_eq!(r.gpu, "20%");
    assert_eq!(r.gpu_temp, "66°C");
    assert_eq!(r.cpu_temp, "52°C");
    assert_eq!(r.cpu, "3%");
    assert_eq!(r.mem, "41%");
}

#[test]
fn network_reset_shows_zero_then_recovers() {
    let mut p = Poller::new(Box::new(Idle), ticks(&[(5000, 5000), (100, 6024), (2148, 6024)]), ticks(&[]), GpuChain::new(vec![]));
    p.tick();
    assert_eq!(p.tick().net, "▼0B/s ▲1.0KB/s");
    assert_eq!(p.tick().net, "▼2.0KB/s ▲0B/s");
}

#[test]
fn hover_pin_drag_and_return() {
    let cfg = Config::default();
    let mut geo = WindowGeometry::centered(1920.0, &cfg);
    let mut state = DisplayState::default();

    assert_eq!(state.handle(PointerEvent::Enter, geo.at_origin()), Transition::Resize(SizeTier::Expanded));
    assert_eq!(state.handle(PointerEvent::DoubleClick, geo.at_origin()), Transition::Resize(SizeTier::Full));
    geo.resize(state.tier(), Some(1920.0), &cfg);

    // drag somewhere else
    let drag = DragState::begin(geo.current + egui::vec2(20.0, 20.0), geo.current);
    geo.current = drag.position_for(egui::pos2(400.0, 500.0));
    assert!(!geo.at_origin());

    // leaving keeps the pinned panel, a resize keeps the dragged spot
    assert_eq!(state.handle(PointerEvent::Leave, geo.at_origin()), Transition::None);
    assert_eq!(geo.resize(state.tier(), Some(1920.0), &cfg), egui::pos2(380.0, 480.0));

    // double-click away from home only travels back
    let before = state;
    assert_eq!(state.handle(PointerEvent::DoubleClick, geo.at_origin()), Transition::ReturnToOrigin);
    assert_eq!(state, before);
    geo.current = geo.original;

    assert_eq!(state.handle(PointerEvent::DoubleClick, geo.at_origin()), Transition::Resize(SizeTier::Collapsed));
    assert!(!state.manual_expanded && !state.settings_open);
}

#[test]
fn scrolling_never_escapes_alpha_bounds() {
    let cfg = Config::default();
    let mut bg = BackgroundStyle::new(&cfg);
    for i in 0..100 {
        bg.scroll(if i % 7 < 4 { -120.0 } else { 120.0 }, &cfg);
        assert!(cfg.color_alpha.contains(&bg.color()[3]));
    }
}
