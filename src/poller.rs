use crate::format::{celsius_text, disk_text, network_text, percent_text};
use crate::gpu::{GpuMetric, GpuOutcome, GpuChain};
use crate::sensors::{CounterSource, DiskCounters, HostLoad, IoCounters, LoadSource, NetworkCounters, RateTracker};

/// Text currently shown in each label (without the row prefixes).
#[derive(Clone, Debug, PartialEq)]
pub struct Readings {
    pub net: String,
    pub cpu: String,
    pub mem: String,
    pub gpu: String,
    pub gpu_temp: String,
    pub cpu_temp: String,
    pub disk: String,
}

impl Default for Readings {
    fn default() -> Self {
        Self {
            net: network_text(0, 0),
            cpu: "0%".into(),
            mem: "0%".into(),
            gpu: "0%".into(),
            gpu_temp: "N/A".into(),
            cpu_temp: "N/A".into(),
            disk: disk_text(0, 0),
        }
    }
}

/// Raw values of the latest tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricSnapshot {
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub cpu_temp: Option<f64>,
    pub gpu_load: Option<GpuOutcome>,
    pub gpu_temp: Option<GpuOutcome>,
    pub net: Option<IoCounters>,
    pub disk: Option<IoCounters>,
}

/// Polls every source once per tick and keeps the label texts current.
pub struct Poller {
    load: Box<dyn LoadSource>,
    net: Box<dyn CounterSource>,
    disk: Box<dyn CounterSource>,
    gpu: GpuChain,
    net_rate: RateTracker,
    disk_rate: RateTracker,
    snapshot: MetricSnapshot,
    readings: Readings,
}

impl Poller {
    pub fn new(load: Box<dyn LoadSource>, net: Box<dyn CounterSource>, disk: Box<dyn CounterSource>, gpu: GpuChain) -> Self {
        Self {
            load,
            net,
            disk,
            gpu,
            net_rate: RateTracker::new(),
            disk_rate: RateTracker::new(),
            snapshot: MetricSnapshot::default(),
            readings: Readings::default(),
        }
    }

    pub fn system() -> Self {
        let mut p = Self::new(Box::new(HostLoad::new()), Box::new(NetworkCounters::new()), Box::new(DiskCounters::new()), GpuChain::system());
        // startup baseline, like the first reading taken before the timer starts
        if let Ok(c) = p.net.read() { p.net_rate = RateTracker::primed(c); }
        if let Ok(c) = p.disk.read() { p.disk_rate = RateTracker::primed(c); }
        p
    }

    pub fn readings(&self) -> &Readings { &self.readings }

    pub fn snapshot(&self) -> &MetricSnapshot { &self.snapshot }

    pub fn tick(&mut self) -> &Readings {
        match self.net.read() {
            Ok(c) => {
                let d = self.net_rate.advance(c);
                self.readings.net = network_text(d.first, d.second);
                self.snapshot.net = Some(c);
            }
            Err(e) => log::debug!("network counters unavailable: {}", e),
        }

        let cpu = self.load.cpu_percent();
        self.readings.cpu = percent_text(cpu);
        self.snapshot.cpu_pct = cpu;

        let mem = self.load.memory_percent();
        self.readings.mem = percent_text(mem);
        self.snapshot.mem_pct = mem;

        let gpu = self.gpu.sample(GpuMetric::Utilization);
        self.readings.gpu = gpu.text(GpuMetric::Utilization);
        self.snapshot.gpu_load = Some(gpu);

        let gpu_temp = self.gpu.sample(GpuMetric::Temperature);
        self.readings.gpu_temp = gpu_temp.text(GpuMetric::Temperature);
        self.snapshot.gpu_temp = Some(gpu_temp);

        self.snapshot.cpu_temp = self.load.cpu_temp_c();
        self.readings.cpu_temp = self.snapshot.cpu_temp.map(celsius_text).unwrap_or_else(|| "N/A".into());

        match self.disk.read() {
            Ok(c) => {
                let d = self.disk_rate.advance(c);
                self.readings.disk = disk_text(d.first, d.second);
                self.snapshot.disk = Some(c);
            }
            Err(e) => log::debug!("disk counters unavailable: {}", e),
        }

        &self.readings
    }
}
