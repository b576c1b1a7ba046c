use crate::error::{Result, WidgetError};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{CpuExt, NetworkExt, NetworksExt, ProcessExt, System, SystemExt};

// ===================== Cumulative counters =====================
/// A pair of monotonically growing byte counters (rx/tx or read/write).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub first: u64,
    pub second: u64,
}

impl IoCounters {
    pub fn new(first: u64, second: u64) -> Self { Self { first, second } }
}

/// Anything that can report cumulative counters on demand.
pub trait CounterSource {
    fn read(&mut self) -> Result<IoCounters>;
}

/// Keeps the previous reading only to turn cumulative counters into per-tick deltas.
#[derive(Default, Debug)]
pub struct RateTracker {
    prev: Option<IoCounters>,
}

impl RateTracker {
    pub fn new() -> Self { Self::default() }

    pub fn primed(start: IoCounters) -> Self { Self { prev: Some(start) } }

    /// Delta since the last call. A counter that went backwards (reset/rollover) yields 0.
    pub fn advance(&mut self, current: IoCounters) -> IoCounters {
        let prev = self.prev.replace(current).unwrap_or(current);
        IoCounters {
            first: current.first.saturating_sub(prev.first),
            second: current.second.saturating_sub(prev.second),
        }
    }
}

/// Received/sent bytes summed over every interface.
pub struct NetworkCounters {
    sys: System,
}

impl NetworkCounters {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_networks_list();
        Self { sys }
    }
}

impl Default for NetworkCounters {
    fn default() -> Self { Self::new() }
}

impl CounterSource for NetworkCounters {
    fn read(&mut self) -> Result<IoCounters> {
        self.sys.refresh_networks();
        let mut out = IoCounters::default();
        for (_name, data) in self.sys.networks().iter() {
            out.first += data.total_received();
            out.second += data.total_transmitted();
        }
        Ok(out)
    }
}

/// Read/written bytes across physical block devices.
///
/// Linux reads `/proc/diskstats`; other platforms accumulate the per-refresh
/// process I/O sysinfo reports into a running total.
pub struct DiskCounters {
    sys: System,
    processes: ProcessIoTotals,
}

impl DiskCounters {
    pub fn new() -> Self { Self { sys: System::new(), processes: ProcessIoTotals::default() } }
}

impl Default for DiskCounters {
    fn default() -> Self { Self::new() }
}

impl CounterSource for DiskCounters {
    fn read(&mut self) -> Result<IoCounters> {
        if cfg!(target_os = "linux") {
            let text = fs::read_to_string("/proc/diskstats")?;
            return parse_diskstats(&text, |dev| Path::new("/sys/block").join(dev).exists());
        }
        self.sys.refresh_processes();
        let per_process = self.sys.processes().iter().map(|(pid, p)| {
            let usage = p.disk_usage();
            (usize::from(*pid), usage.read_bytes, usage.written_bytes)
        });
        Ok(self.processes.accumulate(per_process))
    }
}

/// Monotonic system-wide total built from per-process I/O since the previous refresh.
///
/// A process contributes only once it has been seen on an earlier refresh, so a
/// newly started process never dumps its lifetime I/O into a single tick, and an
/// exited one simply stops adding.
#[derive(Default, Debug)]
pub struct ProcessIoTotals {
    seen: HashSet<usize>,
    total: IoCounters,
}

impl ProcessIoTotals {
    /// `(pid, read_since_last_refresh, written_since_last_refresh)` per live process.
    pub fn accumulate(&mut self, processes: impl IntoIterator<Item = (usize, u64, u64)>) -> IoCounters {
        let mut live = HashSet::new();
        for (pid, read, written) in processes {
            if self.seen.contains(&pid) {
                self.total.first = self.total.first.saturating_add(read);
                self.total.second = self.total.second.saturating_add(written);
            }
            live.insert(pid);
        }
        self.seen = live;
        self.total
    }
}

const SECTOR_BYTES: u64 = 512;

/// Sum sectors read/written (fields 6 and 10) over whole devices accepted by `is_disk`.
pub fn parse_diskstats(text: &str, is_disk: impl Fn(&str) -> bool) -> Result<IoCounters> {
    let mut out = IoCounters::default();
    let mut seen = false;
    for line in text.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 10 { continue; }
        let name = cols[2];
        if ["loop", "ram", "dm-", "zram"].iter().any(|p| name.starts_with(p)) || !is_disk(name) { continue; }
        let read: u64 = cols[5].parse().map_err(|_| WidgetError::parse(line.to_string()))?;
        let written: u64 = cols[9].parse().map_err(|_| WidgetError::parse(line.to_string()))?;
        out.first += read * SECTOR_BYTES;
        out.second += written * SECTOR_BYTES;
        seen = true;
    }
    if !seen { return Err(WidgetError::unsupported("no block devices in /proc/diskstats")); }
    Ok(out)
}

// ===================== Instantaneous load =====================
/// CPU/memory utilisation and the CPU package temperature when one is exposed.
pub trait LoadSource {
    fn cpu_percent(&mut self) -> f64;
    fn memory_percent(&mut self) -> f64;
    fn cpu_temp_c(&mut self) -> Option<f64>;
}

pub struct HostLoad {
    sys: System,
}

impl HostLoad {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();
        Self { sys }
    }
}

impl Default for HostLoad {
    fn default() -> Self { Self::new() }
}

impl LoadSource for HostLoad {
    fn cpu_percent(&mut self) -> f64 {
        self.sys.refresh_cpu();
        self.sys.global_cpu_info().cpu_usage() as f64
    }

    fn memory_percent(&mut self) -> f64 {
        self.sys.refresh_memory();
        let total = self.sys.total_memory() as f64;
        let used = (self.sys.used_memory() as f64).min(total);
        if total > 0.0 { (used / total) * 100.0 } else { 0.0 }
    }

    fn cpu_temp_c(&mut self) -> Option<f64> {
        let readings: Vec<(String, f64)> = CPU_SENSORS.iter()
            .filter_map(|s| read_temp_c(&s.path).map(|t| (s.label.to_lowercase(), t)))
            .collect();
        pick_cpu_temp(&readings)
    }
}

// ===================== hwmon discovery =====================
#[derive(Clone, Debug)]
struct TempSensor { label: String, path: PathBuf }
static CPU_SENSORS: Lazy<Vec<TempSensor>> = Lazy::new(discover_cpu_temps);

fn is_cpu_chip(raw: &str) -> bool {
    let r = raw.to_lowercase();
    r.contains("coretemp") || r.contains("k10temp") || r.contains("zen") || r.contains("cpu")
}

fn discover_cpu_temps() -> Vec<TempSensor> {
    let mut sensors = vec![];
    if let Ok(entries) = fs::read_dir("/sys/class/hwmon") {
        for e in entries.flatten() {
            let base = e.path();
            let name = fs::read_to_string(base.join("name")).unwrap_or_default().trim().to_string();
            if !is_cpu_chip(&name) { continue; }
            if let Ok(files) = fs::read_dir(&base) {
                for f in files.flatten() {
                    let p = f.path(); let fname = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
                    if fname.starts_with("temp") && fname.ends_with("_input") {
                        let mut label = name.clone();
                        let label_path = base.join(fname.replace("_input", "_label"));
                        if let Ok(lbl) = fs::read_to_string(label_path) { let l = lbl.trim(); if !l.is_empty() { label = l.to_string(); } }
                        sensors.push(TempSensor { label, path: p.clone() });
                    }
                }
            }
        }
    }
    log::debug!("found {} CPU temperature sensors", sensors.len());
    sensors
}

fn read_temp_c(path: &Path) -> Option<f64> {
    let v: f64 = fs::read_to_string(path).ok()?.trim().parse().ok()?;
    Some(if v > 1000.0 { v / 1000.0 } else { v })
}

/// Package-level reading if present, otherwise the mean of every CPU sensor.
pub fn pick_cpu_temp(readings: &[(String, f64)]) -> Option<f64> {
    if let Some((_, t)) = readings.iter().find(|(l, _)| l.contains("package") || l.contains("tctl") || l.contains("composite")) {
        return Some(*t);
    }
    let all: Vec<f64> = readings.iter().map(|(_, t)| *t).collect();
    crate::format::mean(&all)
}
