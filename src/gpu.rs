//! GPU utilisation/temperature through an ordered list of sources.
//!
//! `nvidia-smi` is asked first; when it is missing or misbehaves the vendor
//! library is consulted. The first source that returns readings wins and the
//! readings of every GPU are averaged.

use crate::error::{Result, WidgetError};
use crate::format::{celsius_text, mean, percent_text};
use std::process::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpuMetric {
    Utilization,
    Temperature,
}

impl GpuMetric {
    fn smi_field(self) -> &'static str {
        match self {
            GpuMetric::Utilization => "utilization.gpu",
            GpuMetric::Temperature => "temperature.gpu",
        }
    }

    fn render(self, value: f64) -> String {
        match self {
            GpuMetric::Utilization => percent_text(value),
            GpuMetric::Temperature => celsius_text(value),
        }
    }
}

/// One way of asking for a GPU metric.
///
/// `Ok(values)` holds one reading per GPU that reported; an empty vector means
/// no GPU is present. `Err` means the source itself failed.
pub trait GpuSource {
    fn name(&self) -> &'static str;
    fn query(&mut self, metric: GpuMetric) -> Result<Vec<f64>>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum GpuOutcome {
    Reading(f64),
    Unavailable,
    Failed,
}

impl GpuOutcome {
    pub fn text(&self, metric: GpuMetric) -> String {
        match self {
            GpuOutcome::Reading(v) => metric.render(*v),
            GpuOutcome::Unavailable => "N/A".to_string(),
            GpuOutcome::Failed => "Err".to_string(),
        }
    }
}

/// Ordered sources; the outcome of the last one tried decides between "N/A" and "Err".
/// A source whose binary is missing counts as "N/A".
pub struct GpuChain {
    sources: Vec<Box<dyn GpuSource>>,
}

impl GpuChain {
    pub fn new(sources: Vec<Box<dyn GpuSource>>) -> Self { Self { sources } }

    /// `nvidia-smi`, then NVML when built with the `nvidia` feature.
    pub fn system() -> Self {
        #[allow(unused_mut)]
        let mut sources: Vec<Box<dyn GpuSource>> = vec![Box::new(SmiSource::default())];
        #[cfg(feature = "nvidia")]
        sources.push(Box::new(nvgpu::NvmlSource));
        Self::new(sources)
    }

    pub fn sample(&mut self, metric: GpuMetric) -> GpuOutcome {
        let mut outcome = GpuOutcome::Unavailable;
        for src in self.sources.iter_mut() {
            match src.query(metric) {
                Ok(values) => match mean(&values) {
                    Some(avg) => return GpuOutcome::Reading(avg),
                    None => outcome = GpuOutcome::Unavailable,
                },
                // a tool that is not installed means no GPU, not a broken one
                Err(WidgetError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("{} not installed", src.name());
                    outcome = GpuOutcome::Unavailable;
                }
                Err(e) => {
                    log::debug!("{} {:?} query failed: {}", src.name(), metric, e);
                    outcome = GpuOutcome::Failed;
                }
            }
        }
        outcome
    }
}

// ===================== nvidia-smi =====================
pub struct SmiSource {
    program: String,
}

impl Default for SmiSource {
    fn default() -> Self { Self { program: "nvidia-smi".to_string() } }
}

impl SmiSource {
    pub fn with_program<S: Into<String>>(program: S) -> Self { Self { program: program.into() } }
}

impl GpuSource for SmiSource {
    fn name(&self) -> &'static str { "nvidia-smi" }

    fn query(&mut self, metric: GpuMetric) -> Result<Vec<f64>> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("--query-gpu={}", metric.smi_field()))
            .arg("--format=csv,noheader,nounits");
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
        }
        let output = cmd.output()?;
        if !output.status.success() {
            return Err(WidgetError::command(format!("{} exited with {}", self.program, output.status)));
        }
        let values = parse_smi_lines(&String::from_utf8_lossy(&output.stdout))?;
        if values.is_empty() {
            return Err(WidgetError::command(format!("{} printed nothing", self.program)));
        }
        Ok(values)
    }
}

/// One number per non-empty line; any unparsable line rejects the whole output.
pub fn parse_smi_lines(stdout: &str) -> Result<Vec<f64>> {
    stdout.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.parse::<f64>().map_err(|_| WidgetError::parse(l.to_string())))
        .collect()
}

// ===================== Optional NVIDIA library =====================
#[cfg(feature = "nvidia")]
mod nvgpu {
    use super::{GpuMetric, GpuSource};
    use crate::error::Result;
    use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, Nvml};
    use once_cell::sync::Lazy;

    // NVML may only be initialised once per process.
    static NVML: Lazy<Option<Nvml>> = Lazy::new(|| Nvml::init().ok());

    pub struct NvmlSource;

    impl GpuSource for NvmlSource {
        fn name(&self) -> &'static str { "nvml" }

        fn query(&mut self, metric: GpuMetric) -> Result<Vec<f64>> {
            // no driver means no GPUs, not a failure
            let Some(nvml) = NVML.as_ref() else { return Ok(vec![]) };
            let count = nvml.device_count()?;
            let mut out = Vec::with_capacity(count as usize);
            for idx in 0..count {
                let dev = nvml.device_by_index(idx)?;
                match metric {
                    GpuMetric::Utilization => out.push(dev.utilization_rates()?.gpu as f64),
                    GpuMetric::Temperature => {
                        if let Ok(t) = dev.temperature(TemperatureSensor::Gpu) { out.push(t as f64); }
                    }
                }
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(&'static str, Option<Vec<f64>>);

    impl GpuSource for Scripted {
        fn name(&self) -> &'static str { self.0 }
        fn query(&mut self, _metric: GpuMetric) -> Result<Vec<f64>> {
            self.1.clone().ok_or_else(|| WidgetError::command("scripted failure"))
        }
    }

    fn chain(sources: Vec<Scripted>) -> GpuChain {
        GpuChain::new(sources.into_iter().map(|s| Box::new(s) as Box<dyn GpuSource>).collect())
    }

    #[test]
    fn first_success_wins() {
        let mut p = chain(vec![Scripted("a", Some(vec![40.0])), Scripted("b", Some(vec![90.0]))]);
        assert_eq!(p.sample(GpuMetric::Utilization), GpuOutcome::Reading(40.0));
    }

    #[test]
    fn falls_back_after_failure_and_averages() {
        let mut p = chain(vec![Scripted("smi", None), Scripted("lib", Some(vec![20.0, 50.0, 71.0]))]);
        let out = p.sample(GpuMetric::Utilization);
        assert_eq!(out, GpuOutcome::Reading(47.0));
        assert_eq!(out.text(GpuMetric::Utilization), "47%");
    }

    #[test]
    fn empty_list_is_not_available() {
        let mut p = chain(vec![Scripted("smi", None), Scripted("lib", Some(vec![]))]);
        let out = p.sample(GpuMetric::Temperature);
        assert_eq!(out, GpuOutcome::Unavailable);
        assert_eq!(out.text(GpuMetric::Temperature), "N/A");
    }

    #[test]
    fn last_source_failing_is_err() {
        let mut p = chain(vec![Scripted("smi", None), Scripted("lib", None)]);
        assert_eq!(p.sample(GpuMetric::Temperature).text(GpuMetric::Temperature), "Err");
    }

    #[test]
    fn no_sources_means_not_available() {
        assert_eq!(GpuChain::new(vec![]).sample(GpuMetric::Utilization), GpuOutcome::Unavailable);
    }

    #[test]
    fn temperature_renders_in_celsius() {
        assert_eq!(GpuOutcome::Reading(61.4).text(GpuMetric::Temperature), "61°C");
    }

    #[test]
    fn smi_output_parsing() {
        assert_eq!(parse_smi_lines("35\n").unwrap(), vec![35.0]);
        assert_eq!(parse_smi_lines(" 10 \n\n 30\n").unwrap(), vec![10.0, 30.0]);
        assert!(parse_smi_lines("").unwrap().is_empty());
        assert!(matches!(parse_smi_lines("[N/A]\n"), Err(WidgetError::Parse(_))));
    }

    #[test]
    fn missing_binary_is_an_error() {
        let mut smi = SmiSource::with_program("definitely-not-a-real-gpu-tool-3f9a");
        assert!(matches!(smi.query(GpuMetric::Utilization), Err(WidgetError::Io(_))));
    }

    #[test]
    fn missing_tool_alone_reads_not_available() {
        let mut p = GpuChain::new(vec![Box::new(SmiSource::with_program("definitely-not-a-real-gpu-tool-3f9a"))]);
        let out = p.sample(GpuMetric::Utilization);
        assert_eq!(out, GpuOutcome::Unavailable);
        assert_eq!(out.text(GpuMetric::Utilization), "N/A");
        // a tool that runs and fails is still an error
        let mut p = chain(vec![Scripted("smi", None)]);
        assert_eq!(p.sample(GpuMetric::Utilization), GpuOutcome::Failed);
    }
}
