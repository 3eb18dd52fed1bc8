use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CpuInfo {
    /// Aggregate utilisation over the sampling window, 0-100.
    pub percent: f32,
    pub per_core: Vec<f32>,
    pub frequency_mhz: Option<u64>,
    pub temperature_celsius: Option<f32>,
    pub logical_cores: usize,
    pub physical_cores: Option<usize>,
}

impl Default for CpuInfo {
    fn default() -> Self {
        Self {
            percent: 0.0,
            per_core: Vec::new(),
            frequency_mhz: None,
            temperature_celsius: None,
            logical_cores: 0,
            physical_cores: None,
        }
    }
}
