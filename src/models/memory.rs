use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub percent: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapMemoryInfo {
    pub total: u64,
    pub used: u64,
    pub percent: f32,
}

impl Default for MemoryInfo {
    fn default() -> Self {
        Self {
            total: 0,
            used: 0,
            available: 0,
            percent: 0.0,
        }
    }
}

impl Default for SwapMemoryInfo {
    fn default() -> Self {
        Self {
            total: 0,
            used: 0,
            percent: 0.0,
        }
    }
}
