use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BatteryInfo {
    pub percent: f32,
    pub plugged: Option<bool>,
    pub seconds_left: Option<u64>,
}

impl BatteryInfo {
    /// Charging or on mains power. Unknown counts as discharging.
    pub fn is_plugged(&self) -> bool {
        self.plugged.unwrap_or(false)
    }
}
