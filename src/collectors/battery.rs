use log::debug;
use std::time::{Duration, Instant};
use systemstat::{BatteryLife, Platform, System};

use crate::models::battery::BatteryInfo;
use crate::models::clamp_percent;

/// Battery charge and power source. `None` on hosts without a battery.
pub async fn collect(sys: &System) -> Option<BatteryInfo> {
    let start = Instant::now();
    let result = match sys.battery_life() {
        Ok(life) => {
            let plugged = match sys.on_ac_power() {
                Ok(plugged) => Some(plugged),
                Err(x) => {
                    debug!("AC power state unavailable: {}", x);
                    None
                }
            };
            Some(to_battery_info(&life, plugged))
        }
        Err(x) => {
            debug!("Battery: not available: {}", x);
            None
        }
    };
    debug!("collect battery took: {} ms", start.elapsed().as_millis());
    result
}

fn to_battery_info(life: &BatteryLife, plugged: Option<bool>) -> BatteryInfo {
    BatteryInfo {
        percent: clamp_percent(life.remaining_capacity * 100.0),
        plugged,
        seconds_left: seconds_left(life.remaining_time, plugged),
    }
}

/// Time left only makes sense while discharging.
fn seconds_left(remaining: Duration, plugged: Option<bool>) -> Option<u64> {
    if plugged == Some(true) || remaining.as_secs() == 0 {
        None
    } else {
        Some(remaining.as_secs())
    }
}
