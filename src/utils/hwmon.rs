use log::debug;
use std::fs::{read_dir, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One `tempN_input` reading from a hwmon folder.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub id: u32,
    pub path: PathBuf,
    pub name: String,
    pub label: String,
    pub temperature: f32,
}

/// First positive temperature found under `root` (usually `/sys/class/hwmon`).
///
/// Folders are visited in name order and sensors by their index, so the result
/// is stable between calls.
pub fn first_temperature(root: &Path) -> Option<f32> {
    let mut folders: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .collect();
    folders.sort();

    for folder in folders {
        let mut sensors = Vec::new();
        if from_hwmon(&mut sensors, &folder).is_none() {
            continue;
        }
        sensors.sort_by_key(|sensor| sensor.id);
        if let Some(sensor) = sensors.iter().find(|sensor| sensor.temperature > 0.0) {
            debug!(
                "Using hwmon sensor {} {} at {}",
                sensor.name,
                sensor.label,
                sensor.path.display()
            );
            return Some(sensor.temperature);
        }
    }
    None
}

/// Read out `hwmon` info (hardware monitor) from `folder`.
///
/// A sensor must have a readable `tempN_input`; otherwise it is skipped.
///
/// ## What is read:
///
/// - Mandatory: `tempN_input`, in milli-celsius.
/// - Optional: `name` of the `hwmon`.
/// - Optional: sensor label from `tempN_label`.
///
/// Kernel hwmon API: https://www.kernel.org/doc/html/latest/hwmon/hwmon-kernel-api.html
pub fn from_hwmon(sensors: &mut Vec<Sensor>, folder: &Path) -> Option<()> {
    let dir = read_dir(folder).ok()?;
    let name = get_file_line(&folder.join("name"), 16).unwrap_or_default();
    for entry in dir.flatten() {
        if !entry.file_type().is_ok_and(|file_type| !file_type.is_dir()) {
            continue;
        }

        let entry = entry.path();
        let filename = entry.file_name().and_then(|x| x.to_str()).unwrap_or("");
        let Some((id, item)) = filename
            .strip_prefix("temp")
            .and_then(|f| f.split_once('_'))
            .and_then(|(id, item)| Some((id.parse::<u32>().ok()?, item)))
        else {
            continue;
        };

        if item != "input" {
            continue;
        }

        let Some(temperature) = get_temperature_from_file(&entry) else {
            continue;
        };
        let label = get_file_line(&folder.join(format!("temp{}_label", id)), 16)
            .unwrap_or_default();
        sensors.push(Sensor {
            id,
            path: entry.clone(),
            name: name.clone(),
            label,
            temperature,
        });
    }

    Some(())
}

// Read arbitrary string data.
pub fn get_file_line(file: &Path, capacity: usize) -> Option<String> {
    let mut reader = String::with_capacity(capacity);
    let mut f = File::open(file).ok()?;
    f.read_to_string(&mut reader).ok()?;
    reader.truncate(reader.trim_end().len());
    Some(reader)
}

/// Designed at first for reading an `i32` or `u32` aka `c_long`
/// from a `/sys/class/hwmon` sysfs file.
fn read_number_from_file<N>(file: &Path) -> Option<N>
where
    N: std::str::FromStr,
{
    let mut reader = [0u8; 32];
    let mut f = File::open(file).ok()?;
    let n = f.read(&mut reader).ok()?;
    // parse and trim would complain about `\0`.
    let number = &reader[..n];
    let number = std::str::from_utf8(number).ok()?;
    number.trim().parse().ok()
}

#[inline]
fn get_temperature_from_file(file: &Path) -> Option<f32> {
    let temp = read_number_from_file(file);
    convert_temp_celsius(temp)
}

/// Takes a raw temperature in milli-celsius and converts it to celsius.
#[inline]
fn convert_temp_celsius(temp: Option<i32>) -> Option<f32> {
    temp.map(|n| (n as f32) / 1000f32)
}
