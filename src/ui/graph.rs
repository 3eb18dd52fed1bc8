const NEWEST: &str = "now";

/// Column chart of `data`, oldest value on the left, one column per value.
///
/// The vertical axis spans the data's own min to max. A row is filled where the
/// value reaches that row's threshold. Labels mark the top, middle and bottom rows.
/// The time axis counts samples, since the sampling interval varies.
pub fn render_ascii_graph(data: &[f64], height: usize, unit: &str) -> String {
    if data.is_empty() {
        return "No data available".to_string();
    }
    let height = height.max(1);

    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        max += 1.0;
    }
    let mid = min + (max - min) / 2.0;

    let label_for = |h: usize| -> String {
        if h == height {
            format!("{:.1}{}", max, unit)
        } else if h == 1 {
            format!("{:.1}{}", min, unit)
        } else if h == height / 2 {
            format!("{:.1}{}", mid, unit)
        } else {
            String::new()
        }
    };
    let label_width = (1..=height).map(|h| label_for(h).len()).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(height + 2);
    for h in (1..=height).rev() {
        let threshold = min + (max - min) * h as f64 / height as f64;
        let row: String = data
            .iter()
            .map(|&value| if value >= threshold { '█' } else { ' ' })
            .collect();
        lines.push(format!("{:>width$} |{}", label_for(h), row, width = label_width));
    }

    let indent = " ".repeat(label_width + 2);
    lines.push(format!("{}{}", indent, "-".repeat(data.len())));
    if data.len() > 10 {
        let oldest = format!("-{} samples", data.len() - 1);
        let gap = data.len().saturating_sub(oldest.len() + NEWEST.len()).max(1);
        lines.push(format!("{}{}{}{}", indent, oldest, " ".repeat(gap), NEWEST));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(render_ascii_graph(&[], 10, "%"), "No data available");
    }

    #[test]
    fn test_small_graph() {
        let graph = render_ascii_graph(&[0.0, 1.0, 2.0, 3.0], 2, "%");
        let lines: Vec<&str> = graph.lines().collect();

        assert_eq!(lines, vec!["3.0% |   █", "0.0% |  ██", "      ----"]);
    }

    #[test]
    fn test_flat_data_scale() {
        let graph = render_ascii_graph(&[5.0; 3], 4, "%");
        let lines: Vec<&str> = graph.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "6.0% |   ");
        assert_eq!(lines[1], "     |   ");
        assert_eq!(lines[2], "5.5% |   ");
        assert_eq!(lines[3], "5.0% |   ");
    }

    #[test]
    fn test_time_axis() {
        let data: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let graph = render_ascii_graph(&data, 10, "%");
        let lines: Vec<&str> = graph.lines().collect();
        let axis = lines[lines.len() - 2];
        let last = lines[lines.len() - 1];

        assert_eq!(lines.len(), 12);
        assert!(last.trim_start().starts_with("-59 samples "));
        assert!(last.ends_with("now"));
        assert_eq!(last.chars().count(), axis.chars().count());
    }

    #[test]
    fn test_short_time_axis_keeps_a_gap() {
        let data: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let graph = render_ascii_graph(&data, 3, "%");
        let last = graph.lines().last().unwrap_or_default().to_string();

        assert!(last.ends_with("-10 samples now"));
    }

    #[test]
    fn test_no_time_axis_for_few_samples() {
        let graph = render_ascii_graph(&[1.0; 10], 3, "%");
        assert!(!graph.contains("samples"));
    }
}
