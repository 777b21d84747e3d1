use crate::calc::month_name;
use crate::data::{markers_for, AnnotationMap, EventClient};
use anyhow::{bail, Result};

/// Fetches one month's event counts and prints a per-day summary.
pub fn run(client: &EventClient, year: i32, month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        bail!("month must be between 1 and 12, got {}", month);
    }
    let map = client.fetch_month(year, month)?;
    write_events(year, month, &map, &mut std::io::stdout())
}

pub(crate) fn write_events<W: std::io::Write>(
    year: i32,
    month: u32,
    map: &AnnotationMap,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Events for {} {}", month_name(month), year)?;
    let days = map.annotated_days();
    if days.is_empty() {
        writeln!(out, "(none)")?;
        return Ok(());
    }
    for (day, count) in days {
        let markers = markers_for(count);
        let mut dots = "•".repeat(markers.dots as usize);
        if let Some(extra) = markers.overflow {
            dots.push_str(&format!("+{}", extra));
        }
        writeln!(out, "{:>2}  {:<10} {} event(s)", day, dots, count)?;
    }
    Ok(())
}
