//! Text import and export of survey points.
//!
//! One point per line, `id,x,y,z,code`, comma- or whitespace-separated.
//! Lines that are short or fail to parse are skipped rather than failing
//! the whole import.

use std::io;

use crate::point_database::SurveyPoint;

/// Reads points from a delimited text file.
pub fn read_points_txt(path: &str) -> io::Result<Vec<SurveyPoint>> {
    let contents = crate::io::read_to_string(path)?;
    let mut points = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = if line.contains(',') {
            line.split(',').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };
        if parts.len() < 5 {
            log::warn!("skipping short point record: {line}");
            continue;
        }
        let (Ok(x), Ok(y), Ok(z)) = (
            parts[1].parse::<f64>(),
            parts[2].parse::<f64>(),
            parts[3].parse::<f64>(),
        ) else {
            log::warn!("skipping unparsable point record: {line}");
            continue;
        };
        points.push(SurveyPoint::new(parts[0], x, y, z, parts[4]));
    }
    Ok(points)
}

/// Writes points to a comma-separated text file.
pub fn write_points_txt(path: &str, points: &[SurveyPoint]) -> io::Result<()> {
    let mut out = String::new();
    for p in points {
        out.push_str(&format!("{}, {}, {}, {}, {}\n", p.id, p.x, p.y, p.z, p.code));
    }
    crate::io::write_string(path, &out)
}
