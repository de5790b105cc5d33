//! JSON persistence for terrain surfaces.
//!
//! Only the source points, boundary polylines and the manual triangle index
//! snapshot are stored; the automatic mesh is rebuilt on demand.

use std::io;

use crate::dtm::SurfaceModel;

/// Reads a surface JSON file.
pub fn read_surface_json(path: &str) -> io::Result<SurfaceModel> {
    let contents = crate::io::read_to_string(path)?;
    let surface: SurfaceModel = serde_json::from_str(&contents)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(surface)
}

/// Writes a surface to a JSON file.
pub fn write_surface_json(path: &str, surface: &SurfaceModel) -> io::Result<()> {
    let json = serde_json::to_string_pretty(surface).map_err(io::Error::other)?;
    crate::io::write_string(path, &json)
}
