// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Binary stream and JSON export of the per-face triangle sets.
//
// Binary layout, all little-endian: for each of the eight faces a u32 count of
// sub-contours; each sub-contour is a u32 vertex count followed by that many
// records of three f64 coordinates and one u8 edge flag.

use std::io::{self, Read, Write};

use glam::DVec3;
use serde::Serialize;
use thiserror::Error;

use super::tessellate::face_triangle_area;
use super::{OctahedronPolygon, SIDE_COUNT};
use crate::contour::{EdgeVertex, SubContour};
use crate::sphere::ra_dec_from_vector;
use crate::validation::on_face;

/// Upper bound on speculative allocation while reading counts.
const MAX_PREALLOCATION: usize = 4096;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("side {side}: edge flag byte {value} is neither 0 nor 1")]
    InvalidFlag { side: usize, value: u8 },
    #[error("side {side}: sub-contour {index} has {len} vertices, expected a triangle")]
    NotATriangle { side: usize, index: usize, len: usize },
    #[error("side {side}: triangle {index} is not positively oriented")]
    NegativeTriangle { side: usize, index: usize },
    #[error("side {side}: non-finite coordinate")]
    NonFiniteCoordinate { side: usize },
    #[error("side {side}: triangle {index} has a vertex off the face plane")]
    OffFace { side: usize, index: usize },
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f64<R: Read>(r: &mut R) -> io::Result<f64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_u8<R: Read>(r: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// `[ra_deg, dec_deg, edge_flag]`.
#[derive(Serialize)]
struct JsonVertex(f64, f64, bool);

/// Rounds to 12 significant digits.
fn round_significant(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    format!("{:.11e}", x).parse().unwrap_or(x)
}

impl OctahedronPolygon {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for side in &self.sides {
            w.write_all(&(side.len() as u32).to_le_bytes())?;
            for contour in side {
                w.write_all(&(contour.len() as u32).to_le_bytes())?;
                for v in contour.iter() {
                    for c in v.vertex.to_array() {
                        w.write_all(&c.to_le_bytes())?;
                    }
                    w.write_all(&[v.edge_flag as u8])?;
                }
            }
        }
        Ok(())
    }

    /// Reads a polygon written by `write_to`, rejecting anything that is not
    /// a set of positive triangles lying on their own faces.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, SerializeError> {
        let mut poly = OctahedronPolygon::empty();
        for side in 0..SIDE_COUNT {
            let count = read_u32(r)? as usize;
            let mut contours = Vec::with_capacity(count.min(MAX_PREALLOCATION));
            for index in 0..count {
                let len = read_u32(r)? as usize;
                if len != 3 {
                    return Err(SerializeError::NotATriangle { side, index, len });
                }
                let mut contour = SubContour::with_capacity(3);
                for _ in 0..len {
                    let vertex = DVec3::new(read_f64(r)?, read_f64(r)?, read_f64(r)?);
                    if !vertex.is_finite() {
                        return Err(SerializeError::NonFiniteCoordinate { side });
                    }
                    let edge_flag = match read_u8(r)? {
                        0 => false,
                        1 => true,
                        value => return Err(SerializeError::InvalidFlag { side, value }),
                    };
                    if !on_face(side, vertex) {
                        return Err(SerializeError::OffFace { side, index });
                    }
                    contour.push(EdgeVertex::new(vertex, edge_flag));
                }
                if face_triangle_area(side, contour[0].vertex, contour[1].vertex, contour[2].vertex) <= 0.0 {
                    return Err(SerializeError::NegativeTriangle { side, index });
                }
                contours.push(contour);
            }
            poly.sides[side] = contours;
        }
        poly.update_caches();
        Ok(poly)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, SerializeError> {
        Self::read_from(&mut bytes)
    }

    fn json_faces(&self) -> Vec<Vec<Vec<JsonVertex>>> {
        self.sides
            .iter()
            .map(|side| {
                side.iter()
                    .map(|contour| {
                        contour
                            .iter()
                            .map(|v| {
                                let (ra, dec) = ra_dec_from_vector(v.vertex);
                                JsonVertex(round_significant(ra), round_significant(dec), v.edge_flag)
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    /// Eight faces, each a list of contours of `[ra_deg, dec_deg, edge_flag]`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.json_faces()).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    pub fn write_json<W: Write>(&self, w: W) -> serde_json::Result<()> {
        serde_json::to_writer(w, &self.json_faces())
    }
}
