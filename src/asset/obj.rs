//! Reader for the small OBJ subset used by mesh assets.
//!
//! Supported directives are `v`, `vn`, `vt` and triangular `f` faces with
//! `v/vt/vn` corners. Every other line is ignored.

use glam::{Vec2, Vec3};

use crate::errors::DecodeError;

/// Triangle soup with one entry per face corner in each array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

type Corner = [usize; 3];

pub fn parse_obj(text: &str) -> Result<MeshData, DecodeError> {
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut normals = Vec::new();
    let mut faces: Vec<(usize, [Corner; 3])> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let cols: Vec<&str> = line.split_whitespace().collect();
        let Some((directive, args)) = cols.split_first() else {
            continue;
        };
        match *directive {
            "v" => positions.push(Vec3::from_array(floats::<3>(args, line_no)?)),
            "vn" => normals.push(Vec3::from_array(floats::<3>(args, line_no)?)),
            "vt" => uvs.push(Vec2::from_array(floats::<2>(args, line_no)?)),
            "f" => {
                if args.len() < 3 {
                    return Err(DecodeError::obj(line_no, "face needs three corners"));
                }
                let mut face = [[0usize; 3]; 3];
                for (corner, arg) in face.iter_mut().zip(args) {
                    *corner = parse_corner(arg, line_no)?;
                }
                faces.push((line_no, face));
            }
            _ => {}
        }
    }

    if uvs.is_empty() {
        uvs.push(Vec2::ZERO);
    }
    if normals.is_empty() {
        normals.push(Vec3::ZERO);
    }

    let mut mesh = MeshData::default();
    for (line_no, face) in faces {
        for [v, vt, vn] in face {
            mesh.positions.push(lookup(&positions, v, line_no, "vertex")?);
            mesh.uvs.push(lookup(&uvs, vt, line_no, "uv")?);
            mesh.normals.push(lookup(&normals, vn, line_no, "normal")?);
        }
    }
    Ok(mesh)
}

fn floats<const N: usize>(args: &[&str], line: usize) -> Result<[f32; N], DecodeError> {
    if args.len() < N {
        return Err(DecodeError::obj(
            line,
            format!("expected {} values, found {}", N, args.len()),
        ));
    }
    let mut out = [0.0f32; N];
    for (value, arg) in out.iter_mut().zip(args) {
        *value = arg
            .parse()
            .map_err(|_| DecodeError::obj(line, format!("'{}' is not a number", arg)))?;
    }
    Ok(out)
}

/// `v/vt/vn`; missing or malformed uv and normal indices default to 1.
fn parse_corner(arg: &str, line: usize) -> Result<Corner, DecodeError> {
    let fields: Vec<&str> = arg.split('/').collect();
    if fields.len() < 3 {
        return Err(DecodeError::obj(
            line,
            format!("face corner '{}' needs v/vt/vn", arg),
        ));
    }
    let vertex = fields[0]
        .parse()
        .map_err(|_| DecodeError::obj(line, format!("'{}' is not a vertex index", fields[0])))?;
    let uv = fields[1].parse().unwrap_or(1);
    let normal = fields[2].parse().unwrap_or(1);
    Ok([vertex, uv, normal])
}

fn lookup<T: Copy>(items: &[T], index: usize, line: usize, what: &str) -> Result<T, DecodeError> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .copied()
        .ok_or_else(|| DecodeError::obj(line, format!("{} index {} out of range", what, index)))
}
