use bytemuck::{Pod, Zeroable};
use std::mem;

use crate::asset::MeshData;

/// Interleaved vertex as uploaded to the device.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

/// Float attribute bound at `location`, `components` wide, `offset` bytes
/// into a [`Vertex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub offset: usize,
}

impl Vertex {
    pub const STRIDE: usize = mem::size_of::<Vertex>();

    pub const ATTRIBUTES: [VertexAttribute; 3] = [
        VertexAttribute {
            location: 0,
            components: 3,
            offset: mem::offset_of!(Vertex, position),
        },
        VertexAttribute {
            location: 1,
            components: 2,
            offset: mem::offset_of!(Vertex, uv),
        },
        VertexAttribute {
            location: 2,
            components: 3,
            offset: mem::offset_of!(Vertex, normal),
        },
    ];

    pub fn interleave(mesh: &MeshData) -> Vec<Vertex> {
        mesh.positions
            .iter()
            .zip(&mesh.uvs)
            .zip(&mesh.normals)
            .map(|((position, uv), normal)| Vertex {
                position: position.to_array(),
                uv: uv.to_array(),
                normal: normal.to_array(),
            })
            .collect()
    }

    /// Two clip-space triangles covering the whole target.
    pub fn fullscreen_quad() -> [Vertex; 6] {
        let corner = |x: f32, y: f32| Vertex {
            position: [x, y, 0.0],
            uv: [(x + 1.0) / 2.0, (y + 1.0) / 2.0],
            normal: [0.0, 0.0, 1.0],
        };
        [
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
            corner(1.0, -1.0),
            corner(-1.0, 1.0),
            corner(-1.0, -1.0),
        ]
    }
}
