use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use nalgebra::Vector3;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

// (rows + 1) x (columns + 1) 격자를 사각형마다 삼각형 2개로 이어줌
fn grid_indices(rows: u32, columns: u32) -> Vec<u32> {
    let ring = columns + 1;
    let mut indices = Vec::with_capacity((rows * columns * 6) as usize);

    for row in 0..rows {
        for column in 0..columns {
            let i0 = row * ring + column;
            let i1 = i0 + 1;
            let i2 = (row + 1) * ring + column;
            let i3 = i2 + 1;

            indices.push(i0);
            indices.push(i2);
            indices.push(i1);

            indices.push(i1);
            indices.push(i2);
            indices.push(i3);
        }
    }

    indices
}

pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial = radial_segments.max(2);
    let tubular = tubular_segments.max(3);

    let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;

        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;

            // 튜브 단면의 중심. 노멀은 단면 중심에서 표면으로 나가는 방향임
            let center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let position = Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let normal = (position - center).normalize();

            vertices.push(Vertex {
                position: position.into(),
                normal: normal.into(),
            });
        }
    }

    MeshData {
        vertices,
        indices: grid_indices(radial, tubular),
    }
}

pub fn cone(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    let radial = radial_segments.max(3);
    let half = height / 2.0;
    let slope = radius / height;

    let mut vertices = Vec::with_capacity((2 * (radial + 1) + radial + 2) as usize);

    // 옆면: 꼭대기는 반지름 0짜리 링으로 취급함
    for (ring_radius, y) in [(0.0f32, half), (radius, -half)] {
        for i in 0..=radial {
            let u = i as f32 / radial as f32 * TAU;
            let normal = Vector3::new(u.sin(), slope, u.cos()).normalize();

            vertices.push(Vertex {
                position: [ring_radius * u.sin(), y, ring_radius * u.cos()],
                normal: normal.into(),
            });
        }
    }

    let mut indices = grid_indices(1, radial);

    // 밑면 뚜껑은 중심점에서 부채꼴로
    let base = vertices.len() as u32;
    vertices.push(Vertex {
        position: [0.0, -half, 0.0],
        normal: [0.0, -1.0, 0.0],
    });
    for i in 0..=radial {
        let u = i as f32 / radial as f32 * TAU;
        vertices.push(Vertex {
            position: [radius * u.sin(), -half, radius * u.cos()],
            normal: [0.0, -1.0, 0.0],
        });
    }
    for i in 0..radial {
        indices.push(base);
        indices.push(base + 2 + i);
        indices.push(base + 1 + i);
    }

    MeshData { vertices, indices }
}

pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> MeshData {
    let tubular = tubular_segments.max(3);
    let radial = radial_segments.max(3);

    let mut vertices = Vec::with_capacity(((tubular + 1) * (radial + 1)) as usize);
    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * p as f32 * TAU;

        // 곡선 위 두 점으로 탄젠트/노멀/바이노멀 프레임을 세움
        let p1 = knot_point(u, radius, p, q);
        let p2 = knot_point(u + 0.01, radius, p, q);

        let tangent = p2 - p1;
        let seed = p2 + p1;
        let binormal = tangent.cross(&seed).normalize();
        let normal = binormal.cross(&tangent).normalize();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();

            let position = p1 + normal * cx + binormal * cy;
            let vertex_normal = (position - p1).normalize();

            vertices.push(Vertex {
                position: position.into(),
                normal: vertex_normal.into(),
            });
        }
    }

    MeshData {
        vertices,
        indices: grid_indices(tubular, radial),
    }
}

// (p, q) 매듭 곡선 위의 한 점
fn knot_point(u: f32, radius: f32, p: u32, q: u32) -> Vector3<f32> {
    let qu_over_p = q as f32 / p as f32 * u;
    let factor = radius * (2.0 + qu_over_p.cos()) * 0.5;

    Vector3::new(
        factor * u.cos(),
        factor * u.sin(),
        radius * qu_over_p.sin() * 0.5,
    )
}

pub fn cuboid(size: f32) -> MeshData {
    let half = size / 2.0;

    // 면마다 (노멀, u축, v축)
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u_axis, v_axis) in faces {
        let n = Vector3::from(normal);
        let u = Vector3::from(u_axis);
        let v = Vector3::from(v_axis);

        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = (n + u * su + v * sv) * half;
            vertices.push(Vertex {
                position: position.into(),
                normal,
            });
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(mesh: &MeshData) {
        assert_eq!(mesh.indices.len() % 3, 0);
        for &index in &mesh.indices {
            assert!((index as usize) < mesh.vertices.len());
        }
        for vertex in &mesh.vertices {
            let n = Vector3::from(vertex.normal);
            assert!((n.magnitude() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn torus_grid_counts() {
        let mesh = torus(1.0, 0.4, 16, 60);
        assert_eq!(mesh.vertices.len(), 17 * 61);
        assert_eq!(mesh.indices.len(), 16 * 60 * 6);
        assert_well_formed(&mesh);
    }

    #[test]
    fn torus_stays_within_tube_bounds() {
        let mesh = torus(1.0, 0.4, 16, 60);
        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.position;
            let ring_distance = (x * x + y * y).sqrt();
            assert!(ring_distance > 1.0 - 0.4 - 1e-4);
            assert!(ring_distance < 1.0 + 0.4 + 1e-4);
            assert!(z.abs() < 0.4 + 1e-4);
        }
    }

    #[test]
    fn cone_has_apex_and_cap() {
        let mesh = cone(1.0, 2.0, 32);
        assert_well_formed(&mesh);

        let apex_count = mesh
            .vertices
            .iter()
            .filter(|vertex| (vertex.position[1] - 1.0).abs() < 1e-6)
            .count();
        assert_eq!(apex_count, 33);

        let down = mesh
            .vertices
            .iter()
            .filter(|vertex| vertex.normal == [0.0, -1.0, 0.0])
            .count();
        assert_eq!(down, 34);
    }

    #[test]
    fn torus_knot_grid_counts() {
        let mesh = torus_knot(0.8, 0.35, 100, 16, 2, 3);
        assert_eq!(mesh.vertices.len(), 101 * 17);
        assert_eq!(mesh.indices.len(), 100 * 16 * 6);
        assert_well_formed(&mesh);
    }

    #[test]
    fn torus_knot_tube_radius_holds() {
        let mesh = torus_knot(0.8, 0.35, 100, 16, 2, 3);
        // 매듭은 원점 근처에 머물러야 함
        for vertex in &mesh.vertices {
            let distance = Vector3::from(vertex.position).magnitude();
            assert!(distance < 0.8 * 1.5 + 0.35 + 1e-3);
        }
    }

    #[test]
    fn cuboid_counts() {
        let mesh = cuboid(1.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_well_formed(&mesh);
        for vertex in &mesh.vertices {
            for component in vertex.position {
                assert!((component.abs() - 0.5).abs() < 1e-6);
            }
        }
    }
}
