use nalgebra::{Matrix4, Rotation3, Vector3};

pub struct Material {
    pub color: Vector3<f32>,
    // 그라디언트 조회를 타는 재질인지. 큐브는 단색으로 둠
    pub shaded: bool,
}

pub struct SceneObject {
    pub name: &'static str,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub visible: bool,
    pub material_index: usize,
    pub mesh_index: usize,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: "",
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            visible: true,
            material_index: 0,
            mesh_index: 0,
        }
    }
}

impl SceneObject {
    // 이동 * 회전(XYZ 순서) * 크기
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation.x)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation.y)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation.z);

        Matrix4::new_translation(&self.position)
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn model_matrix_places_origin_at_position() {
        let object = SceneObject {
            position: Vector3::new(0.0, -4.0, 0.0),
            rotation: Vector3::new(0.3, 0.7, 0.0),
            scale: Vector3::new(0.5, 0.5, 0.5),
            ..Default::default()
        };

        let origin = object.model_matrix().transform_point(&Point3::origin());
        assert!((origin.y + 4.0).abs() < 1e-6);
        assert!(origin.x.abs() < 1e-6);
    }

    #[test]
    fn model_matrix_applies_scale() {
        let object = SceneObject {
            scale: Vector3::new(0.5, 0.5, 0.5),
            ..Default::default()
        };

        let point = object.model_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((point.coords.magnitude() - 0.5).abs() < 1e-6);
    }
}
