use cfg_if::cfg_if;
use nalgebra::Vector3;
use winit::dpi::PhysicalSize;

use crate::util::parse_hex_color;
use crate::vitrine::scene::{Material, SceneObject};
use crate::vitrine::texture::GradientMap;

pub mod geometry;
pub mod scene;
pub mod texture;

// 섹션 사이의 세로 간격. 스크롤 한 화면 = 섹션 하나
pub const OBJECT_SPACING: f32 = 4.0;
pub const SECTION_COUNT: u32 = 3;

pub const DEFAULT_COLOR: &str = "#ffeded";

const SHARED_MATERIAL: usize = 0;
const CUBE_MATERIAL: usize = 1;
const CUBE_INDEX: usize = 3;

const CUBE_SPIN: f32 = 0.1;
const SIGNATURE_SPINS: [f32; 3] = [0.2, 0.3, 0.4];
const SECTION_SPIN_X: f32 = 0.1;
const SECTION_SPIN_Y: f32 = 0.12;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        use web_time::Instant;
    } else {
        use std::time::Instant;
    }
}

pub struct Clock {
    started: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

#[derive(Default, Clone, Copy)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

// 입력 핸들러만 쓰고, 프레임 루프는 읽기만 하는 공유 상태
#[derive(Default)]
pub struct InputState {
    pub cursor: Cursor,
    pub scroll_y: f32,
}

impl InputState {
    pub fn point_cursor(&mut self, x: f64, y: f64, viewport: PhysicalSize<u32>) {
        self.cursor.x = (x / viewport.width.max(1) as f64 - 0.5) as f32;
        self.cursor.y = (y / viewport.height.max(1) as f64 - 0.5) as f32;

        log::debug!("cursor: ({:.3}, {:.3})", self.cursor.x, self.cursor.y);
    }

    pub fn push_scroll(&mut self, delta: f32, viewport_height: f32) {
        let limit = viewport_height * (SECTION_COUNT - 1) as f32;
        self.scroll_y = (self.scroll_y + delta).clamp(0.0, limit.max(0.0));
    }
}

// 디버그 패널이 편집하는 값들
pub struct Parameters {
    pub material_color: String,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            material_color: DEFAULT_COLOR.to_owned(),
        }
    }
}

pub struct Stage {
    pub objects: Vec<SceneObject>,
    pub materials: Vec<Material>,
    pub gradient: GradientMap,
}

impl Stage {
    // GradientMap을 값으로 받으므로 텍스처 준비 전엔 무대 자체가 없음
    pub fn new(gradient: GradientMap) -> Self {
        let base_color = parse_hex_color(DEFAULT_COLOR).unwrap();

        let materials = vec![
            Material {
                color: base_color,
                shaded: true,
            },
            Material {
                color: base_color,
                shaded: false,
            },
        ];

        let objects = vec![
            SceneObject {
                name: "torus",
                position: Vector3::new(0.0, -OBJECT_SPACING * 0.0, 0.0),
                scale: Vector3::new(0.5, 0.5, 0.5),
                material_index: SHARED_MATERIAL,
                mesh_index: 0,
                ..Default::default()
            },
            SceneObject {
                name: "cone",
                position: Vector3::new(0.0, -OBJECT_SPACING * 1.0, 0.0),
                visible: false,
                material_index: SHARED_MATERIAL,
                mesh_index: 1,
                ..Default::default()
            },
            SceneObject {
                name: "torus-knot",
                position: Vector3::new(0.0, -OBJECT_SPACING * 2.0, 0.0),
                scale: Vector3::new(0.5, 0.5, 0.5),
                material_index: SHARED_MATERIAL,
                mesh_index: 2,
                ..Default::default()
            },
            SceneObject {
                name: "cube",
                material_index: CUBE_MATERIAL,
                mesh_index: 3,
                ..Default::default()
            },
        ];

        Self {
            objects,
            materials,
            gradient,
        }
    }

    pub fn primaries(&self) -> &[SceneObject] {
        &self.objects[..CUBE_INDEX]
    }

    pub fn animate(&mut self, elapsed: f32) {
        {
            let cube = &mut self.objects[CUBE_INDEX];
            cube.rotation.x = elapsed * CUBE_SPIN;
            cube.rotation.y = elapsed * CUBE_SPIN;
        }

        for (object, speed) in self.objects[..CUBE_INDEX].iter_mut().zip(SIGNATURE_SPINS) {
            object.rotation.x = elapsed * speed;
            object.rotation.y = elapsed * speed;
        }

        // 섹션 공통 회전이 개별 회전을 덮어씀
        for object in &mut self.objects[..CUBE_INDEX] {
            object.rotation.x = elapsed * SECTION_SPIN_X;
            object.rotation.y = elapsed * SECTION_SPIN_Y;
        }
    }

    // 공유 재질 한 곳만 고치면 세 오브젝트 모두에 반영됨
    pub fn set_material_color(&mut self, hex: &str) -> bool {
        match parse_hex_color(hex) {
            Some(color) => {
                self.materials[SHARED_MATERIAL].color = color;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_stage() -> Stage {
        Stage::new(GradientMap::from_steps(&[0x44, 0x88, 0xEE]))
    }

    #[test]
    fn stage_builds_three_primaries_and_a_cube() {
        let stage = test_stage();

        assert_eq!(stage.objects.len(), 4);
        assert_eq!(stage.primaries().len(), 3);
        assert_eq!(stage.objects[CUBE_INDEX].name, "cube");

        // 원뿔은 처음부터 숨겨져 있음
        assert!(!stage.objects[1].visible);
        assert!(stage.objects[0].visible);
        assert!(stage.objects[2].visible);
    }

    #[test]
    fn primaries_are_stacked_one_section_apart() {
        let stage = test_stage();
        for (section, object) in stage.primaries().iter().enumerate() {
            let expected = -OBJECT_SPACING * section as f32;
            assert!((object.position.y - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn cube_spins_at_tenth_radian_per_second() {
        let mut stage = test_stage();
        stage.animate(7.5);

        let cube = &stage.objects[CUBE_INDEX];
        assert!((cube.rotation.x - 0.75).abs() < 1e-6);
        assert!((cube.rotation.y - 0.75).abs() < 1e-6);
    }

    #[test]
    fn section_pass_overwrites_signature_spins() {
        let mut stage = test_stage();
        stage.animate(10.0);

        // 마지막 공통 회전이 이김: 0.2/0.3/0.4는 관측되지 않음
        for object in stage.primaries() {
            assert!((object.rotation.x - 1.0).abs() < 1e-5);
            assert!((object.rotation.y - 1.2).abs() < 1e-5);
        }
    }

    #[test]
    fn animation_is_deterministic_in_elapsed_time() {
        let mut first = test_stage();
        let mut second = test_stage();
        first.animate(3.0);
        second.animate(1.0);
        second.animate(3.0);

        for (a, b) in first.objects.iter().zip(&second.objects) {
            assert_eq!(a.rotation, b.rotation);
        }
    }

    #[test]
    fn color_write_reaches_all_primary_meshes() {
        let mut stage = test_stage();
        assert!(stage.set_material_color("#4488ee"));

        for object in stage.primaries() {
            let color = stage.materials[object.material_index].color;
            assert!((color.x - 0x44 as f32 / 255.0).abs() < 1e-6);
            assert!((color.y - 0x88 as f32 / 255.0).abs() < 1e-6);
            assert!((color.z - 0xEE as f32 / 255.0).abs() < 1e-6);
        }

        // 큐브 재질은 그대로
        let cube = &stage.objects[CUBE_INDEX];
        let cube_color = stage.materials[cube.material_index].color;
        assert!((cube_color.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn malformed_hex_leaves_material_untouched() {
        let mut stage = test_stage();
        let before = stage.materials[SHARED_MATERIAL].color;

        assert!(!stage.set_material_color("#ff"));
        assert!(!stage.set_material_color("not-a-color"));
        assert_eq!(stage.materials[SHARED_MATERIAL].color, before);
    }

    #[test]
    fn cursor_normalizes_to_half_centered_range() {
        let mut input = InputState::default();
        let viewport = PhysicalSize::new(800, 600);

        input.point_cursor(400.0, 300.0, viewport);
        assert!(input.cursor.x.abs() < 1e-6);
        assert!(input.cursor.y.abs() < 1e-6);

        input.point_cursor(800.0, 600.0, viewport);
        assert!((input.cursor.x - 0.5).abs() < 1e-6);
        assert!((input.cursor.y - 0.5).abs() < 1e-6);

        input.point_cursor(0.0, 0.0, viewport);
        assert!((input.cursor.x + 0.5).abs() < 1e-6);
        assert!((input.cursor.y + 0.5).abs() < 1e-6);
    }

    #[test]
    fn scroll_clamps_to_page_bounds() {
        let mut input = InputState::default();

        input.push_scroll(-250.0, 600.0);
        assert_eq!(input.scroll_y, 0.0);

        input.push_scroll(10_000.0, 600.0);
        assert_eq!(input.scroll_y, 1200.0);

        input.push_scroll(-300.0, 600.0);
        assert_eq!(input.scroll_y, 900.0);
    }
}
