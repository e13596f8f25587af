use std::iter;

use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use eframe::egui::{ClippedPrimitive, TextEdit};
use nalgebra::Vector3;
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::{
    Backends, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    Buffer, BufferBindingType, BufferUsages, Color, CommandEncoder, CommandEncoderDescriptor,
    CompareFunction, CompositeAlphaMode, DepthStencilState, Device, DeviceDescriptor,
    Dx12Compiler, Extent3d, Features, FragmentState, FrontFace, IndexFormat, Instance,
    InstanceDescriptor, Limits, LoadOp, MultisampleState, Operations, PipelineLayoutDescriptor,
    PolygonMode, PowerPreference, PresentMode, PrimitiveState, PrimitiveTopology, Queue,
    RenderPassColorAttachment, RenderPassDepthStencilAttachment, RenderPassDescriptor,
    RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions, SamplerBindingType,
    ShaderStages, Surface, SurfaceConfiguration, SurfaceError, Texture, TextureDescriptor,
    TextureDimension, TextureFormat, TextureSampleType, TextureUsages, TextureView,
    TextureViewDescriptor, TextureViewDimension, VertexState,
};
use winit::dpi::PhysicalSize;
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::camera::{Camera, OrbitControls};
use crate::vitrine::geometry::{self, MeshData, Vertex};
use crate::vitrine::texture::{GpuImage, GradientMap};
use crate::vitrine::{Clock, InputState, Parameters, Stage};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

// 휠 한 칸을 브라우저 스크롤처럼 픽셀로 환산
const SCROLL_LINE_PX: f32 = 40.0;

const AMBIENT_LIGHT: [f32; 4] = [0.25, 0.25, 0.25, 1.0];
const LIGHT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GlobalUniforms {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_direction: [f32; 4],
    light_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    shaded: [f32; 4],
}

struct GpuMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &Device, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: cast_slice(&data.vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: cast_slice(&data.indices),
            usage: BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

// 오브젝트마다 모델 행렬/재질을 담는 작은 유니폼 버퍼 하나씩
struct ObjectSlot {
    buffer: Buffer,
    bind_group: BindGroup,
}

pub struct Application {
    surface: Surface,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    // 무조건 winit의 Window를 쓸 것!
    pub window: Window,

    depth_texture: Texture,
    depth_view: TextureView,

    pipeline: RenderPipeline,
    globals_buffer: Buffer,
    globals_bind_group: BindGroup,
    gradient_bind_group: BindGroup,
    meshes: Vec<GpuMesh>,
    object_slots: Vec<ObjectSlot>,

    pub stage: Stage,
    pub camera: Camera,
    controls: OrbitControls,
    input_state: InputState,
    clock: Clock,
    parameters: Parameters,

    egui_state: egui_winit::State,
    egui_context: eframe::egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    egui_screen: egui_wgpu::renderer::ScreenDescriptor,
}

impl Application {
    pub async fn new(window: Window, event_loop: &EventLoop<()>) -> Self {
        let size = window.inner_size();

        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            dx12_shader_compiler: Dx12Compiler::default(),
        });

        // 전달하는 &window가 surface보다 오래 살아야 해서 unsafe
        let surface = unsafe { instance.create_surface(&window) }.unwrap();

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    features: Features::empty(),
                    // 브라우저에서도 돌아가게 webgl2 한도로 맞춤
                    limits: if cfg!(target_arch = "wasm32") {
                        Limits::downlevel_webgl2_defaults()
                    } else {
                        Limits::default()
                    },
                    label: Some("Vitrine GPU"),
                },
                None,
            )
            .await
            .unwrap();

        let capabilities = surface.get_capabilities(&adapter);

        // 의도한 색으로 보이게 sRGB 포맷 우선
        let surface_format = capabilities
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(capabilities.formats[0]);
        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        // 1단계: 계조 텍스처 디코딩.
        // 이게 성공하기 전엔 무대도, 프레임 루프도 존재하지 않음
        let gradient = GradientMap::from_bytes(include_bytes!("../static/gradients/3.png"))
            .expect("계조 텍스처 디코딩 실패");

        // 2단계: 무대 구성과 GPU 자원 준비
        let stage = Stage::new(gradient);
        let gradient_image = GpuImage::upload(&device, &queue, &stage.gradient, "Gradient Map");

        let meshes: Vec<GpuMesh> = [
            geometry::torus(1.0, 0.4, 16, 60),
            geometry::cone(1.0, 2.0, 32),
            geometry::torus_knot(0.8, 0.35, 100, 16, 2, 3),
            geometry::cuboid(1.0),
        ]
        .iter()
        .map(|data| GpuMesh::upload(&device, data))
        .collect();

        let globals_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let gradient_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Gradient Layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Object Layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytes_of(&GlobalUniforms::zeroed()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let gradient_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Gradient Bind Group"),
            layout: &gradient_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&gradient_image.view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&gradient_image.sampler),
                },
            ],
        });

        let object_slots = stage
            .objects
            .iter()
            .map(|object| {
                let buffer = device.create_buffer_init(&BufferInitDescriptor {
                    label: Some(object.name),
                    contents: bytes_of(&ObjectUniforms::zeroed()),
                    usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&BindGroupDescriptor {
                    label: Some(object.name),
                    layout: &object_layout,
                    entries: &[BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });

                ObjectSlot { buffer, bind_group }
            })
            .collect();

        let shader = device.create_shader_module(wgpu::include_wgsl!("shader.wgsl"));
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Stage Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &gradient_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Stage Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::layout()],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                // 숨김이 풀린 원뿔 안쪽까지 보이게 양면으로
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
        });

        let (depth_texture, depth_view) = create_depth_texture(&device, size.width, size.height);

        let egui_state = egui_winit::State::new(event_loop);
        let egui_context = eframe::egui::Context::default();
        // 같은 패스에 깊이 첨부가 있으니 egui 파이프라인에도 알려줘야 함
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, Some(DEPTH_FORMAT), 1);
        let egui_screen = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: egui_context.pixels_per_point(),
        };

        let camera = Camera::new(35f32.to_radians(), 0.1, 100.0, size);

        Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            depth_texture,
            depth_view,
            pipeline,
            globals_buffer,
            globals_bind_group,
            gradient_bind_group,
            meshes,
            object_slots,
            stage,
            camera,
            controls: OrbitControls::new(),
            input_state: InputState::default(),
            clock: Clock::start(),
            parameters: Parameters::default(),
            egui_state,
            egui_context,
            egui_renderer,
            egui_screen,
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        let (depth_texture, depth_view) =
            create_depth_texture(&self.device, new_size.width, new_size.height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;

        self.camera.resize(new_size);

        self.egui_screen.pixels_per_point = self.egui_context.pixels_per_point();
        self.egui_screen.size_in_pixels = [self.config.width, self.config.height];
    }

    // true: 여기서 입력 처리가 끝남. false: event loop가 마저 처리해야 함
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        let egui_response = self.egui_state.on_event(&self.egui_context, event);
        if egui_response.consumed {
            return true;
        }

        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.input_state
                    .point_cursor(position.x, position.y, self.size);
                self.controls.input(event)
            }
            WindowEvent::MouseInput { .. } => self.controls.input(event),
            WindowEvent::MouseWheel { delta, .. } => {
                let pixels = match *delta {
                    MouseScrollDelta::LineDelta(_, lines) => lines * SCROLL_LINE_PX,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                // 휠을 내리면 페이지가 내려간 것으로 침
                self.input_state.push_scroll(-pixels, self.size.height as f32);
                true
            }
            _ => false,
        }
    }

    pub fn update(&mut self) {
        let elapsed = self.clock.elapsed_seconds();

        self.stage.animate(elapsed);
        self.camera
            .apply_scroll(self.input_state.scroll_y, self.size.height as f32);
        self.controls.update(&mut self.camera);
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        // 이번 프레임의 유니폼 값 반영
        let light_direction = Vector3::new(1.0, 1.0, 0.0).normalize();
        let globals = GlobalUniforms {
            view_proj: self.camera.view_projection_matrix().into(),
            ambient: AMBIENT_LIGHT,
            light_direction: [light_direction.x, light_direction.y, light_direction.z, 0.0],
            light_color: LIGHT_COLOR,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytes_of(&globals));

        for (object, slot) in self.stage.objects.iter().zip(&self.object_slots) {
            let material = &self.stage.materials[object.material_index];
            let uniforms = ObjectUniforms {
                model: object.model_matrix().into(),
                color: [material.color.x, material.color.y, material.color.z, 1.0],
                shaded: [if material.shaded { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
            };
            self.queue.write_buffer(&slot.buffer, 0, bytes_of(&uniforms));
        }

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Encoder"),
        });

        {
            let primitives = self.update_egui(&mut encoder);
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Stage Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        // 배경이 비치도록 알파 0으로 지움
                        load: LoadOp::Clear(Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 0.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            render_pass.set_bind_group(1, &self.gradient_bind_group, &[]);

            for (object, slot) in self.stage.objects.iter().zip(&self.object_slots) {
                if !object.visible {
                    continue;
                }

                let mesh = &self.meshes[object.mesh_index];
                render_pass.set_bind_group(2, &slot.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            self.egui_renderer
                .render(&mut render_pass, &primitives, &self.egui_screen);
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn update_egui(&mut self, encoder: &mut CommandEncoder) -> Vec<ClippedPrimitive> {
        let egui_input = self.egui_state.take_egui_input(&self.window);
        let egui_output = self.egui_context.run(egui_input, |ctx| {
            eframe::egui::SidePanel::right("debug-panel")
                .resizable(false)
                .default_width(160.0)
                .show(ctx, |ui| {
                    ui.label("material color");
                    let response = TextEdit::singleline(&mut self.parameters.material_color)
                        .clip_text(false)
                        .show(ui)
                        .response;

                    // 공유 재질 하나만 고치면 세 오브젝트 전부 바뀜
                    if response.changed() {
                        self.stage.set_material_color(&self.parameters.material_color);
                    }
                });
        });

        self.egui_state.handle_platform_output(
            &self.window,
            &self.egui_context,
            egui_output.platform_output,
        );
        let primitives = self.egui_context.tessellate(egui_output.shapes);
        egui_output.textures_delta.set.iter().for_each(|(id, delta)| {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        });

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &primitives,
            &self.egui_screen,
        );

        primitives
    }
}

fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("Depth Texture"),
        size: Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&TextureViewDescriptor::default());

    (texture, view)
}
