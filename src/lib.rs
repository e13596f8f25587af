use cfg_if::cfg_if;
use wgpu::SurfaceError;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

mod app;
mod camera;
mod util;
pub mod vitrine;

pub use app::Application;

// wasm32 환경에서만 wasm_bindgen 활용
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// wasm 연결시 아래 함수를 시작점으로 삼도록 함.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn start() {
    // 로거 초기화
    cfg_if! {
        // 만약 현재 환경이 wasm32라면
        if #[cfg(target_arch = "wasm32")] {
            // panic 발생시 웹 브라우저의 console.err에 로그 띄우기
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            console_log::init_with_level(log::Level::Debug).expect("로거 초기화 실패");
        } else {
            // 아니면 기본적인 로거만 불러오기
            env_logger::init();
        }
    }

    cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            wasm_bindgen_futures::spawn_local(run());
        } else {
            pollster::block_on(run());
        }
    }
}

pub async fn run() {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Vitrine")
        .build(&event_loop)
        .unwrap();

    #[cfg(target_arch = "wasm32")]
    {
        // 브라우저에선 만들어진 캔버스를 문서에 직접 붙여야 함
        use winit::dpi::PhysicalSize;
        use winit::platform::web::WindowExtWebSys;

        window.set_inner_size(PhysicalSize::new(1280, 720));
        web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| {
                let destination = doc.get_element_by_id("vitrine")?;
                let canvas = web_sys::Element::from(window.canvas());
                destination.append_child(&canvas).ok()?;
                Some(())
            })
            .expect("캔버스를 문서에 붙이지 못함");
    }

    let mut application = Application::new(window, &event_loop).await;

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == application.window.id() => {
            if !application.input(event) {
                match event {
                    // 만약 앱을 운영체제에서 닫으려고 하거나, 눌러진 키가 ESC라면 나가기
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        input: KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                        ..
                    } => *control_flow = ControlFlow::ExitWithCode(0),

                    WindowEvent::Resized(physical_size) => application.resize(*physical_size),
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        application.resize(**new_inner_size)
                    }

                    _ => {}
                }
            }
        }

        Event::RedrawRequested(window_id) if window_id == application.window.id() => {
            application.update();
            match application.render() {
                Ok(_) => {}
                // surface를 잃었으면 다시 설정해서 복구
                Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                    application.resize(application.size)
                }
                Err(SurfaceError::OutOfMemory) => *control_flow = ControlFlow::ExitWithCode(1),
                Err(error) => log::warn!("프레임 렌더링 실패: {error:?}"),
            }
        }

        // 다음 프레임 예약. 루프는 창이 닫힐 때까지 스스로를 다시 굴림
        Event::MainEventsCleared => application.window.request_redraw(),

        _ => {}
    });
}
