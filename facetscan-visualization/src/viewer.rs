//! Windowed point cloud viewer

use std::sync::Arc;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::Key,
    window::WindowBuilder,
};

use crate::camera::Camera;
use crate::renderer::{
    colored_point_cloud_to_vertices, point_cloud_to_vertices, PointCloudRenderer, PointVertex,
    RenderConfig,
};
use facetscan_core::{ColoredPoint3f, Drawable, Error, Point3f, PointCloud, Result};

/// Types of data that can be displayed
#[derive(Debug, Clone)]
pub enum ViewData {
    Empty,
    PointCloud(PointCloud<Point3f>),
    ColoredPointCloud(PointCloud<ColoredPoint3f>),
}

/// Interactive point cloud viewer
///
/// Controls: left-drag orbits, right-drag pans, scroll zooms, `R` resets the
/// camera.
pub struct Viewer {
    current_data: ViewData,
    camera: Camera,
    last_mouse_pos: Option<PhysicalPosition<f64>>,
    mouse_pressed: bool,
    right_mouse_pressed: bool,
    uniform_color: [f32; 3],
}

impl Viewer {
    /// Create a new viewer
    pub fn new() -> Result<Self> {
        Ok(Self {
            current_data: ViewData::Empty,
            camera: Camera::default(),
            last_mouse_pos: None,
            mouse_pressed: false,
            right_mouse_pressed: false,
            uniform_color: [0.9, 0.9, 0.9],
        })
    }

    /// Set point cloud data, rendered with a uniform color
    pub fn set_point_cloud(&mut self, cloud: &PointCloud<Point3f>) {
        self.fit_camera_to(cloud);
        self.current_data = ViewData::PointCloud(cloud.clone());
    }

    /// Set colored point cloud data
    pub fn set_colored_point_cloud(&mut self, cloud: &PointCloud<ColoredPoint3f>) {
        self.fit_camera_to(cloud);
        self.current_data = ViewData::ColoredPointCloud(cloud.clone());
    }

    fn fit_camera_to<T>(&mut self, cloud: &PointCloud<T>)
    where
        T: Clone + Copy,
        Point3f: From<T>,
    {
        if cloud.is_empty() {
            return;
        }
        let (min, max) = cloud.bounding_box();
        let center = cloud.center();
        let radius = (max - min).norm() * 0.5;
        self.camera.fit(center, radius);
    }

    /// Open the window and run the viewer until it is closed
    pub fn run(mut self) -> Result<()> {
        let vertices: Vec<PointVertex> = match &self.current_data {
            ViewData::PointCloud(cloud) => point_cloud_to_vertices(cloud, self.uniform_color),
            ViewData::ColoredPointCloud(cloud) => colored_point_cloud_to_vertices(cloud),
            ViewData::Empty => Vec::new(),
        };

        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title("facetscan viewer")
                .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let mut renderer =
            pollster::block_on(PointCloudRenderer::new(window.clone(), RenderConfig::default()))?;

        let size = window.inner_size();
        self.camera.aspect_ratio = size.width.max(1) as f32 / size.height.max(1) as f32;

        event_loop
            .run(move |event, target| {
                target.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::AboutToWait => window.request_redraw(),
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::CloseRequested => {
                            target.exit();
                        }
                        WindowEvent::Resized(new_size) => {
                            renderer.resize(new_size);
                            self.camera.aspect_ratio =
                                new_size.width.max(1) as f32 / new_size.height.max(1) as f32;
                        }
                        WindowEvent::MouseInput { state, button, .. } => match button {
                            MouseButton::Left => {
                                self.mouse_pressed = state == ElementState::Pressed;
                            }
                            MouseButton::Right => {
                                self.right_mouse_pressed = state == ElementState::Pressed;
                            }
                            _ => {}
                        },
                        WindowEvent::CursorMoved { position, .. } => {
                            if let Some(last_pos) = self.last_mouse_pos {
                                let delta_x = (position.x - last_pos.x) as f32;
                                let delta_y = (position.y - last_pos.y) as f32;

                                if self.mouse_pressed {
                                    self.camera.orbit(delta_x * 0.01, delta_y * 0.01);
                                } else if self.right_mouse_pressed {
                                    self.camera.pan(delta_x * 0.002, delta_y * 0.002);
                                }
                            }
                            self.last_mouse_pos = Some(position);
                        }
                        WindowEvent::MouseWheel { delta, .. } => {
                            let scroll_delta = match delta {
                                winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                                winit::event::MouseScrollDelta::PixelDelta(pos) => {
                                    pos.y as f32 / 100.0
                                }
                            };
                            self.camera.zoom(scroll_delta * 0.1);
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed {
                                if let Key::Character(c) = &event.logical_key {
                                    if matches!(c.as_str(), "r" | "R") {
                                        self.camera.reset();
                                    }
                                }
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            renderer.update_camera(
                                self.camera.view_matrix(),
                                self.camera.projection_matrix(),
                                self.camera.position.coords,
                            );

                            if !vertices.is_empty() {
                                if let Err(e) = renderer.render(&vertices) {
                                    eprintln!("Render error: {}", e);
                                }
                            }
                        }
                        _ => {}
                    },
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))?;

        Ok(())
    }
}
