//! SDL2 window surface for interactive use.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::surface::Surface;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

// Packed ABGR is R, G, B, A in memory on little-endian targets, matching the
// pixel buffer layout.
const PIXEL_FORMAT: PixelFormatEnum = PixelFormatEnum::ABGR8888;

/// Window events the render loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Close button or Escape.
    Quit,
    Resized { width: u32, height: u32 },
}

impl WindowEvent {
    fn from_sdl(event: &Event) -> Option<Self> {
        match event {
            Event::Quit { .. } => Some(Self::Quit),
            Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            } => Some(Self::Quit),
            Event::Window {
                win_event: sdl2::event::WindowEvent::Resized(w, h),
                ..
            } => Some(Self::Resized {
                width: (*w).max(1) as u32,
                height: (*h).max(1) as u32,
            }),
            _ => None,
        }
    }
}

pub struct Window {
    // Field order matters: the texture borrows from the creator and must drop first.
    texture: Texture<'static>,
    texture_creator: Box<TextureCreator<WindowContext>>,
    canvas: Canvas<sdl2::video::Window>,
    event_pump: sdl2::EventPump,
    width: u32,
    height: u32,
}

fn surface_error(e: impl ToString) -> RenderError {
    RenderError::Surface(e.to_string())
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(surface_error)?;
        let video_subsystem = sdl_context.video().map_err(surface_error)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(surface_error)?;

        let canvas = window.into_canvas().build().map_err(surface_error)?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump().map_err(surface_error)?;
        let texture = Self::create_texture(&texture_creator, width, height)?;

        debug!(title, width, height, "window created");

        Ok(Self {
            texture,
            texture_creator,
            canvas,
            event_pump,
            width,
            height,
        })
    }

    fn create_texture(
        texture_creator: &TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Texture<'static>> {
        // SAFETY: the creator is boxed and owned by the Window, which drops the
        // texture before it (field order).
        let texture_creator: &'static TextureCreator<WindowContext> =
            unsafe { &*(texture_creator as *const _) };
        texture_creator
            .create_texture_streaming(PIXEL_FORMAT, width, height)
            .map_err(surface_error)
    }

    /// Next pending event the loop cares about. SDL events it skips over are
    /// discarded.
    pub fn next_event(&mut self) -> Option<WindowEvent> {
        self.event_pump
            .poll_iter()
            .find_map(|event| WindowEvent::from_sdl(&event))
    }
}

impl Surface for Window {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.texture = Self::create_texture(&self.texture_creator, width, height)?;
        self.width = width;
        self.height = height;
        debug!(width, height, "window texture resized");
        Ok(())
    }

    fn present(&mut self, rgba: &[u8]) -> Result<()> {
        self.texture
            .update(None, rgba, (self.width * 4) as usize)
            .map_err(surface_error)?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))
            .map_err(surface_error)?;
        self.canvas.present();
        Ok(())
    }
}
