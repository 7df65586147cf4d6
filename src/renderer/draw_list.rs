//! Recorded draw calls
//!
//! A canvas that keeps every draw in order instead of rasterising it. The
//! native runner uses it to report frame contents; a GPU backend can replay it
//! as one sprite batch.

use super::{Canvas, SpriteHandle};
use crate::sim::rect::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub sprite: SpriteHandle,
    pub dest: Rect,
}

#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Start a new frame
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for DrawList {
    fn draw(&mut self, sprite: SpriteHandle, dest: Rect) {
        self.commands.push(DrawCommand { sprite, dest });
    }
}
