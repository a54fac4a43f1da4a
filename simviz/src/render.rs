use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::BackendCoord;
use tracing::{debug, info};

use crate::error::{Result, VizError};
use crate::frame::{Frame, FrameLog};
use crate::plotters_ext::TileGlyph;

pub const DEFAULT_FRAME_DELAY_MS: u32 = 500;

/// Canvas geometry shared by every frame of an animation.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameLayout {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub font_size: u32,
    pub footer: bool,
}

impl Default for FrameLayout {
    fn default() -> Self {
        FrameLayout {
            width: 400,
            height: 440,
            tile_size: 20,
            font_size: 15,
            footer: true,
        }
    }
}

impl FrameLayout {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Top edge of the footer text: half a tile into the last two tile rows.
    pub fn footer_y(&self) -> i32 {
        let tile = self.tile_size as i32;
        self.height as i32 - 2 * tile + tile / 2
    }

    pub fn score_x(&self) -> i32 {
        self.height as i32 - self.width as i32 / 2
    }

    pub fn tile_corners(&self, x: usize, y: usize) -> (BackendCoord, BackendCoord) {
        let tile = self.tile_size as i32;
        let (x, y) = (x as i32, y as i32);
        ((x * tile, y * tile), ((x + 1) * tile, (y + 1) * tile))
    }
}

pub fn draw_frame<DB: DrawingBackend>(
    drawing_area: &DrawingArea<DB, Shift>,
    index: usize,
    frame: &Frame,
    layout: &FrameLayout,
) -> Result<()> {
    drawing_area.fill(&WHITE)?;

    if layout.footer {
        let foot_y = layout.footer_y();
        drawing_area.draw(&Text::new(
            format!("frame {}", index),
            (10, foot_y),
            ("sans-serif", layout.font_size),
        ))?;
        drawing_area.draw(&Text::new(
            format!("score: {}", frame.score),
            (layout.score_x(), foot_y),
            ("sans-serif", layout.font_size),
        ))?;
    }

    for (x, y, tile) in frame.tiles().filter(|(_, _, t)| t.is_known()) {
        let (upper_left, bottom_right) = layout.tile_corners(x, y);
        drawing_area.draw(&TileGlyph::new(upper_left, bottom_right, tile))?;
    }

    Ok(())
}

/// Files produced by [`render_animation`].
#[derive(Clone, Debug)]
pub struct Animation {
    pub frames: Vec<PathBuf>,
    pub gif: PathBuf,
}

/// Draws every frame to `frames_dir/frame{i}.png` and to a looping GIF.
pub fn render_animation(
    log: &FrameLog,
    frames_dir: &Path,
    gif_path: &Path,
    layout: &FrameLayout,
    delay_ms: u32,
) -> Result<Animation> {
    if log.is_empty() {
        return Err(VizError::EmptyFrameLog);
    }

    fs::create_dir_all(frames_dir).map_err(|e| VizError::io(frames_dir, e))?;

    let gif = BitMapBackend::gif(gif_path, layout.size(), delay_ms)
        .map_err(|e| VizError::Drawing(e.to_string()))?
        .into_drawing_area();

    let mut frames = Vec::with_capacity(log.len());
    for (i, frame) in log.frames.iter().enumerate() {
        let frame_path = frames_dir.join(format!("frame{}.png", i));
        {
            let root = BitMapBackend::new(&frame_path, layout.size()).into_drawing_area();
            draw_frame(&root, i, frame, layout)?;
            root.present()?;
        }

        draw_frame(&gif, i, frame, layout)?;
        gif.present()?;

        debug!(frame = i, path = %frame_path.display(), "rendered frame");
        frames.push(frame_path);
    }
    drop(gif);

    info!(
        frames = frames.len(),
        gif = %gif_path.display(),
        "wrote animation"
    );

    Ok(Animation {
        frames: frames,
        gif: gif_path.to_path_buf(),
    })
}
