//! Frame annotation.
//!
//! `annotate` turns a frame outcome into backend-neutral draw commands.
//! `render` rasterizes the shape commands onto a frame; text commands are left
//! to whatever surface displays them (the terminal status line, here).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::frame::Frame;
use crate::pipeline::FrameOutcome;
use crate::zone::{Point, SafetyState, Zone};

pub type Rgb = [u8; 3];

pub const RED: Rgb = [255, 0, 0];
pub const ORANGE: Rgb = [255, 165, 0];
pub const BLUE: Rgb = [0, 0, 255];
pub const GREEN: Rgb = [0, 255, 0];
pub const WHITE: Rgb = [255, 255, 255];

const ZONE_THICKNESS: u32 = 5;
const REGION_THICKNESS: u32 = 2;
const MARKER_RADIUS: u32 = 15;
pub const DANGER_BANNER: &str = "!!! DANGER DANGER !!!";

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Rectangle outline centred on the given edges.
    Rect {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Rgb,
        thickness: u32,
    },
    /// Filled disc.
    Disc {
        center: Point,
        radius: u32,
        color: Rgb,
    },
    Text {
        text: String,
        origin: Point,
        scale: f32,
        color: Rgb,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
    pub commands: Vec<DrawCommand>,
}

impl Overlay {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub fn zone_color(state: SafetyState) -> Rgb {
    match state {
        SafetyState::Danger => RED,
        SafetyState::Warning => ORANGE,
        SafetyState::Safe => BLUE,
    }
}

pub fn label_color(state: SafetyState) -> Rgb {
    match state {
        SafetyState::Danger => RED,
        SafetyState::Warning => ORANGE,
        SafetyState::Safe => GREEN,
    }
}

/// Build the overlay for one frame.
pub fn annotate(
    outcome: &FrameOutcome,
    zone: &Zone,
    width: u32,
    height: u32,
    fps: f64,
) -> Overlay {
    let (w, h) = (width as i32, height as i32);
    let mut commands = Vec::with_capacity(6);

    commands.push(DrawCommand::Rect {
        x1: zone.x1(),
        y1: zone.y1(),
        x2: zone.x2(),
        y2: zone.y2(),
        color: zone_color(outcome.state),
        thickness: ZONE_THICKNESS,
    });

    if let Some(region) = &outcome.region {
        let b = region.bounds;
        commands.push(DrawCommand::Rect {
            x1: b.min_x as i32,
            y1: b.min_y as i32,
            x2: b.max_x as i32,
            y2: b.max_y as i32,
            color: GREEN,
            thickness: REGION_THICKNESS,
        });
    }

    if let Some(point) = outcome.point {
        commands.push(DrawCommand::Disc {
            center: point,
            radius: MARKER_RADIUS,
            color: RED,
        });
    }

    commands.push(DrawCommand::Text {
        text: format!("State: {}", outcome.state),
        origin: Point::new(20, 50),
        scale: 1.5,
        color: label_color(outcome.state),
    });

    if outcome.state == SafetyState::Danger {
        commands.push(DrawCommand::Text {
            text: DANGER_BANNER.to_string(),
            origin: Point::new(w / 2 - 400, h / 2),
            scale: 2.5,
            color: RED,
        });
    }

    commands.push(DrawCommand::Text {
        text: format!("FPS: {:.2}", fps),
        origin: Point::new(w - 200, 50),
        scale: 1.0,
        color: WHITE,
    });

    Overlay { commands }
}

/// Rasterize rectangles and discs onto `frame`, clipped to its bounds.
///
/// Returns the number of commands drawn.
pub fn render(overlay: &Overlay, frame: &mut Frame) -> usize {
    let mut drawn = 0;
    for cmd in &overlay.commands {
        match cmd {
            DrawCommand::Rect {
                x1,
                y1,
                x2,
                y2,
                color,
                thickness,
            } => {
                let t = *thickness as i64;
                for offset in -(t / 2)..(t - t / 2) {
                    outline(
                        frame,
                        *x1 as i64 - offset,
                        *y1 as i64 - offset,
                        *x2 as i64 + offset,
                        *y2 as i64 + offset,
                        *color,
                    );
                }
                drawn += 1;
            }
            DrawCommand::Disc {
                center,
                radius,
                color,
            } => {
                let (cx, cy, r) = (center.x as i64, center.y as i64, *radius as i64);
                for y in cy - r..=cy + r {
                    for x in cx - r..=cx + r {
                        if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                            frame.put_pixel(x, y, *color);
                        }
                    }
                }
                drawn += 1;
            }
            DrawCommand::Text { .. } => {}
        }
    }
    drawn
}

/// File a DANGER snapshot of frame `seq` is written to.
pub fn snapshot_path(dir: &Path, seq: u64) -> PathBuf {
    dir.join(format!("danger_{:08}.png", seq))
}

/// Encode `frame` as PNG under `dir`, named by its sequence number.
pub fn save_snapshot(frame: &Frame, dir: &Path) -> Result<PathBuf> {
    let path = snapshot_path(dir, frame.seq);
    frame
        .to_rgb_image()?
        .save(&path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

fn outline(frame: &mut Frame, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgb) {
    if x1 > x2 || y1 > y2 {
        return;
    }
    for x in x1..=x2 {
        frame.put_pixel(x, y1, color);
        frame.put_pixel(x, y2, color);
    }
    for y in y1..=y2 {
        frame.put_pixel(x1, y, color);
        frame.put_pixel(x2, y, color);
    }
}
