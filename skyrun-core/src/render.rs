//! Frame drawing in screen space. The run is only read; every world rect is
//! shifted by the scroll offset and anything fully off screen is culled.

use crate::geometry::Rect;
use crate::sim::{Body, Character, Run};
use crate::world::{LevelLayout, PlatformKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawKind {
    Ground,
    Platform,
    Hazard,
    Pickup,
    Player(Character),
}

pub trait DrawSurface {
    fn clear(&mut self, width: f32, height: f32);
    fn fill_rect(&mut self, rect: Rect, kind: DrawKind);
}

/// Draws back to front: platforms, hazards, pickups, then the player.
pub fn draw_frame<S: DrawSurface + ?Sized>(run: &Run, surface: &mut S) {
    let config = run.config();
    draw_scene(
        run.layout(),
        run.body(),
        run.summary().character,
        run.scroll(),
        (config.viewport_width, config.viewport_height),
        surface,
    );
}

fn draw_scene<S: DrawSurface + ?Sized>(
    layout: &LevelLayout,
    body: &Body,
    character: Character,
    scroll: f32,
    (width, height): (f32, f32),
    surface: &mut S,
) {
    surface.clear(width, height);

    let on_screen = |rect: &Rect| rect.right() > 0.0 && rect.x < width;
    let to_screen = |rect: Rect| rect.translated(-scroll, 0.0);

    for platform in &layout.platforms {
        let rect = to_screen(platform.rect);
        if on_screen(&rect) {
            let kind = match platform.kind {
                PlatformKind::Ground => DrawKind::Ground,
                PlatformKind::Floating => DrawKind::Platform,
            };
            surface.fill_rect(rect, kind);
        }
    }

    for rect in layout.hazards.iter().map(|hazard| to_screen(hazard.rect)) {
        if on_screen(&rect) {
            surface.fill_rect(rect, DrawKind::Hazard);
        }
    }

    for pickup in layout.pickups.iter().filter(|pickup| !pickup.collected) {
        let rect = to_screen(pickup.rect);
        if on_screen(&rect) {
            surface.fill_rect(rect, DrawKind::Pickup);
        }
    }

    surface.fill_rect(body.rect(), DrawKind::Player(character));
}
