//! Tray icons for each capture state.

use std::sync::LazyLock;

use notavoz_core::CaptureState;

const ICON_SIZE: u32 = 32;
const COLOR_IDLE: (u8, u8, u8) = (148, 148, 148);
const COLOR_RECORDING: (u8, u8, u8) = (220, 54, 46);

static ICON_IDLE: LazyLock<tray_icon::Icon> = LazyLock::new(|| dot_icon(COLOR_IDLE));
static ICON_RECORDING: LazyLock<tray_icon::Icon> = LazyLock::new(|| dot_icon(COLOR_RECORDING));

pub fn tray_icon(state: CaptureState) -> tray_icon::Icon {
    match state {
        CaptureState::Idle => ICON_IDLE.clone(),
        CaptureState::Recording => ICON_RECORDING.clone(),
    }
}

/// Renders a filled dot in memory so the repo ships no image assets.
fn dot_icon((r, g, b): (u8, u8, u8)) -> tray_icon::Icon {
    let mut image = image::RgbaImage::new(ICON_SIZE, ICON_SIZE);
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 2.0;

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let alpha = if dx * dx + dy * dy <= radius * radius {
            255
        } else {
            0
        };
        *pixel = image::Rgba([r, g, b, alpha]);
    }

    tray_icon::Icon::from_rgba(image.into_raw(), ICON_SIZE, ICON_SIZE)
        .expect("Failed to build tray icon")
}
