//! Dark-mode recoloring: a pure per-pixel map over an RGBA buffer.
//!
//! Three branches per pixel, applied to the inverted channels with alpha left
//! untouched:
//!
//! 1. invert each channel;
//! 2. if all inverted channels are strictly above the glare threshold (the
//!    source pixel was near-black), soften them to cut glare;
//! 3. else if all are strictly below the shadow threshold (the source pixel
//!    was near-white page background), replace with the shadow tint so page
//!    background matches the viewer chrome instead of going pure black;
//! 4. otherwise keep the plain inversion.
//!
//! No dependency between pixels and no I/O. The map is one-way: re-applying
//! it to its own output does not reproduce the source, it is a stylistic
//! filter, not a reversible codec.

use crate::config::RecolorPalette;
use image::{Rgba, RgbaImage};

/// Recolor a single RGB triple. Exposed for tests and for callers that
/// process pixels outside an [`RgbaImage`] (e.g. a preview swatch).
#[inline]
pub fn recolor_rgb(r: u8, g: u8, b: u8, palette: &RecolorPalette) -> (u8, u8, u8) {
    let (ri, gi, bi) = (255 - r, 255 - g, 255 - b);
    let gt = palette.glare_threshold;
    let st = palette.shadow_threshold;

    if ri > gt && gi > gt && bi > gt {
        // A validated palette keeps glare_softening <= glare_threshold, so the
        // subtraction cannot underflow; saturate anyway for hand-built palettes.
        let s = palette.glare_softening;
        (
            ri.saturating_sub(s),
            gi.saturating_sub(s),
            bi.saturating_sub(s),
        )
    } else if ri < st && gi < st && bi < st {
        let [tr, tg, tb] = palette.shadow_tint;
        (tr, tg, tb)
    } else {
        (ri, gi, bi)
    }
}

/// Recolor a pixel buffer in place.
pub fn recolor_in_place(image: &mut RgbaImage, palette: &RecolorPalette) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (r, g, b) = recolor_rgb(r, g, b, palette);
        *pixel = Rgba([r, g, b, a]);
    }
}
