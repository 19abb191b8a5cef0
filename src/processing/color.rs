use image::Rgb;

/// Linearize one sRGB channel given in [0, 1].
#[inline]
fn linearize(channel: f64) -> f64 {
    if channel <= 0.03928 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of an sRGB color, in [0, 1].
pub fn relative_luminance(rgb: Rgb<u8>) -> f64 {
    let [r, g, b] = rgb.0.map(|c| linearize(f64::from(c) / 255.0));
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Hue in degrees [0, 360), saturation and lightness in [0, 1].
pub fn to_hsl(rgb: Rgb<u8>) -> [f32; 3] {
    let [r, g, b] = rgb.0.map(|c| f32::from(c) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    if delta <= f32::EPSILON {
        return [0.0, 0.0, l];
    }

    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    [(h * 60.0).rem_euclid(360.0), s.clamp(0.0, 1.0), l]
}

pub fn to_hex(rgb: Rgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}
