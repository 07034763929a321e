//! RGB/HSL conversion used by the hue-cycling light.

use ultraviolet::Vec3;

/// Converts an RGB colour (components in [0, 1]) to HSL.
/// Hue is in degrees [0, 360); saturation and lightness are in [0, 1].
pub fn rgb_to_hsl(rgb: Vec3) -> (f32, f32, f32) {
    let max = rgb.x.max(rgb.y).max(rgb.z);
    let min = rgb.x.min(rgb.y).min(rgb.z);
    let lightness = (max + min) / 2.0;

    let chroma = max - min;
    if chroma <= f32::EPSILON {
        // Achromatic; hue is undefined, report 0
        return (0.0, 0.0, lightness);
    }

    let saturation = if lightness > 0.5 {
        chroma / (2.0 - max - min)
    } else {
        chroma / (max + min)
    };

    let hue = if max == rgb.x {
        (rgb.y - rgb.z) / chroma
    } else if max == rgb.y {
        (rgb.z - rgb.x) / chroma + 2.0
    } else {
        (rgb.x - rgb.y) / chroma + 4.0
    };

    ((hue * 60.0).rem_euclid(360.0), saturation, lightness)
}

/// Converts an HSL colour back to RGB. Hue may be any angle in degrees;
/// it is wrapped modulo 360 first.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    if saturation <= f32::EPSILON {
        return Vec3::new(lightness, lightness, lightness);
    }

    let hue = hue.rem_euclid(360.0) / 360.0;
    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    Vec3::new(
        hue_to_channel(p, q, hue + 1.0 / 3.0),
        hue_to_channel(p, q, hue),
        hue_to_channel(p, q, hue - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < TOLERANCE, "{} != {}", a, b);
    }

    #[test]
    fn primary_colours_round_trip() {
        let red = Vec3::new(1.0, 0.0, 0.0);
        let (h, s, l) = rgb_to_hsl(red);
        assert_close(h, 0.0);
        assert_close(s, 1.0);
        assert_close(l, 0.5);
        let back = hsl_to_rgb(h, s, l);
        assert_close(back.x, 1.0);
        assert_close(back.y, 0.0);
        assert_close(back.z, 0.0);

        let (h, _, _) = rgb_to_hsl(Vec3::new(0.0, 1.0, 0.0));
        assert_close(h, 120.0);
        let (h, _, _) = rgb_to_hsl(Vec3::new(0.0, 0.0, 1.0));
        assert_close(h, 240.0);
    }

    #[test]
    fn achromatic_has_zero_saturation() {
        let (h, s, l) = rgb_to_hsl(Vec3::new(0.25, 0.25, 0.25));
        assert_close(h, 0.0);
        assert_close(s, 0.0);
        assert_close(l, 0.25);
        let back = hsl_to_rgb(h, s, l);
        assert_close(back.x, 0.25);
        assert_close(back.y, 0.25);
        assert_close(back.z, 0.25);
    }

    #[test]
    fn hue_increments_cycle_modulo_360() {
        // Repeatedly applying the hue step used by the colour-changing light
        // must come back to the starting colour after a whole turn, keeping
        // saturation and lightness intact.
        let mut colour = Vec3::new(1.0, 0.0, 0.0);
        let (_, s0, l0) = rgb_to_hsl(colour);
        for _ in 0..180 {
            let (h, s, l) = rgb_to_hsl(colour);
            assert!((s - s0).abs() < 1e-3);
            assert!((l - l0).abs() < 1e-3);
            colour = hsl_to_rgb(h + 2.0, s, l);
        }
        assert!((colour.x - 1.0).abs() < 1e-2);
        assert!(colour.y.abs() < 1e-2);
        assert!(colour.z.abs() < 1e-2);
    }

    #[test]
    fn hue_wraps_at_360() {
        let a = hsl_to_rgb(30.0, 0.8, 0.4);
        let b = hsl_to_rgb(390.0, 0.8, 0.4);
        assert_close(a.x, b.x);
        assert_close(a.y, b.y);
        assert_close(a.z, b.z);
    }
}
