use crate::braille::BrailleCanvas;

/// Draw a dam marker as a small cross of Braille dots.
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32) {
    for i in -size..=size {
        canvas.set_pixel_signed(x + i, y);
        canvas.set_pixel_signed(x, y + i);
    }
}

/// Draw a filled circle, used to emphasize the selected marker.
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_centered_on_its_position() {
        let mut canvas = BrailleCanvas::new(2, 1);
        draw_marker(&mut canvas, 1, 1, 1);
        // Cross at (1,1): pixels (0,1),(1,1),(2,1),(1,0),(1,2)
        assert_eq!(canvas.to_string(), "⠺⠂");
    }

    #[test]
    fn negative_coordinates_are_clipped() {
        let mut canvas = BrailleCanvas::new(1, 1);
        draw_marker(&mut canvas, 0, 0, 1);
        draw_circle(&mut canvas, -5, -5, 1);
        // Only the in-bounds arm pixels survive
        assert_eq!(canvas.to_string(), "⠋");
    }
}
