// Frame annotator: draws detection boxes and labels directly on RGB pixels.

use image::{Rgb, RgbImage};

use crate::detect::Detection;

const BOX_COLOR: Rgb<u8> = Rgb([230, 57, 70]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BOX_THICKNESS: i32 = 2;
const CORNER_RADIUS: i32 = 6;

const GLYPH_HEIGHT: i32 = 7;
const GLYPH_ADVANCE: i32 = 6;

/// Draw boxes and labels for all detections on a copy of the frame. The
/// input frame is left untouched.
pub fn draw_detections(frame: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut canvas = frame.clone();
    for det in detections {
        let x1 = det.bbox.x.round() as i32;
        let y1 = det.bbox.y.round() as i32;
        let x2 = (det.bbox.x + det.bbox.w).round() as i32;
        let y2 = (det.bbox.y + det.bbox.h).round() as i32;

        draw_round_rect(&mut canvas, x1, y1, x2, y2);
        draw_label(&mut canvas, x1, y1, &det.label());
    }
    canvas
}

fn put_pixel_clamped(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i32 && y < img.height() as i32 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Rectangle outline with rounded corners.
fn draw_round_rect(img: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32) {
    let radius = CORNER_RADIUS.min((x2 - x1) / 2).min((y2 - y1) / 2).max(0);

    for t in 0..BOX_THICKNESS {
        let (x1, y1, x2, y2) = (x1 + t, y1 + t, x2 - t, y2 - t);
        if x2 <= x1 || y2 <= y1 {
            break;
        }

        for x in (x1 + radius)..=(x2 - radius) {
            put_pixel_clamped(img, x, y1, BOX_COLOR);
            put_pixel_clamped(img, x, y2, BOX_COLOR);
        }
        for y in (y1 + radius)..=(y2 - radius) {
            put_pixel_clamped(img, x1, y, BOX_COLOR);
            put_pixel_clamped(img, x2, y, BOX_COLOR);
        }
        draw_corner_arcs(img, x1, y1, x2, y2, radius);
    }
}

/// Quarter-circle arcs joining the straight edges, midpoint circle walk.
fn draw_corner_arcs(img: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32, radius: i32) {
    let mut x = 0;
    let mut y = radius;
    let mut d = 1 - radius;

    while x <= y {
        for (dx, dy) in [(x, y), (y, x)] {
            put_pixel_clamped(img, x1 + radius - dx, y1 + radius - dy, BOX_COLOR);
            put_pixel_clamped(img, x2 - radius + dx, y1 + radius - dy, BOX_COLOR);
            put_pixel_clamped(img, x1 + radius - dx, y2 - radius + dy, BOX_COLOR);
            put_pixel_clamped(img, x2 - radius + dx, y2 - radius + dy, BOX_COLOR);
        }
        if d < 0 {
            d += 2 * x + 3;
        } else {
            d += 2 * (x - y) + 5;
            y -= 1;
        }
        x += 1;
    }
}

fn fill_rect(img: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb<u8>) {
    for y in y1..=y2 {
        for x in x1..=x2 {
            put_pixel_clamped(img, x, y, color);
        }
    }
}

/// Filled label bar anchored above the box (below when clipped at the top).
fn draw_label(img: &mut RgbImage, x: i32, box_top: i32, text: &str) {
    let bar_w = text.chars().count() as i32 * GLYPH_ADVANCE + 4;
    let bar_h = GLYPH_HEIGHT + 4;
    let top = if box_top - bar_h >= 0 {
        box_top - bar_h
    } else {
        box_top
    };

    fill_rect(img, x, top, x + bar_w, top + bar_h, BOX_COLOR);

    let mut cx = x + 2;
    for ch in text.chars().flat_map(|c| c.to_uppercase()) {
        if let Some(glyph) = glyph_bits(ch) {
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..5 {
                    if (bits >> (4 - col)) & 1 == 1 {
                        put_pixel_clamped(img, cx + col, top + 2 + row as i32, TEXT_COLOR);
                    }
                }
            }
        }
        cx += GLYPH_ADVANCE;
    }
}

fn glyph_bits(ch: char) -> Option<[u8; 7]> {
    match ch {
        'A' => Some([
            0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001,
        ]),
        'B' => Some([
            0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110,
        ]),
        'C' => Some([
            0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110,
        ]),
        'D' => Some([
            0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110,
        ]),
        'E' => Some([
            0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111,
        ]),
        'F' => Some([
            0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000,
        ]),
        'G' => Some([
            0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111,
        ]),
        'H' => Some([
            0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001,
        ]),
        'I' => Some([
            0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110,
        ]),
        'J' => Some([
            0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100,
        ]),
        'K' => Some([
            0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001,
        ]),
        'L' => Some([
            0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111,
        ]),
        'M' => Some([
            0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001,
        ]),
        'N' => Some([
            0b10001, 0b11001, 0b10101, 0b10101, 0b10011, 0b10001, 0b10001,
        ]),
        'O' => Some([
            0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110,
        ]),
        'P' => Some([
            0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000,
        ]),
        'Q' => Some([
            0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101,
        ]),
        'R' => Some([
            0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001,
        ]),
        'S' => Some([
            0b01111, 0b10000, 0b01110, 0b00001, 0b00001, 0b10001, 0b01110,
        ]),
        'T' => Some([
            0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100,
        ]),
        'U' => Some([
            0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110,
        ]),
        'V' => Some([
            0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100,
        ]),
        'W' => Some([
            0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001,
        ]),
        'X' => Some([
            0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b01010, 0b10001,
        ]),
        'Y' => Some([
            0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100,
        ]),
        'Z' => Some([
            0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111,
        ]),
        '0' => Some([
            0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110,
        ]),
        '1' => Some([
            0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110,
        ]),
        '2' => Some([
            0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111,
        ]),
        '3' => Some([
            0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110,
        ]),
        '4' => Some([
            0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010,
        ]),
        '5' => Some([
            0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110,
        ]),
        '6' => Some([
            0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110,
        ]),
        '7' => Some([
            0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000,
        ]),
        '8' => Some([
            0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110,
        ]),
        '9' => Some([
            0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100,
        ]),
        '.' => Some([
            0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100,
        ]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BBox, Detection};
    use image::Rgb;

    fn detection(x: f32, y: f32, w: f32, h: f32) -> Detection {
        Detection {
            bbox: BBox { x, y, w, h },
            confidence: 0.9,
            class_id: 0,
            class_name: Some("pothole".to_string()),
        }
    }

    #[test]
    fn annotation_copies_and_marks_the_frame() {
        let frame = RgbImage::from_pixel(320, 180, Rgb([10, 10, 10]));
        let annotated = draw_detections(&frame, &[detection(40.0, 40.0, 80.0, 60.0)]);

        // Source frame untouched
        assert!(frame.pixels().all(|p| p.0 == [10, 10, 10]));
        // Annotated copy has box pixels and the same dimensions
        assert_eq!(annotated.dimensions(), frame.dimensions());
        assert!(annotated.pixels().any(|p| p.0 == BOX_COLOR.0));
    }

    #[test]
    fn no_detections_yields_identical_copy() {
        let frame = RgbImage::from_pixel(64, 64, Rgb([42, 42, 42]));
        let annotated = draw_detections(&frame, &[]);
        assert_eq!(annotated.as_raw(), frame.as_raw());
    }

    #[test]
    fn boxes_near_edges_do_not_panic() {
        let frame = RgbImage::new(100, 100);
        // Partially and fully out-of-bounds boxes
        let dets = vec![
            detection(-20.0, -20.0, 60.0, 60.0),
            detection(80.0, 80.0, 50.0, 50.0),
        ];
        let annotated = draw_detections(&frame, &dets);
        assert_eq!(annotated.dimensions(), (100, 100));
    }

    #[test]
    fn font_covers_label_characters() {
        for ch in "POTHOLE 0.123456789".chars() {
            if ch == ' ' {
                continue;
            }
            assert!(glyph_bits(ch).is_some(), "missing glyph for {ch:?}");
        }
    }
}
