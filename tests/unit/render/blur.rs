use super::*;
use crate::render::surface::SourceImage;

fn split_source(w: u32, h: u32) -> SourceImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _y in 0..h {
        for x in 0..w {
            let v = if x < w / 2 { 255 } else { 0 };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    SourceImage::from_premul(w, h, data).unwrap()
}

fn blurred(src: &SourceImage, radius: u32) -> Surface {
    let mut surface = Surface::for_source(src).unwrap();
    draw_blurred(&mut surface, src, radius).unwrap();
    surface
}

fn px(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * surface.width() + x) * 4) as usize;
    let d = surface.data();
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

#[test]
fn zero_radius_draws_the_source_unchanged() {
    assert!(blur_taps(0).is_empty());
    let src = split_source(10, 6);
    assert_eq!(blurred(&src, 0).data(), src.rgba8_premul());
}

#[test]
fn taps_come_in_mirrored_pairs_with_falling_weights() {
    for radius in [1, 3, 8, 24] {
        let taps = blur_taps(radius);
        assert!(!taps.is_empty());
        for t in &taps {
            assert!(
                taps.iter()
                    .any(|m| (m.dx, m.dy) == (-t.dx, -t.dy) && m.weight == t.weight),
                "radius={radius} tap={t:?}"
            );
            assert!(t.weight > 0.0 && t.weight < 1.0);
            assert!(t.dx.abs().max(t.dy.abs()) <= i64::from(radius));
        }
        let d2 = |t: &BlurTap| t.dx * t.dx + t.dy * t.dy;
        for pair in taps.windows(2) {
            if d2(&pair[1]) > d2(&pair[0]) {
                assert!(pair[1].weight <= pair[0].weight);
            }
        }
    }
}

#[test]
fn tap_count_is_bounded() {
    let most = (MAX_RINGS * TAPS_PER_RING) as usize;
    assert!(blur_taps(256).len() <= most);
    assert!(blur_taps(2).len() < blur_taps(24).len());
}

#[test]
fn edge_softens_and_stays_opaque() {
    let src = split_source(32, 8);
    let out = blurred(&src, 6);

    // Just left of the edge darkens, just right of it brightens.
    assert!(px(&out, 15, 4)[0] < 255);
    assert!(px(&out, 16, 4)[0] > 0);
    // Far from the edge nothing changes.
    assert_eq!(px(&out, 0, 4), [255, 255, 255, 255]);
    assert_eq!(px(&out, 31, 4), [0, 0, 0, 255]);
    assert!(out.data().chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn wider_radius_reaches_further() {
    let src = split_source(40, 8);
    let narrow = blurred(&src, 3);
    let wide = blur_radius(1.0, 12);
    let wide = blurred(&src, wide);

    assert_eq!(px(&narrow, 26, 4), [0, 0, 0, 255]);
    assert!(px(&wide, 26, 4)[0] > 0);
}

#[test]
fn radius_scales_with_amount() {
    assert_eq!(blur_radius(0.0, 24), 0);
    assert_eq!(blur_radius(1.0, 24), 24);
    assert_eq!(blur_radius(0.5, 24), 12);
    assert_eq!(blur_radius(f64::NAN, 24), 0);
    assert_eq!(blur_radius(3.0, 24), 24);
    let mut last = 0;
    for i in 0..=20 {
        let r = blur_radius(f64::from(i) / 20.0, 24);
        assert!(r >= last);
        last = r;
    }
}
