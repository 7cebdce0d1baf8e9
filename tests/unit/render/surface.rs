use super::*;

fn checker(w: u32, h: u32) -> SourceImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            if (x + y) % 2 == 0 {
                data.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 128, 128]);
            }
        }
    }
    SourceImage::from_premul(w, h, data).unwrap()
}

#[test]
fn new_rejects_empty_and_oversized_surfaces() {
    assert!(matches!(
        Surface::new(0, 10),
        Err(FramefxError::SurfaceAcquisition(_))
    ));
    assert!(matches!(
        Surface::new(10, 70_000),
        Err(FramefxError::SurfaceAcquisition(_))
    ));
    let s = Surface::new(4, 3).unwrap();
    assert_eq!((s.width(), s.height()), (4, 3));
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn identity_draw_reproduces_source_exactly() {
    let src = checker(6, 5);
    let mut s = Surface::for_source(&src).unwrap();
    s.draw_source(&src, Affine::IDENTITY, 1.0).unwrap();
    assert_eq!(s.data(), src.rgba8_premul());
}

#[test]
fn translated_past_the_edge_leaves_surface_clear() {
    let src = checker(6, 5);
    let mut s = Surface::for_source(&src).unwrap();
    s.draw_source(&src, Affine::translate((6.0, 0.0)), 1.0)
        .unwrap();
    assert!(s.data().iter().all(|&b| b == 0));

    s.draw_source(&src, Affine::translate((-2.0, 0.0)), 1.0)
        .unwrap();
    // Column 0 now holds what was column 2.
    assert_eq!(&s.data()[0..4], &src.rgba8_premul()[8..12]);
    // The rightmost two columns are uncovered.
    let last = ((6 - 1) * 4) as usize;
    assert_eq!(&s.data()[last..last + 4], &[0, 0, 0, 0]);
}

#[test]
fn zero_opacity_draws_nothing() {
    let src = SourceImage::solid(3, 3, [10, 20, 30, 255]).unwrap();
    let mut s = Surface::for_source(&src).unwrap();
    s.draw_source(&src, Affine::IDENTITY, 0.0).unwrap();
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn scaled_draw_goes_through_the_rasterizer() {
    let src = SourceImage::solid(8, 8, [0, 255, 0, 255]).unwrap();
    let mut s = Surface::for_source(&src).unwrap();
    let t = Affine::translate((4.0, 4.0)) * Affine::scale(0.5) * Affine::translate((-4.0, -4.0));
    s.draw_source(&src, t, 1.0).unwrap();

    let px = |x: usize, y: usize| {
        let i = (y * 8 + x) * 4;
        [s.data()[i], s.data()[i + 1], s.data()[i + 2], s.data()[i + 3]]
    };
    assert_eq!(px(0, 0)[3], 0);
    assert_eq!(px(4, 4)[1], 255);
    assert_eq!(px(4, 4)[3], 255);
}

#[test]
fn snapshot_and_read_back_match_current_pixels() {
    let mut s = Surface::new(2, 2).unwrap();
    s.fill([1, 2, 3, 4]);
    let snap = s.snapshot();
    assert_eq!(snap.width(), 2);
    assert_eq!(snap.rgba8_premul(), s.data());

    let frame = s.to_frame();
    assert!(frame.premultiplied);
    assert_eq!(frame.data, [1, 2, 3, 4].repeat(4));

    s.clear();
    assert!(s.data().iter().all(|&b| b == 0));
    // The snapshot is an independent copy.
    assert_eq!(&snap.rgba8_premul()[0..4], &[1, 2, 3, 4]);
}

#[test]
fn mismatched_buffers_are_rejected() {
    assert!(matches!(
        SourceImage::from_premul(2, 2, vec![0; 15]),
        Err(FramefxError::Validation(_))
    ));
    assert!(matches!(
        SourceImage::from_premul(0, 2, vec![]),
        Err(FramefxError::Validation(_))
    ));
}

#[test]
fn straight_input_is_premultiplied() {
    let frame = VideoFrame::from_rgba8(1, 1, vec![200, 100, 50, 128], 40_000).unwrap();
    assert_eq!(frame.timestamp_us, 40_000);
    let px = frame.rgba8_premul();
    assert_eq!(px[3], 128);
    assert!(px[0] < 200 && px[0] >= 99);
}

#[test]
fn decode_reads_png_bytes() {
    let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    let decoded = SourceImage::decode(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (2, 1));
    assert_eq!(decoded.rgba8_premul(), &[255, 0, 0, 255, 0, 0, 255, 255]);

    assert!(SourceImage::decode(b"not an image").is_err());
}

#[test]
fn resized_keeps_solid_color_and_takes_new_size() {
    let src = SourceImage::solid(8, 4, [100, 50, 25, 200]).unwrap();
    let small = src.resized(4, 2).unwrap();
    assert_eq!((small.width(), small.height()), (4, 2));
    assert!(small.rgba8_premul().chunks_exact(4).all(|p| p == [100, 50, 25, 200]));

    assert_eq!(src.resized(8, 4).unwrap(), src);
    assert!(src.resized(0, 4).is_err());
}
