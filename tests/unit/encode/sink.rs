use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::whole(24).unwrap(),
        total_frames: 2,
        quality: Quality::Low,
    }
}

fn frame(index: u64) -> ExportFrame {
    ExportFrame {
        index,
        timestamp_us: index * 41_666,
        duration_us: 41_666,
        progress: index as f64,
    }
}

fn pixels(width: u32, height: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("framefx_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn in_memory_sink_keeps_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(frame(0), &pixels(1, 1, [0, 0, 0, 0])).unwrap();
    sink.push_frame(frame(1), &pixels(1, 1, [9, 9, 9, 9])).unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config().unwrap().total_frames, 2);
    let idx: Vec<u64> = sink.frames().iter().map(|(f, _)| f.index).collect();
    assert_eq!(idx, vec![0, 1]);
}

#[test]
fn png_sink_unpremultiplies_and_writes_files() {
    let dir = temp_dir("png_sink");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(2, 1)).unwrap();
    sink.push_frame(frame(0), &pixels(2, 1, [64, 0, 0, 128]))
        .unwrap();
    sink.end().unwrap();

    let path = sink.frame_path(0);
    assert!(path.ends_with("frame_00000.png"));
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    let px = img.get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!((i32::from(px[0]) - 128).abs() <= 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn png_sink_rejects_wrong_sizes() {
    let dir = temp_dir("png_size");
    let mut sink = PngSequenceSink::new(&dir);
    assert!(
        sink.push_frame(frame(0), &pixels(2, 2, [0, 0, 0, 255]))
            .is_err()
    );
    sink.begin(cfg(2, 2)).unwrap();
    assert!(matches!(
        sink.push_frame(frame(0), &pixels(3, 2, [0, 0, 0, 255])),
        Err(FramefxError::Validation(_))
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn png_sink_abort_removes_written_frames() {
    let dir = temp_dir("png_abort");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(frame(0), &pixels(1, 1, [1, 2, 3, 255]))
        .unwrap();
    sink.push_frame(frame(1), &pixels(1, 1, [1, 2, 3, 255]))
        .unwrap();
    assert_eq!(sink.written().len(), 2);

    sink.abort();
    assert!(sink.written().is_empty());
    assert!(!sink.frame_path(0).exists());
    assert!(!sink.frame_path(1).exists());
    let _ = std::fs::remove_dir_all(&dir);
}
