use super::*;

#[test]
fn quality_tiers_map_to_bitrate_and_resolution() {
    assert_eq!(Quality::Low.bitrate_bps(), 1_000_000);
    assert_eq!(Quality::Medium.bitrate_bps(), 2_500_000);
    assert_eq!(Quality::High.bitrate_bps(), 5_000_000);
    assert_eq!(Quality::Ultra.bitrate_bps(), 12_000_000);
    assert_eq!(Quality::Low.resolution(), (640, 360));
    assert_eq!(Quality::Ultra.resolution(), (3840, 2160));
    assert_eq!(" HIGH ".parse::<Quality>().unwrap(), Quality::High);
    assert!("extreme".parse::<Quality>().is_err());
}

#[test]
fn duration_parsing_falls_back_to_five_seconds() {
    assert_eq!(ExportSettings::parse_duration("2.5"), 2.5);
    assert_eq!(ExportSettings::parse_duration(" 10 "), 10.0);
    assert_eq!(ExportSettings::parse_duration("abc"), 5.0);
    assert_eq!(ExportSettings::parse_duration("0"), 5.0);
    assert_eq!(ExportSettings::parse_duration("-3"), 5.0);
    assert_eq!(ExportSettings::parse_duration("NaN"), 5.0);
}

#[test]
fn total_frames_rounds_and_rejects_bad_durations() {
    let fps = Fps::whole(24).unwrap();
    assert_eq!(ExportSettings::new(5.0, fps).total_frames().unwrap(), 120);
    assert_eq!(ExportSettings::new(0.03, fps).total_frames().unwrap(), 1);
    assert_eq!(ExportSettings::new(0.01, fps).total_frames().unwrap(), 0);
    assert!(ExportSettings::new(0.0, fps).total_frames().is_err());
    assert!(ExportSettings::new(f64::INFINITY, fps).total_frames().is_err());
}

#[test]
fn defaults_and_serde() {
    let s = ExportSettings::default();
    assert_eq!(s.frame_rate, Fps::whole(24).unwrap());
    assert_eq!(s.duration_secs, 5.0);
    assert_eq!(s.quality, Quality::Medium);

    let parsed: ExportSettings = serde_json::from_str(
        r#"{"frame_rate":{"num":30,"den":1},"duration_secs":2.0,"quality":"ultra"}"#,
    )
    .unwrap();
    assert_eq!(parsed.quality, Quality::Ultra);
    assert_eq!(parsed.total_frames().unwrap(), 60);
}

#[test]
fn sources_fit_inside_the_quality_resolution() {
    let fps = Fps::whole(24).unwrap();
    let medium = ExportSettings::new(1.0, fps);
    assert_eq!(medium.fit_to_quality(640, 360).unwrap(), (1280, 720));
    assert_eq!(medium.fit_to_quality(1080, 1920).unwrap(), (404, 720));
    assert_eq!(medium.fit_to_quality(3000, 1000).unwrap(), (1280, 426));

    let low = medium.with_quality(Quality::Low);
    assert_eq!(low.fit_to_quality(1920, 1080).unwrap(), (640, 360));
    assert!(low.fit_to_quality(0, 10).is_err());
}
