use hound::{SampleFormat, WavSpec, WavWriter};
use peaklets::{pnpt, pnpt_with, Family, Mode};
use sanity_check::{parse_text, read_signal, synthetic_peaks, write_csv, Report};

#[test]
fn parses_text_signals() {
    let text = "# header\n1.0, 2.5 3\n\n4e-1,NaN\n";
    let v = parse_text(text).unwrap();
    assert_eq!(v.len(), 5);
    assert_eq!(&v[..4], &[1.0, 2.5, 3.0, 0.4]);
    assert!(v[4].is_nan());
    assert!(parse_text("1.0, x").is_err());
}

#[test]
fn wav_is_mixed_and_rectified() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("stereo.WAV");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for (l, r) in [(16384i16, 16384i16), (-16384, -16384), (16384, -16384)] {
        writer.write_sample(l).unwrap();
        writer.write_sample(r).unwrap();
    }
    writer.finalize().unwrap();

    let signal = read_signal(&path).unwrap();
    assert_eq!(signal, vec![0.5, 0.5, 0.0]);
}

#[test]
fn text_file_round_trip_through_csv() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("signal.txt");
    std::fs::write(&input, "0 0 1 3 1 0 0 2 2 0\n").unwrap();
    let signal = read_signal(&input).unwrap();
    let d = pnpt(&signal).unwrap();

    let csv = tmp.path().join("out.csv");
    write_csv(&csv, &d).unwrap();
    let content = std::fs::read_to_string(&csv).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("sample,scale_2.000,"));
    assert_eq!(header.split(',').count(), d.num_scales() + 1);
    assert_eq!(lines.count(), signal.len());
}

#[test]
fn synthetic_signal_passes_checks() {
    let signal = synthetic_peaks(1024, 3);
    assert_eq!(signal, synthetic_peaks(1024, 3));
    for mode in [Mode::Peel, Mode::SinglePass] {
        let d = pnpt_with(&signal, Family::Parabola, mode).unwrap();
        let report = Report::new(&signal, &d);
        assert_eq!(report.scales, 19);
        assert!(report.passed(1e-9), "{report:?}");
    }
}
