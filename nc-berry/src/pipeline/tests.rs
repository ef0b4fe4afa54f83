use super::*;
use crate::edge::BorderContactDetector;
use crate::filter::ThresholdParams;
use crate::morph::CleanerOptions;
use crate::synth;
use crate::{DegenerateImage, MeasureError};
use ndarray::Array2;

const SHAPE: (usize, usize) = (100, 100);

fn init_logger() {
    // 多个测试共用一个全局 logger, 重复初始化的错误可以忽略.
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init();
}

/// 小尺寸合成图像使用的参数: 较弱的平滑让分割贴合圆盘边缘.
fn small_config() -> AnalysisConfig {
    AnalysisConfig {
        min_nucleus_area: 100.0,
        threshold: ThresholdParams {
            gaussian_sigma: 1.5,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn analyzer(config: AnalysisConfig) -> NucleoCytoplasmicRatio {
    NucleoCytoplasmicRatio::new(config).unwrap()
}

fn disks(disks: &[((usize, usize), f64)]) -> Vec<GrayscaleBuffer> {
    synth::same_two_channels(synth::disk_buffer(SHAPE, disks, 1000, 100))
}

fn assert_aligned(result: &AnalysisResult) {
    assert_eq!(result.nuclei().len(), result.cell_count());
    assert_eq!(result.cytoplasms().len(), result.cell_count());
    for rec in result.records() {
        assert!(rec.nucleus.is_disjoint(rec.cytoplasm));
        assert_eq!(rec.nucleus.len(), rec.measurement.nuclear.count());
        assert_eq!(rec.cytoplasm.len(), rec.measurement.cytoplasmic.count());
    }
}

#[test]
fn test_single_bright_disk() {
    init_logger();
    let result = analyzer(small_config())
        .analyze_image(&disks(&[((50, 50), 10.0)]), None)
        .unwrap();
    assert_eq!(result.status(), ImageStatus::Analyzed);
    assert_eq!(result.stage(), Stage::Done);
    assert_eq!(result.cell_count(), 1);
    assert_eq!(result.object_count(), 1);
    assert_aligned(&result);

    let nucleus = &result.nuclei()[0];
    assert!((283..=346).contains(&nucleus.len()));
    assert!(nucleus.contains((50, 50)));
    let ratio = result.measurements()[0].ratio;
    assert!(synth::f64_eq(ratio, 10.0, 0.5), "ratio = {ratio}");
}

/// 全部使用默认参数. 平滑后细胞核会向外扩出一圈背景像素, 比值略低.
#[test]
fn test_single_disk_with_defaults() {
    init_logger();
    let result = analyzer(AnalysisConfig::default())
        .analyze_image(&disks(&[((50, 50), 10.0)]), None)
        .unwrap();
    assert_eq!(result.status(), ImageStatus::Analyzed);
    assert_eq!(result.cell_count(), 1);
    assert_aligned(&result);

    let rec = result.record(0).unwrap();
    assert!(synth::disk_cluster((50, 50), 10.0, SHAPE).is_subset(rec.nucleus));
    assert!((340..=375).contains(&rec.nucleus.len()), "n = {}", rec.nucleus.len());
    assert!(synth::f64_eq(rec.measurement.cytoplasmic.mean(), 100.0, 1e-9));
    let ratio = rec.measurement.ratio;
    assert!((8.5..=9.5).contains(&ratio), "ratio = {ratio}");
}

#[test]
fn test_flat_image_is_skipped() {
    init_logger();
    let flat = GrayscaleBuffer::uncalibrated(Array2::<u16>::from_elem((50, 50), 500));
    let mut ctx = RunContext::new();
    let result = analyzer(small_config())
        .analyze(&synth::same_two_channels(flat), None, &mut ctx)
        .unwrap();
    assert_eq!(
        result.status(),
        ImageStatus::Degenerate(DegenerateImage::FlatImage)
    );
    assert_eq!(result.stage(), Stage::Excluded);
    assert_eq!(result.object_count(), 0);
    assert_eq!(
        ctx.counters(),
        RunCounters {
            images_skipped: 1,
            ..Default::default()
        }
    );
}

#[test]
fn test_edge_skips_image() {
    init_logger();
    let channels = disks(&[((0, 50), 10.0), ((60, 40), 10.0)]);
    let mut ctx = RunContext::new();
    let result = analyzer(small_config())
        .with_edge_detector(BorderContactDetector::new(1))
        .analyze(&channels, None, &mut ctx)
        .unwrap();
    assert_eq!(
        result.status(),
        ImageStatus::EdgeSkipped(Rect::new(0, 40, 11, 21))
    );
    assert_eq!(result.stage(), Stage::Excluded);
    assert_eq!(result.cell_count(), 0);
    assert_eq!(ctx.counters().cell_count, 0);
    assert_eq!(ctx.counters().object_count, 0);
    assert_eq!(ctx.counters().images_skipped, 1);
}

/// 默认的边缘检测只看细胞核通道的强度统计.
#[test]
fn test_default_edge_detector_uses_nuclear_channel() {
    let saturated = synth::disk_buffer(SHAPE, &[((50, 50), 10.0)], 60000, 30000);
    let normal = synth::disk_buffer(SHAPE, &[((50, 50), 10.0)], 1000, 100);
    let a = analyzer(small_config());

    let result = a
        .analyze_image(&[saturated.clone(), normal.clone()], None)
        .unwrap();
    assert_eq!(
        result.status(),
        ImageStatus::EdgeSkipped(Rect::from_shape(SHAPE))
    );
    assert_eq!(result.stage(), Stage::Excluded);

    let result = a.analyze_image(&[normal, saturated], None).unwrap();
    assert_eq!(result.status(), ImageStatus::Analyzed);
    assert_eq!(result.cell_count(), 1);
    assert!(synth::f64_eq(result.measurements()[0].ratio, 2.0, 1e-9));
}

#[test]
fn test_edge_region_is_cleared() {
    let channels = disks(&[((0, 50), 10.0), ((60, 40), 10.0)]);
    let cfg = AnalysisConfig {
        skip_images_with_edges: false,
        ..small_config()
    };
    let result = analyzer(cfg)
        .with_edge_detector(BorderContactDetector::new(1))
        .analyze_image(&channels, None)
        .unwrap();
    assert_eq!(result.status(), ImageStatus::Analyzed);
    assert_eq!(result.cell_count(), 1);
    assert!(result.nuclei()[0].contains((60, 40)));
}

#[test]
fn test_border_nuclei_are_excluded() {
    let channels = disks(&[((0, 50), 10.0), ((60, 40), 10.0)]);
    let cfg = AnalysisConfig {
        exclude_border_nuclei: true,
        ..small_config()
    };
    let result = analyzer(cfg).analyze_image(&channels, None).unwrap();
    assert_eq!(result.object_count(), 2);
    assert_eq!(result.cell_count(), 1);
    assert_eq!(result.exclusions().len(), 1);
    let ex = result.exclusions()[0];
    assert_eq!(ex.index, 0);
    assert_eq!(ex.reason, ExclusionReason::TouchesBorder);
    assert_eq!(ex.bounds.top(), 0);
    assert_eq!(result.measurements()[0].index, 1);
}

#[test]
fn test_border_nuclei_are_kept_by_default() {
    let channels = disks(&[((0, 50), 10.0), ((60, 40), 10.0)]);
    let result = analyzer(small_config()).analyze_image(&channels, None).unwrap();
    assert_eq!(result.cell_count(), 2);
    assert!(result.exclusions().is_empty());
    assert_aligned(&result);
}

#[test]
fn test_touching_nuclei_are_split() {
    let channels = disks(&[((50, 40), 10.0), ((50, 57), 10.0)]);
    let result = analyzer(small_config()).analyze_image(&channels, None).unwrap();
    assert_eq!(result.cell_count(), 2);
    assert_aligned(&result);

    let cfg = AnalysisConfig {
        cleaner: CleanerOptions {
            watershed: false,
            ..Default::default()
        },
        ..small_config()
    };
    let result = analyzer(cfg).analyze_image(&channels, None).unwrap();
    assert_eq!(result.cell_count(), 1);
}

#[test]
fn test_size_filter() {
    let channels = synth::same_two_channels(synth::disk_buffer(
        (60, 60),
        &[((30, 30), 5.0)],
        1000,
        100,
    ));
    let result = analyzer(small_config()).analyze_image(&channels, None).unwrap();
    assert_eq!(result.object_count(), 1);
    assert_eq!(result.cell_count(), 0);
    assert!(matches!(
        result.exclusions()[0].reason,
        ExclusionReason::TooSmall(a) if a < 100.0
    ));

    let cfg = AnalysisConfig {
        min_nucleus_area: 10.0,
        max_nucleus_area: 50.0,
        ..small_config()
    };
    let result = analyzer(cfg).analyze_image(&channels, None).unwrap();
    assert!(matches!(
        result.exclusions()[0].reason,
        ExclusionReason::TooLarge(_)
    ));
}

#[test]
fn test_thin_rings_are_excluded() {
    let cfg = AnalysisConfig {
        min_ring_pixels: 100_000,
        ..small_config()
    };
    let result = analyzer(cfg)
        .analyze_image(&disks(&[((50, 50), 10.0)]), None)
        .unwrap();
    assert_eq!(result.stage(), Stage::Done);
    assert_eq!(result.cell_count(), 0);
    assert!(matches!(
        result.exclusions()[0].reason,
        ExclusionReason::RingTooThin(_)
    ));
}

#[test]
fn test_zero_cytoplasm_is_a_measurement_error() {
    let nuclear = synth::disk_buffer(SHAPE, &[((50, 50), 10.0)], 1000, 100);
    let dark = GrayscaleBuffer::uncalibrated(Array2::<u16>::zeros(SHAPE));
    let result = analyzer(small_config())
        .analyze_image(&[nuclear, dark], None)
        .unwrap();
    assert_eq!(result.cell_count(), 0);
    assert_eq!(
        result.exclusions()[0].reason,
        ExclusionReason::Measurement(MeasureError::ZeroDenominator)
    );
}

#[test]
fn test_user_roi_offsets_results() {
    let channels = disks(&[((60, 60), 10.0)]);
    let roi = Rect::new(30, 30, 60, 60);
    let result = analyzer(small_config())
        .analyze_image(&channels, Some(roi))
        .unwrap();
    assert_eq!(result.cell_count(), 1);
    let rec = result.record(0).unwrap();
    assert!(rec.nucleus.contains((60, 60)));
    assert!(rec.nucleus.iter().all(|p| roi.contains(p)));
    assert!(rec.cytoplasm.iter().all(|p| roi.contains(p)));
    assert!(synth::f64_eq(rec.measurement.ratio, 10.0, 0.5));
}

#[test]
fn test_roi_out_of_bounds() {
    let channels = disks(&[((60, 60), 10.0)]);
    let roi = Rect::new(50, 50, 60, 60);
    assert_eq!(
        analyzer(small_config()).analyze_image(&channels, Some(roi)),
        Err(ConfigError::RoiOutOfBounds { roi, shape: SHAPE })
    );
}

#[test]
fn test_input_errors_leave_context_untouched() {
    let nuclear = synth::disk_buffer(SHAPE, &[((50, 50), 10.0)], 1000, 100);
    let other = synth::disk_buffer((50, 50), &[((25, 25), 10.0)], 1000, 100);
    let mut ctx = RunContext::new();
    let a = analyzer(small_config());
    assert!(matches!(
        a.analyze(&[nuclear.clone(), other], None, &mut ctx),
        Err(ConfigError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        a.analyze(&[nuclear], None, &mut ctx),
        Err(ConfigError::NotEnoughChannels { .. })
    ));
    assert_eq!(ctx.counters(), RunCounters::default());

    let cfg = AnalysisConfig {
        nuclear_channel: 0,
        ..Default::default()
    };
    assert!(matches!(
        NucleoCytoplasmicRatio::new(cfg),
        Err(ConfigError::InvalidChannel(0))
    ));
}

#[test]
fn test_custom_thresholder() {
    let channels = disks(&[((50, 50), 10.0)]);
    let fixed = |buffer: &GrayscaleBuffer| -> Result<crate::BinaryMask, DegenerateImage> {
        Ok(crate::BinaryMask::from_fn(buffer.shape(), |p| {
            buffer.get(p).unwrap_or(0.0) > 500.0
        }))
    };
    let result = analyzer(small_config())
        .with_thresholder(fixed)
        .analyze_image(&channels, None)
        .unwrap();
    assert_eq!(result.cell_count(), 1);
    assert_eq!(result.nuclei()[0].len(), 317);
    assert!(synth::f64_eq(result.measurements()[0].ratio, 10.0, 1e-9));
}

#[test]
fn test_analysis_is_repeatable() {
    let channels = disks(&[((50, 40), 10.0), ((50, 57), 10.0), ((20, 20), 8.0)]);
    let a = analyzer(small_config());
    assert_eq!(
        a.analyze_image(&channels, None),
        a.analyze_image(&channels, None)
    );
}

#[cfg(feature = "rayon")]
#[test]
fn test_par_analyze_matches_sequential() {
    let flat = GrayscaleBuffer::uncalibrated(Array2::<u16>::from_elem(SHAPE, 500));
    let stacks = vec![
        ImageStack::new("A1", disks(&[((50, 50), 10.0)])),
        ImageStack::new("A2", synth::same_two_channels(flat)),
        ImageStack::new("A3", disks(&[((50, 40), 10.0), ((50, 57), 10.0)])),
    ];
    let a = analyzer(small_config());

    let mut seq = RunContext::new();
    let expected: Vec<_> = stacks
        .iter()
        .map(|s| a.analyze(&s.channels, None, &mut seq))
        .collect();

    let mut par = RunContext::new();
    let results = a.par_analyze(&stacks, &mut par);
    assert_eq!(results, expected);
    assert_eq!(par.counters(), seq.counters());
    assert_eq!(
        par.counters(),
        RunCounters {
            cell_count: 3,
            object_count: 3,
            images_analyzed: 2,
            images_skipped: 1,
            objects_excluded: 0,
        }
    );
}
