//! End-to-end pipeline scenarios through the public API.

use photolift_core::config::AnalysisConfig;
use photolift_core::encode::encode_png;
use photolift_core::stats;
use photolift_core::{
    CancelToken, EnhanceConfig, EnhanceError, EnhancementPlan, Enhancer, RasterImage, Severity, Stage,
};
use proptest::prelude::*;

/// Checkerboard of two colours, which classifies as good on every metric.
fn all_good_raster() -> RasterImage {
    let a = [255u8, 210, 220];
    let b = [35u8, 0, 110];
    let mut pixels = Vec::with_capacity(8 * 8 * 3);
    for y in 0..8 {
        for x in 0..8 {
            pixels.extend_from_slice(if (x + y) % 2 == 0 { &a } else { &b });
        }
    }
    RasterImage::from_rgb(8, 8, pixels).unwrap()
}

fn noisy_raster(width: u32, height: u32, seed: u32) -> RasterImage {
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (state >> 16) as u8
    };
    let pixels = (0..width * height * 3).map(|_| next()).collect();
    RasterImage::from_rgb(width, height, pixels).unwrap()
}

#[test]
fn underexposed_gray_gets_adaptive_exposure() {
    let enhancer = Enhancer::default();
    let raster = RasterImage::filled(2, 2, [50, 50, 50]);

    let diagnosis = enhancer.diagnose(&raster).unwrap();
    assert_eq!(diagnosis.stats.base.overall_brightness, 50.0);
    assert_eq!(diagnosis.report.metrics.brightness.severity, Severity::Severe);

    let plan = enhancer.plan(&diagnosis.stats, &diagnosis.report);
    let exposure = plan.stages[0];
    assert_eq!(
        exposure,
        Stage::Exposure {
            factor: 1.3046875,
            adaptive: true
        }
    );

    let (exposed, result) = enhancer
        .apply(&raster, &EnhancementPlan { stages: vec![exposure] })
        .unwrap();
    assert_eq!(result.applied_stages, vec!["Adaptive Exposure Correction"]);
    assert!(exposed.pixels().iter().all(|&v| v == 65));
}

#[test]
fn green_cast_runs_removal_not_vignette() {
    let raster = RasterImage::filled(6, 6, [150, 200, 150]);
    let (_, result) = Enhancer::default().run(&raster).unwrap();

    assert_eq!(result.stats_before.base.green_dominance, 50.0);
    assert!(result.stats_before.base.has_green_cast);
    assert!(result.applied_stages.iter().any(|s| s == "Green Cast Removal"));
    assert!(result.applied_stages.iter().any(|s| s == "Cinematic Color Grading"));
    assert!(!result.applied_stages.iter().any(|s| s == "Cinematic Vignette"));
    assert!(result.green_cast_removed());
    assert!(result.stats_after.base.green_dominance < 50.0);
}

#[test]
fn all_good_raster_runs_minimal_plan() {
    let raster = all_good_raster();
    let (_, result) = Enhancer::default().run(&raster).unwrap();

    assert_eq!(result.before.overall_score, 100);
    assert_eq!(result.before.issues_found, 0);
    assert_eq!(
        result.applied_stages,
        vec![
            "Adaptive Exposure Correction",
            "Contrast Enhancement",
            "Cinematic Color Grading",
            "Professional Sharpening",
            "Cinematic Vignette",
        ]
    );
    assert_eq!(
        result.plan.stages[0],
        Stage::Exposure {
            factor: 1.02,
            adaptive: false
        }
    );
    assert_eq!(
        result.plan.stages[1],
        Stage::Contrast {
            factor: 1.05,
            adaptive: false
        }
    );
    for absent in ["tone_curve", "color_cast", "saturation"] {
        assert!(!result.plan.contains(absent), "{absent} should not run");
    }
}

#[test]
fn score_drops_by_penalty() {
    // Uniform mid-gray: contrast 0 (severe), saturation 0 (severe),
    // sharpness 0 (severe), dynamic range 0 (moderate).
    let report = photolift_core::analyze(&RasterImage::filled(4, 4, [128, 128, 128])).unwrap();
    assert_eq!(report.metrics.brightness.severity, Severity::Good);
    assert_eq!(report.metrics.color_cast.severity, Severity::Good);
    assert_eq!(report.overall_score, 100 - 20 - 20 - 20 - 12);
    assert_eq!(report.issues_found, 4);

    // A darker gray adds a severe brightness issue; the score clamps at 0
    // once penalties are raised.
    let mut config = EnhanceConfig::default();
    config.penalties.severe = 30;
    let enhancer = Enhancer::new(config).unwrap();
    let report = enhancer.analyze(&RasterImage::filled(4, 4, [40, 40, 40])).unwrap();
    assert_eq!(report.overall_score, 0);
}

#[test]
fn runs_are_deterministic() {
    let enhancer = Enhancer::default();
    let raster = noisy_raster(64, 48, 7);
    let (image_a, a) = enhancer.run(&raster).unwrap();
    let (image_b, b) = enhancer.run(&raster).unwrap();
    assert_eq!(image_a, image_b);
    assert_eq!(a.before, b.before);
    assert_eq!(a.after, b.after);
    assert_eq!(encode_png(&image_a).unwrap(), encode_png(&image_b).unwrap());
}

#[test]
fn large_raster_matches_row_by_row() {
    // 240x160 is above the parallel threshold; a single row is far below it,
    // so splitting the raster into 1-row rasters forces the sequential path.
    let raster = noisy_raster(240, 160, 99);
    let rows: Vec<RasterImage> = raster
        .pixels()
        .chunks_exact(raster.row_stride())
        .map(|row| RasterImage::from_rgb(240, 1, row.to_vec()).unwrap())
        .collect();

    let stages = [
        Stage::Exposure {
            factor: 1.3,
            adaptive: true,
        },
        Stage::Saturation { factor: 1.2 },
        Stage::ColorGrading,
    ];
    for stage in stages {
        let mut whole = raster.clone();
        stage.apply(&mut whole).unwrap();
        let mut joined = Vec::with_capacity(whole.pixels().len());
        for row in &rows {
            let mut row = row.clone();
            stage.apply(&mut row).unwrap();
            joined.extend_from_slice(row.pixels());
        }
        assert_eq!(whole.pixels(), &joined[..], "{} differs", stage.id());
    }

    // Channel statistics: parallel row sums against one sequential pass.
    let detailed = stats::analyze_detailed(&raster, &AnalysisConfig::default()).unwrap();
    let mut sums = [0u64; 3];
    let mut squares = [0u64; 3];
    for px in raster.pixels().chunks_exact(3) {
        for c in 0..3 {
            sums[c] += px[c] as u64;
            squares[c] += px[c] as u64 * px[c] as u64;
        }
    }
    let n = (240 * 160) as f64;
    let mean = |c: usize| sums[c] as f64 / n;
    let std = |c: usize| {
        let n = n as i128;
        let num = n * squares[c] as i128 - (sums[c] as i128) * (sums[c] as i128);
        (num as f64 / (n * n) as f64).sqrt()
    };
    let ch = detailed.base.channels;
    assert_eq!(ch.r_mean, mean(0));
    assert_eq!(ch.g_mean, mean(1));
    assert_eq!(ch.b_mean, mean(2));
    assert_eq!(ch.r_std, std(0));
    assert_eq!(ch.g_std, std(1));
    assert_eq!(ch.b_std, std(2));

    // Detail metrics: parallel dispatch against a one-thread pool.
    let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let sequential = single
        .install(|| stats::analyze_detailed(&raster, &AnalysisConfig::default()))
        .unwrap();
    assert_eq!(detailed, sequential);
}

#[test]
fn concurrent_runs_share_one_enhancer() {
    let enhancer = Enhancer::default();
    let raster = noisy_raster(32, 32, 3);
    let expected = enhancer.run(&raster).unwrap().0;
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| enhancer.run(&raster).unwrap().0)).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn rgba_alpha_survives_pipeline() {
    let rgb = noisy_raster(10, 10, 11);
    let mut pixels = Vec::with_capacity(10 * 10 * 4);
    for (i, px) in rgb.pixels().chunks_exact(3).enumerate() {
        pixels.extend_from_slice(px);
        pixels.push(i as u8);
    }
    let raster = RasterImage::from_rgba(10, 10, pixels).unwrap();
    let (image, result) = Enhancer::default().run(&raster).unwrap();
    assert_eq!(result.channels, 4);
    for (i, px) in image.pixels().chunks_exact(4).enumerate() {
        assert_eq!(px[3], i as u8);
    }
}

#[test]
fn cancelled_run_returns_nothing() {
    let token = CancelToken::new();
    token.cancel();
    let err = Enhancer::default()
        .run_with_cancel(&all_good_raster(), &token)
        .unwrap_err();
    assert!(matches!(err, EnhanceError::Cancelled { .. }));
}

#[test]
fn unsupported_layout_is_reported() {
    let raster = RasterImage::new(2, 2, 2, vec![0; 8]).unwrap();
    assert_eq!(
        Enhancer::default().run(&raster).unwrap_err(),
        EnhanceError::UnsupportedFormat { channels: 2 }
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: cast removal and vignette never both run, and one always does.
    #[test]
    fn prop_cast_and_vignette_complementary(r: u8, g: u8, b: u8) {
        let raster = RasterImage::filled(3, 3, [r, g, b]);
        let (_, result) = Enhancer::default().run(&raster).unwrap();
        let cast = result.plan.contains("color_cast");
        let vignette = result.plan.contains("vignette");
        prop_assert!(cast != vignette);
        prop_assert_eq!(cast, result.stats_before.base.has_green_cast);
    }

    /// Property: output keeps the input's shape and the score stays in range.
    #[test]
    fn prop_shape_and_score(w in 1u32..20, h in 1u32..20, seed: u32) {
        let raster = noisy_raster(w, h, seed);
        let (image, result) = Enhancer::default().run(&raster).unwrap();
        prop_assert_eq!(image.width(), w);
        prop_assert_eq!(image.height(), h);
        prop_assert_eq!(image.pixels().len(), raster.pixels().len());
        prop_assert!(result.before.overall_score <= 100);
        prop_assert!(result.after.overall_score <= 100);
    }
}
