//! Integration Tests for Feature Aggregation
//!
//! Properties that must hold for any detection batch.

#[cfg(test)]
mod integration_tests {
    use crate::logic::detection::{BoundingBox, DamageClass, Detection};
    use crate::logic::features::{aggregate, FeatureAccumulator};

    fn batch(seed: u32, len: usize) -> Vec<Detection> {
        (0..len)
            .map(|i| {
                let k = (seed as usize * 7 + i * 3) % DamageClass::ALL.len();
                let confidence = ((seed as usize + i) % 10) as f32 / 10.0;
                Detection::new(
                    DamageClass::ALL[k],
                    confidence,
                    BoundingBox::Xyxy { x1: 0.0, y1: 0.0, x2: (i + 1) as f32, y2: 2.0 },
                )
            })
            .collect()
    }

    /// Counts always sum to the detection count, and every class is a key
    #[test]
    fn test_class_counts_sum_to_detection_count() {
        for seed in 0..20 {
            for len in [0, 1, 2, 5, 17] {
                let features = aggregate(&batch(seed, len), 640.0 * 480.0).unwrap();
                assert_eq!(features.class_counts.total(), features.detection_count);
                assert_eq!(features.detection_count as usize, len);
                assert_eq!(features.class_counts.iter().count(), DamageClass::ALL.len());
            }
        }
    }

    /// Accumulating two frames equals summing their per-frame counts
    #[test]
    fn test_accumulation_equivalence() {
        let f1 = batch(3, 4);
        let f2 = batch(8, 6);
        let area = 1000.0;

        let mut acc = FeatureAccumulator::new();
        acc.push_batch(&f1, area).unwrap();
        acc.push_batch(&f2, area).unwrap();
        let combined = acc.finish();

        let mut expected = aggregate(&f1, area).unwrap().class_counts;
        expected.merge(&aggregate(&f2, area).unwrap().class_counts);

        assert_eq!(combined.class_counts, expected);
        assert_eq!(combined.detection_count, 10);
    }

    /// Bigger boxes or higher confidence never lower the aggregated features
    #[test]
    fn test_features_monotonic_in_confidence_and_area() {
        let base = vec![
            Detection::new(DamageClass::Dent, 0.4, BoundingBox::Xywh { x: 0.0, y: 0.0, w: 4.0, h: 4.0 }),
            Detection::new(DamageClass::Leak, 0.6, BoundingBox::Xywh { x: 0.0, y: 0.0, w: 2.0, h: 2.0 }),
        ];
        let mut bigger = base.clone();
        bigger[1].confidence = 0.9;
        bigger[1].bbox = BoundingBox::Xywh { x: 0.0, y: 0.0, w: 5.0, h: 5.0 };

        let a = aggregate(&base, 100.0).unwrap();
        let b = aggregate(&bigger, 100.0).unwrap();

        assert!(b.average_confidence >= a.average_confidence);
        assert!(b.total_damage_area_ratio >= a.total_damage_area_ratio);
        assert_eq!(a.class_counts, b.class_counts);
    }

    #[test]
    fn test_model_input_layout_order() {
        let features = aggregate(&batch(1, 3), 50.0).unwrap();
        let input = features.model_input();
        assert_eq!(input[0], features.average_confidence);
        assert_eq!(input[1], features.total_damage_area_ratio);
        assert_eq!(input[2], 3.0);
    }

    #[test]
    fn test_summary_text() {
        let features = aggregate(&batch(0, 0), 1.0).unwrap();
        assert_eq!(features.class_counts.summary(), "No damages detected.");

        let dets = vec![
            Detection::new(DamageClass::Rust, 0.5, BoundingBox::Xywh { x: 0.0, y: 0.0, w: 1.0, h: 1.0 }),
            Detection::new(DamageClass::Rust, 0.5, BoundingBox::Xywh { x: 0.0, y: 0.0, w: 1.0, h: 1.0 }),
            Detection::new(DamageClass::Dent, 0.5, BoundingBox::Xywh { x: 0.0, y: 0.0, w: 1.0, h: 1.0 }),
        ];
        let features = aggregate(&dets, 1.0).unwrap();
        assert_eq!(features.class_counts.summary(), "dent: 1, rust: 2");
    }
}
