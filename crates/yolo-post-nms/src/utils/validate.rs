//! Precondition checks run before any score is touched

use yolo_post_core::PredictionBuffer;

use crate::bbox::CenterBox;
use crate::error::{NmsError, Result};

/// Threshold must be a number in `[0, 1]`
pub fn validate_threshold(threshold: f32) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(NmsError::InvalidThreshold(threshold))
    }
}

/// Every box must have finite parameters and positive width and height, and keep a
/// positive area once converted to corner form.
///
/// Reports the first offending record.
pub fn validate_geometry(buffer: &PredictionBuffer) -> Result<()> {
    for record in buffer.records() {
        let center = CenterBox::from_array(record.center_box());
        if center.is_degenerate() || center.to_corners().is_degenerate() {
            return Err(NmsError::DegenerateGeometry {
                index: record.index(),
                cx: center.cx,
                cy: center.cy,
                w: center.w,
                h: center.h,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_range() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(0.45).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert_eq!(validate_threshold(-0.1), Err(NmsError::InvalidThreshold(-0.1)));
        assert!(validate_threshold(f32::NAN).is_err());
        assert!(validate_threshold(f32::INFINITY).is_err());
    }

    #[test]
    fn test_geometry_reports_first_bad_box() {
        let mut buffer = PredictionBuffer::new(1);
        buffer.push_detection([5.0, 5.0, 10.0, 10.0], 1.0, &[0.5]).unwrap();
        assert!(validate_geometry(&buffer).is_ok());

        buffer.push_detection([5.0, 5.0, 0.0, 10.0], 1.0, &[0.5]).unwrap();
        buffer.push_detection([5.0, 5.0, 10.0, -1.0], 1.0, &[0.5]).unwrap();

        match validate_geometry(&buffer) {
            Err(NmsError::DegenerateGeometry { index, w, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(w, 0.0);
            }
            other => panic!("expected degenerate geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_geometry_rejects_collapsed_corners() {
        let mut buffer = PredictionBuffer::new(1);
        buffer.push_detection([5.0, 5.0, 10.0, 10.0], 1.0, &[0.9]).unwrap();
        // width vanishes next to cx = 5
        buffer.push_detection([5.0, 5.0, 1e-30, 1e-30], 1.0, &[0.5]).unwrap();
        assert!(matches!(
            validate_geometry(&buffer),
            Err(NmsError::DegenerateGeometry { index: 1, .. })
        ));

        // area underflows at the origin
        let mut buffer = PredictionBuffer::new(1);
        buffer.push_detection([0.0, 0.0, 1e-30, 1e-30], 1.0, &[0.5]).unwrap();
        assert!(matches!(
            validate_geometry(&buffer),
            Err(NmsError::DegenerateGeometry { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_buffer_is_valid() {
        assert!(validate_geometry(&PredictionBuffer::new(4)).is_ok());
    }
}
