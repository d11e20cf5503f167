//! Bounded FIFO of accepted raw poses, used for the moving average.

use crate::types::{Pose, Vec3};
use std::collections::VecDeque;

/// Fixed-capacity sample history (most recent last).
#[derive(Clone, Debug)]
pub struct SampleBuffer {
    samples: VecDeque<Pose>,
    capacity: usize,
}

impl SampleBuffer {
    /// `capacity` is raised to 1 if zero.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest past capacity.
    pub fn push(&mut self, pose: Pose) {
        self.samples.push_back(pose);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Component-wise mean of the buffered poses, `None` when empty.
    pub fn average(&self) -> Option<Pose> {
        if self.samples.is_empty() {
            return None;
        }
        let n = self.samples.len() as f64;
        let (mut p, mut r, mut s) = (Vec3::zeros(), Vec3::zeros(), Vec3::zeros());
        for pose in &self.samples {
            p += pose.position;
            r += pose.rotation;
            s += pose.scale;
        }
        Some(Pose::new(p / n, r / n, s / n))
    }

    /// Change capacity, dropping the oldest samples if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pose> {
        self.samples.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn at(x: f64) -> Pose {
        Pose::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn empty_has_no_average() {
        let buf = SampleBuffer::new(3);
        assert!(buf.average().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn evicts_oldest() {
        let mut buf = SampleBuffer::new(3);
        for x in 0..10 {
            buf.push(at(x as f64));
            assert!(buf.len() <= 3);
        }
        let xs: Vec<f64> = buf.iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn average_is_componentwise() {
        let mut buf = SampleBuffer::new(5);
        buf.push(Pose::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.2, 0.0, 0.0),
            Vec3::repeat(1.0),
        ));
        buf.push(Pose::new(
            Vec3::new(3.0, 2.0, 0.0),
            Vec3::new(0.4, 0.6, 0.0),
            Vec3::repeat(2.0),
        ));
        let avg = buf.average().unwrap();
        assert_abs_diff_eq!(avg.position, Vec3::new(2.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(avg.rotation, Vec3::new(0.3, 0.3, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(avg.scale, Vec3::repeat(1.5), epsilon = 1e-12);
    }

    #[test]
    fn shrinking_capacity_keeps_newest() {
        let mut buf = SampleBuffer::new(8);
        for x in 0..8 {
            buf.push(at(x as f64));
        }
        buf.set_capacity(3);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.iter().next().unwrap().position.x, 5.0);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let mut buf = SampleBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
        buf.push(at(1.0));
        buf.push(at(2.0));
        assert_eq!(buf.len(), 1);
    }
}
