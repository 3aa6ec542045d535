//! Fixed-length position history used for motion trails

use std::collections::VecDeque;

use glam::Vec2;

/// FIFO of recent positions, newest first. Length never changes after construction.
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vec2>,
}

impl Trail {
    /// Create a trail of `len` points, all at `start`. A zero length is raised to one.
    pub fn new(len: usize, start: Vec2) -> Self {
        let len = len.max(1);
        Self {
            points: std::iter::repeat_n(start, len).collect(),
        }
    }

    /// Record a position: drop the oldest point, insert `point` as the newest
    pub fn push(&mut self, point: Vec2) {
        self.points.pop_back();
        self.points.push_front(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn newest(&self) -> Vec2 {
        self.points.front().copied().unwrap_or_default()
    }

    pub fn oldest(&self) -> Vec2 {
        self.points.back().copied().unwrap_or_default()
    }

    /// Points from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_evicts_oldest() {
        let mut trail = Trail::new(3, Vec2::ZERO);
        trail.push(Vec2::new(1.0, 0.0));
        trail.push(Vec2::new(2.0, 0.0));
        assert_eq!(trail.newest(), Vec2::new(2.0, 0.0));
        assert_eq!(trail.oldest(), Vec2::ZERO);

        trail.push(Vec2::new(3.0, 0.0));
        assert_eq!(trail.oldest(), Vec2::new(1.0, 0.0));
        let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_zero_length_is_raised() {
        let mut trail = Trail::new(0, Vec2::ONE);
        assert_eq!(trail.len(), 1);
        trail.push(Vec2::ZERO);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.oldest(), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn length_is_invariant(
            len in 1usize..32,
            pushes in prop::collection::vec((-1e4f32..1e4, -1e4f32..1e4), 0..200),
        ) {
            let mut trail = Trail::new(len, Vec2::ZERO);
            for (x, y) in pushes {
                trail.push(Vec2::new(x, y));
                prop_assert_eq!(trail.len(), len);
            }
            prop_assert_eq!(trail.len(), len);
        }
    }
}
