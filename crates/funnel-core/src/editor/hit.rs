//! Hit testing against authored geometry.

use crate::geometry::{Platform, Point2D, Wall};

/// Element found under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    Wall { index: usize, distance: f32 },
    Platform { index: usize, distance: f32 },
}

impl HitTarget {
    pub fn distance(&self) -> f32 {
        match *self {
            Self::Wall { distance, .. } | Self::Platform { distance, .. } => distance,
        }
    }
}

/// Closest wall to `p` within `threshold`. Earlier walls win ties.
pub fn nearest_wall(walls: &[Wall], p: Point2D, threshold: f32) -> Option<HitTarget> {
    walls
        .iter()
        .enumerate()
        .map(|(index, wall)| (index, wall.distance_to(p)))
        .filter(|&(_, distance)| distance <= threshold)
        .fold(None, |best: Option<(usize, f32)>, candidate| match best {
            Some((_, d)) if d <= candidate.1 => best,
            _ => Some(candidate),
        })
        .map(|(index, distance)| HitTarget::Wall { index, distance })
}

/// Closest platform to `p` within `threshold`. Earlier platforms win ties.
pub fn nearest_platform(platforms: &[Platform], p: Point2D, threshold: f32) -> Option<HitTarget> {
    platforms
        .iter()
        .enumerate()
        .map(|(index, platform)| (index, platform.distance_to(p)))
        .filter(|&(_, distance)| distance <= threshold)
        .fold(None, |best: Option<(usize, f32)>, candidate| match best {
            Some((_, d)) if d <= candidate.1 => best,
            _ => Some(candidate),
        })
        .map(|(index, distance)| HitTarget::Platform { index, distance })
}

/// Picks the closer of the two categories. A platform wins an exact tie.
pub fn pick(wall: Option<HitTarget>, platform: Option<HitTarget>) -> Option<HitTarget> {
    match (wall, platform) {
        (Some(w), Some(p)) => {
            if w.distance() < p.distance() {
                Some(w)
            } else {
                Some(p)
            }
        }
        (w, p) => w.or(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_wall(y: f32) -> Wall {
        Wall::new(Point2D::new(0.0, y), Point2D::new(100.0, y))
    }

    #[test]
    fn test_nearest_wall_within_threshold() {
        let walls = [horizontal_wall(0.0), horizontal_wall(20.0)];

        let hit = nearest_wall(&walls, Point2D::new(50.0, 14.0), 10.0);
        assert_eq!(
            hit,
            Some(HitTarget::Wall {
                index: 1,
                distance: 6.0
            })
        );

        assert!(nearest_wall(&walls, Point2D::new(50.0, 50.0), 10.0).is_none());
    }

    #[test]
    fn test_prefers_closer_category() {
        let walls = [horizontal_wall(0.0)];
        let platforms = [Platform::new(Point2D::new(50.0, 12.0), 50.0, 1.0)];
        let p = Point2D::new(50.0, 8.0);

        let target = pick(
            nearest_wall(&walls, p, 10.0),
            nearest_platform(&platforms, p, 15.0),
        );
        assert!(matches!(target, Some(HitTarget::Platform { index: 0, .. })));

        let p = Point2D::new(50.0, 3.0);
        let target = pick(
            nearest_wall(&walls, p, 10.0),
            nearest_platform(&platforms, p, 15.0),
        );
        assert!(matches!(target, Some(HitTarget::Wall { index: 0, .. })));
    }

    #[test]
    fn test_tie_prefers_platform() {
        let wall = Some(HitTarget::Wall {
            index: 0,
            distance: 4.0,
        });
        let platform = Some(HitTarget::Platform {
            index: 2,
            distance: 4.0,
        });
        assert_eq!(pick(wall, platform), platform);
        assert_eq!(pick(wall, None), wall);
        assert_eq!(pick(None, None), None);
    }
}
