//! Internal octree node representation and cube coordinate math.

use glam::DVec3;

/// Sentinel for an absent child slot.
pub(crate) const NO_CHILD: u32 = u32::MAX;

/// Arena node: an axis-aligned cube that is either a leaf range into the
/// entry buffer or a branch with up to eight children.
pub(crate) struct Node {
  pub center: DVec3,
  pub half_extent: f64,
  pub kind: NodeKind,
}

pub(crate) enum NodeKind {
  Leaf { start: u32, len: u32 },
  Branch { children: [u32; 8] },
}

/// Octant code from the sign of `p - center`.
///
/// Bit 0: +X half, bit 1: +Y half, bit 2: +Z half. Points exactly on a
/// splitting plane land in the positive half.
#[inline]
pub(crate) fn octant(center: DVec3, p: DVec3) -> usize {
  usize::from(p.x >= center.x)
    | (usize::from(p.y >= center.y) << 1)
    | (usize::from(p.z >= center.z) << 2)
}

/// Center of the child cube in the given octant.
#[inline]
pub(crate) fn child_center(center: DVec3, half: f64, octant: usize) -> DVec3 {
  let q = half * 0.5;
  DVec3::new(
    center.x + if octant & 1 != 0 { q } else { -q },
    center.y + if octant & 2 != 0 { q } else { -q },
    center.z + if octant & 4 != 0 { q } else { -q },
  )
}

/// Inclusive overlap test between a node cube and a query envelope.
#[inline]
pub(crate) fn cube_overlaps(center: DVec3, half: f64, env_min: DVec3, env_max: DVec3) -> bool {
  center.x - half <= env_max.x
    && center.x + half >= env_min.x
    && center.y - half <= env_max.y
    && center.y + half >= env_min.y
    && center.z - half <= env_max.z
    && center.z + half >= env_min.z
}
