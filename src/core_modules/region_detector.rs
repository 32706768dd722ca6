// THEORY:
// The `region_detector` is the spatial layer of the frame pipeline. It takes
// the per-pixel threshold decision (a binary mask) and turns it into a small
// list of coherent objects with bounding boxes.
//
// Key architectural principles:
// 1.  **Union masking**: a threshold set may hold several ranges (red wraps
//     the hue axis); a pixel belongs to the mask when any range accepts it.
// 2.  **Region growing**: connected components are found by breadth-first
//     search over 4-connected mask pixels, with a `visited` grid so no pixel
//     is processed twice. Bounding boxes are aggregated while growing.
// 3.  **Stateless utility**: one mask in, one list of regions out. No memory
//     of previous frames lives here.

use crate::core_modules::color_space::ThresholdRange;

/// A connected mask region, in downsampled-grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Number of mask pixels in the component.
    pub area: usize,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// Builds the union mask: true where any range accepts the converted pixel.
pub fn build_mask(converted: &[[u8; 3]], ranges: &[ThresholdRange]) -> Vec<bool> {
    converted
        .iter()
        .map(|pixel| ranges.iter().any(|range| range.contains(*pixel)))
        .collect()
}

/// Extracts all 4-connected components from the mask.
pub fn find_regions(mask: &[bool], width: u32, height: u32) -> Vec<Region> {
    debug_assert_eq!(mask.len(), (width * height) as usize);

    let mut visited = vec![false; mask.len()];
    let mut regions = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }
        regions.push(grow_region(start, mask, &mut visited, width, height));
    }

    regions
}

/// BFS from a seed pixel, aggregating area and bounding box as it grows.
fn grow_region(
    seed: usize,
    mask: &[bool],
    visited: &mut [bool],
    width: u32,
    height: u32,
) -> Region {
    let mut queue = vec![seed];
    visited[seed] = true;

    let mut area = 0usize;
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;

    while let Some(index) = queue.pop() {
        let x = index as u32 % width;
        let y = index as u32 / width;

        area += 1;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for (dx, dy) in [(0i64, 1i64), (0, -1), (1, 0), (-1, 0)] {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let neighbor = (ny as u32 * width + nx as u32) as usize;
            if mask[neighbor] && !visited[neighbor] {
                visited[neighbor] = true;
                queue.push(neighbor);
            }
        }
    }

    Region {
        area,
        min_x,
        min_y,
        max_x,
        max_y,
    }
}
