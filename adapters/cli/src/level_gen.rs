//! Seeded maze generation for demo campaigns.
//!
//! Carves perfect mazes with an iterative depth-first backtracker, then opens
//! one entrance on the west edge and one exit on the east edge. Walls are
//! reciprocal by construction, which is exactly what the corridor resolver
//! assumes of authored level data.

use maze_drive_core::{
    CellBlueprint, CellCoord, Difficulty, Direction, GridSize, LevelBlueprint, WallMask,
    CARDINALS,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::level_transfer::CampaignSnapshot;

/// Chance that a dead-end cell hides a fuel canister.
const PICKUP_CHANCE: f64 = 0.35;

/// Generates a reproducible campaign of identically sized levels.
pub(crate) fn generate_campaign(
    seed: u64,
    level_count: u32,
    size: GridSize,
    difficulty: Difficulty,
) -> CampaignSnapshot {
    use rand::SeedableRng as _;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let levels = (0..level_count)
        .map(|_| generate_level(&mut rng, size))
        .collect();
    CampaignSnapshot { difficulty, levels }
}

/// Carves a single perfect maze of the provided dimensions.
pub(crate) fn generate_level(rng: &mut ChaCha8Rng, size: GridSize) -> LevelBlueprint {
    let width = size.width() as i32;
    let height = size.height() as i32;
    let index = |cell: CellCoord| -> usize {
        cell.y() as usize * size.width() as usize + cell.x() as usize
    };

    let mut walls = vec![WallMask::new(0b1111); size.cell_count()];
    let mut visited = vec![false; size.cell_count()];

    let entry_row = rng.gen_range(0..height);
    let entry = CellCoord::new(0, entry_row);
    visited[index(entry)] = true;
    let mut stack = vec![entry];

    while let Some(&current) = stack.last() {
        let mut candidates = [Direction::North; 4];
        let mut candidate_count = 0;
        for direction in CARDINALS {
            let neighbor = current.step(direction);
            if size.contains(neighbor) && !visited[index(neighbor)] {
                candidates[candidate_count] = direction;
                candidate_count += 1;
            }
        }

        if candidate_count == 0 {
            let _ = stack.pop();
            continue;
        }

        let direction = candidates[rng.gen_range(0..candidate_count)];
        let next = current.step(direction);
        walls[index(current)] = walls[index(current)].without_wall(direction);
        walls[index(next)] = walls[index(next)].without_wall(direction.opposite());
        visited[index(next)] = true;
        stack.push(next);
    }

    // Boundary openings: the entrance faces west, the exit faces east.
    walls[index(entry)] = walls[index(entry)].without_wall(Direction::West);
    let exit = CellCoord::new(width - 1, rng.gen_range(0..height));
    walls[index(exit)] = walls[index(exit)].without_wall(Direction::East);

    let cells = walls
        .iter()
        .enumerate()
        .map(|(i, mask)| {
            let cell = CellCoord::new(
                (i % size.width() as usize) as i32,
                (i / size.width() as usize) as i32,
            );
            let dead_end = mask.wall_count() == 3 && cell != entry && cell != exit;
            CellBlueprint {
                walls: *mask,
                fuel_pickup: dead_end && rng.gen_bool(PICKUP_CHANCE),
            }
        })
        .collect();

    LevelBlueprint::new(size, entry_row, cells)
}

#[cfg(test)]
mod tests {
    use super::generate_campaign;
    use maze_drive_core::{CellCoord, Difficulty, Direction, GridSize, CARDINALS};

    const SIZE: GridSize = GridSize::new(8, 6);

    #[test]
    fn identical_seeds_reproduce_the_campaign() {
        let first = generate_campaign(42, 3, SIZE, Difficulty::Medium);
        let second = generate_campaign(42, 3, SIZE, Difficulty::Medium);
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_diverge() {
        let first = generate_campaign(1, 1, SIZE, Difficulty::Easy);
        let second = generate_campaign(2, 1, SIZE, Difficulty::Easy);
        assert_ne!(first, second);
    }

    #[test]
    fn generated_levels_are_consistent_and_fully_carved() {
        let campaign = generate_campaign(7, 2, SIZE, Difficulty::Hard);
        for level in &campaign.levels {
            assert!(level.is_consistent());
            // A perfect maze reaches every cell: no cell keeps all four walls.
            assert!(level.cells().iter().all(|cell| cell.walls.bits() != 0b1111));
        }
    }

    #[test]
    fn interior_walls_are_reciprocal() {
        let campaign = generate_campaign(11, 1, SIZE, Difficulty::Medium);
        let level = &campaign.levels[0];
        let size = level.size();
        let mask_at = |cell: CellCoord| {
            level.cells()[cell.y() as usize * size.width() as usize + cell.x() as usize].walls
        };

        for y in 0..size.height() as i32 {
            for x in 0..size.width() as i32 {
                let cell = CellCoord::new(x, y);
                for direction in CARDINALS {
                    let neighbor = cell.step(direction);
                    if !size.contains(neighbor) {
                        continue;
                    }
                    assert_eq!(
                        mask_at(cell).is_blocked(direction),
                        mask_at(neighbor).is_blocked(direction.opposite()),
                        "wall between {cell:?} and {neighbor:?} disagrees"
                    );
                }
            }
        }
    }

    #[test]
    fn the_entrance_opens_west_and_the_exit_opens_east() {
        let campaign = generate_campaign(5, 1, SIZE, Difficulty::Easy);
        let level = &campaign.levels[0];
        let size = level.size();
        let entry_mask = level.cells()
            [level.entry().y() as usize * size.width() as usize].walls;
        assert!(!entry_mask.is_blocked(Direction::West));

        let east_edge = (0..size.height() as i32).any(|y| {
            let mask = level.cells()
                [y as usize * size.width() as usize + (size.width() - 1) as usize]
                .walls;
            !mask.is_blocked(Direction::East)
        });
        assert!(east_edge);
    }
}
