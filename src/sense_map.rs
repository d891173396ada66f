//! Aggregates many sense sources into one global intensity field.
//!
//! Each `calculate` propagates every enabled source (in parallel when more
//! than one is registered), then merges the local buffers into the global
//! field with `max`. Each source is exclusively borrowed by a single worker;
//! the resistance map is shared read-only.

use rayon::prelude::*;

use crate::error::SenseError;
use crate::geometry::Coord;
use crate::propagation::propagate;
use crate::resistance::ResistanceMap;
use crate::source::SenseSource;

/// Handle to a source registered in a [`SenseMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u32);

impl SourceId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Global sense field over a resistance map.
#[derive(Debug)]
pub struct SenseMap<R> {
    resistance: R,
    sources: Vec<(SourceId, SenseSource)>,
    next_id: u32,
    parallel: bool,
    field: Vec<f64>,
    current: Vec<bool>,
    previous: Vec<bool>,
}

impl<R: ResistanceMap + Sync> SenseMap<R> {
    pub fn new(resistance: R) -> Self {
        let cells = resistance.width() * resistance.height();
        SenseMap {
            resistance,
            sources: Vec::new(),
            next_id: 0,
            parallel: true,
            field: vec![0.0; cells],
            current: vec![false; cells],
            previous: vec![false; cells],
        }
    }

    pub fn width(&self) -> usize {
        self.resistance.width()
    }

    pub fn height(&self) -> usize {
        self.resistance.height()
    }

    pub fn resistance(&self) -> &R {
        &self.resistance
    }

    /// Mutable access for doors, destructible walls and the like. Takes
    /// effect on the next `calculate`. The map's dimensions must not change.
    pub fn resistance_mut(&mut self) -> &mut R {
        &mut self.resistance
    }

    /// Whether `calculate` may spread sources over the rayon pool.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn add_source(&mut self, source: SenseSource) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.sources.push((id, source));
        id
    }

    pub fn remove_source(&mut self, id: SourceId) -> Result<SenseSource, SenseError> {
        let idx = self
            .sources
            .iter()
            .position(|(sid, _)| *sid == id)
            .ok_or(SenseError::UnknownSource { id: id.0 })?;
        Ok(self.sources.remove(idx).1)
    }

    pub fn source(&self, id: SourceId) -> Option<&SenseSource> {
        self.sources
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, s)| s)
    }

    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut SenseSource> {
        self.sources
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .map(|(_, s)| s)
    }

    /// Registered sources in insertion order.
    pub fn sources(&self) -> impl Iterator<Item = (SourceId, &SenseSource)> {
        self.sources.iter().map(|(id, s)| (*id, s))
    }

    /// Recompute the global field from every enabled source.
    pub fn calculate(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
        self.field.fill(0.0);

        let resistance = &self.resistance;
        if self.parallel && self.sources.len() > 1 {
            self.sources
                .par_iter_mut()
                .for_each(|(_, source)| propagate(source, resistance));
        } else {
            for (_, source) in &mut self.sources {
                propagate(source, resistance);
            }
        }

        let width = self.width();
        let height = self.height();
        for (_, source) in self.sources.iter().filter(|(_, s)| s.enabled()) {
            blit_max(&mut self.field, width, height, source);
        }

        for (lit, &value) in self.current.iter_mut().zip(&self.field) {
            *lit = value > 0.0;
        }

        log::debug!(
            "sense map {}x{}: {} sources ({} enabled), {} cells sensed",
            width,
            height,
            self.sources.len(),
            self.sources.iter().filter(|(_, s)| s.enabled()).count(),
            self.current.iter().filter(|&&lit| lit).count()
        );
    }

    /// Merged intensity at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        assert!(
            x < self.width() && y < self.height(),
            "({x}, {y}) outside {}x{} sense map",
            self.width(),
            self.height()
        );
        self.field[y * self.width() + x]
    }

    /// Row-major merged field.
    pub fn field(&self) -> &[f64] {
        &self.field
    }

    /// Cells with intensity > 0 after the last `calculate`, row-major.
    pub fn current_sense_map(&self) -> impl Iterator<Item = Coord> + '_ {
        self.positions(|idx| self.current[idx])
    }

    /// Cells sensed now that were not sensed before the last `calculate`.
    pub fn new_sense_map(&self) -> impl Iterator<Item = Coord> + '_ {
        self.positions(|idx| self.current[idx] && !self.previous[idx])
    }

    /// Cells sensed before the last `calculate` that no longer are.
    pub fn newly_out_of_sense_map(&self) -> impl Iterator<Item = Coord> + '_ {
        self.positions(|idx| self.previous[idx] && !self.current[idx])
    }

    fn positions<'a>(
        &'a self,
        keep: impl Fn(usize) -> bool + 'a,
    ) -> impl Iterator<Item = Coord> + 'a {
        let width = self.width();
        (0..self.field.len())
            .filter(move |&idx| keep(idx))
            .map(move |idx| Coord::new((idx % width) as i32, (idx / width) as i32))
    }
}

/// Max-merge `source`'s local buffer into the global field, clipped to its bounds.
fn blit_max(field: &mut [f64], width: usize, height: usize, source: &SenseSource) {
    let local = source.local();
    let size = local.size();
    let origin = local.origin();

    // Clip the local window against the global grid once, then copy rows.
    let i_start = (-origin.x).max(0) as usize;
    let j_start = (-origin.y).max(0) as usize;
    let i_end = (width as i64 - origin.x as i64).clamp(0, size as i64) as usize;
    let j_end = (height as i64 - origin.y as i64).clamp(0, size as i64) as usize;

    for j in j_start..j_end {
        let gy = (origin.y + j as i32) as usize;
        for i in i_start..i_end {
            let gx = (origin.x + i as i32) as usize;
            let cell = &mut field[gy * width + gx];
            *cell = cell.max(local.get(i, j));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Distance;
    use crate::resistance::ResistanceGrid;
    use crate::source::SourceType;

    fn open_map(width: usize, height: usize) -> SenseMap<ResistanceGrid> {
        SenseMap::new(ResistanceGrid::new(width, height).unwrap())
    }

    #[test]
    fn empty_map_stays_dark() {
        let mut map = open_map(6, 4);
        map.calculate();
        assert!(map.field().iter().all(|&v| v == 0.0));
        assert_eq!(map.current_sense_map().count(), 0);
    }

    #[test]
    fn single_source_lands_at_its_offset() {
        let mut map = open_map(10, 10);
        let id = map.add_source(
            SenseSource::new(SourceType::Shadowcast, (6, 3), 2, Distance::Chebyshev).unwrap(),
        );
        map.calculate();

        assert_eq!(map.get(6, 3), 1.0);
        assert!((map.get(8, 1) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(map.get(9, 3), 0.0);
        assert_eq!(map.current_sense_map().count(), 25);
        assert_eq!(map.source(id).map(|s| s.position()), Some(Coord::new(6, 3)));
    }

    #[test]
    fn overlapping_sources_merge_with_max() {
        let mut map = open_map(12, 5);
        map.add_source(SenseSource::new(SourceType::Shadowcast, (3, 2), 4, Distance::Chebyshev).unwrap());
        map.add_source(SenseSource::new(SourceType::Shadowcast, (7, 2), 4, Distance::Chebyshev).unwrap());
        map.calculate();

        // (5, 2) is 2 away from both: max, not sum.
        assert!((map.get(5, 2) - 0.6).abs() < 1e-12);
        assert_eq!(map.get(3, 2), 1.0);
        assert_eq!(map.get(7, 2), 1.0);
        assert!((map.get(11, 2) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn sources_clipped_at_the_map_edge() {
        let mut map = open_map(4, 4);
        map.add_source(SenseSource::new(SourceType::Ripple, (0, 0), 6, Distance::Chebyshev).unwrap());
        map.add_source(SenseSource::new(SourceType::Shadowcast, (3, 3), 6, Distance::Euclidean).unwrap());
        map.calculate();
        assert_eq!(map.get(0, 0), 1.0);
        assert_eq!(map.get(3, 3), 1.0);
        assert!(map.field().iter().all(|&v| v > 0.0 && v <= 1.0));
    }

    #[test]
    fn disabled_sources_contribute_nothing() {
        let mut map = open_map(9, 9);
        let id = map.add_source(
            SenseSource::new(SourceType::Shadowcast, (4, 4), 3, Distance::Euclidean).unwrap(),
        );
        map.calculate();
        assert!(map.get(4, 4) > 0.0);

        map.source_mut(id).unwrap().set_enabled(false);
        map.calculate();
        assert!(map.field().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn tracks_cells_entering_and_leaving() {
        let mut map = open_map(12, 3);
        let id = map.add_source(
            SenseSource::new(SourceType::Shadowcast, (2, 1), 1, Distance::Chebyshev).unwrap(),
        );
        map.calculate();
        assert_eq!(map.new_sense_map().count(), 9);
        assert_eq!(map.newly_out_of_sense_map().count(), 0);

        map.source_mut(id).unwrap().set_position((3, 1));
        map.calculate();
        let entered: Vec<Coord> = map.new_sense_map().collect();
        let left: Vec<Coord> = map.newly_out_of_sense_map().collect();
        assert_eq!(entered, vec![Coord::new(4, 0), Coord::new(4, 1), Coord::new(4, 2)]);
        assert_eq!(left, vec![Coord::new(1, 0), Coord::new(1, 1), Coord::new(1, 2)]);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let mut grid = ResistanceGrid::new(20, 20).unwrap();
        grid.fill_rect(8, 2, 1, 14, 1.0);
        grid.fill_rect(12, 10, 5, 1, 0.4);

        let build = |parallel: bool| {
            let mut map = SenseMap::new(grid.clone());
            map.set_parallel(parallel);
            for (k, source_type) in SourceType::ALL.into_iter().enumerate() {
                let pos = (2 + 4 * k as i32, 5 + (k as i32 % 3) * 4);
                map.add_source(SenseSource::new(source_type, pos, 6, Distance::Euclidean).unwrap());
            }
            map.calculate();
            map.field().to_vec()
        };
        assert_eq!(build(true), build(false));
    }

    #[test]
    fn remove_unknown_source_is_an_error() {
        let mut map = open_map(3, 3);
        let id = map.add_source(
            SenseSource::new(SourceType::Shadowcast, (1, 1), 1, Distance::Chebyshev).unwrap(),
        );
        assert!(map.remove_source(id).is_ok());
        assert_eq!(
            map.remove_source(id).unwrap_err(),
            SenseError::UnknownSource { id: id.raw() }
        );
        assert_eq!(map.sources().count(), 0);
    }
}
