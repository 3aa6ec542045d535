//! Dense per-kind particle collections

use super::particle::{DrawContext, Lifecycle, Particle, TickEffects};
use crate::canvas::Canvas;

/// Ordered collection of one particle kind.
///
/// A step walks members from the last index to the first (draw, then update), recording
/// expired indices. Those indices come out in descending order, so they are swap-removed
/// after the pass without disturbing any index still pending removal.
#[derive(Debug, Clone)]
pub struct Population<P> {
    members: Vec<P>,
    expired: Vec<usize>,
}

impl<P> Default for Population<P> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            expired: Vec::new(),
        }
    }
}

impl<P: Particle> Population<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, particle: P) {
        self.members.push(particle);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.members.iter()
    }

    /// Draw and update every member once, then drop the ones that expired.
    /// Returns the number removed.
    pub fn step(
        &mut self,
        canvas: &mut dyn Canvas,
        ctx: &DrawContext,
        effects: &mut TickEffects,
    ) -> usize {
        self.expired.clear();

        for i in (0..self.members.len()).rev() {
            let particle = &mut self.members[i];
            particle.draw(canvas, ctx);
            if particle.update(effects) == Lifecycle::Expire {
                self.expired.push(i);
            }
        }

        for &i in &self.expired {
            self.members.swap_remove(i);
        }
        self.expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawList;
    use crate::settings::Settings;
    use proptest::prelude::*;

    /// Counts how often it was visited and expires on a chosen tick
    #[derive(Debug)]
    struct Probe {
        id: usize,
        expire_on: u32,
        updates: u32,
        draws: std::cell::Cell<u32>,
    }

    impl Particle for Probe {
        fn draw(&self, _canvas: &mut dyn Canvas, _ctx: &DrawContext) {
            self.draws.set(self.draws.get() + 1);
        }

        fn update(&mut self, _effects: &mut TickEffects) -> Lifecycle {
            self.updates += 1;
            if self.updates >= self.expire_on {
                Lifecycle::Expire
            } else {
                Lifecycle::Continue
            }
        }
    }

    fn probe(id: usize, expire_on: u32) -> Probe {
        Probe {
            id,
            expire_on,
            updates: 0,
            draws: std::cell::Cell::new(0),
        }
    }

    fn step(pop: &mut Population<Probe>) -> usize {
        let settings = Settings::default();
        let ctx = DrawContext {
            hue: 0.0,
            settings: &settings,
        };
        pop.step(&mut DrawList::new(), &ctx, &mut TickEffects::default())
    }

    #[test]
    fn test_insert_appends() {
        let mut pop = Population::new();
        pop.insert(probe(0, 1));
        pop.insert(probe(1, 1));
        let ids: Vec<usize> = pop.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_removes_expired_members() {
        let mut pop = Population::new();
        for (id, expire_on) in [(0, 1), (1, 3), (2, 1), (3, 2)].into_iter() {
            pop.insert(probe(id, expire_on));
        }

        assert_eq!(step(&mut pop), 2);
        let mut ids: Vec<usize> = pop.iter().map(|p| p.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 3]);

        assert_eq!(step(&mut pop), 1);
        assert_eq!(step(&mut pop), 1);
        assert!(pop.is_empty());
    }

    proptest! {
        #[test]
        fn every_member_visited_once_per_pass(
            lifetimes in prop::collection::vec(1u32..4, 0..64),
        ) {
            let mut pop = Population::new();
            for (id, &life) in lifetimes.iter().enumerate() {
                pop.insert(probe(id, life));
            }

            let mut pass = 0u32;
            while !pop.is_empty() {
                pass += 1;
                let before = pop.len();
                let removed = step(&mut pop);
                prop_assert_eq!(pop.len(), before - removed);
                for p in pop.iter() {
                    prop_assert_eq!(p.updates, pass);
                    prop_assert_eq!(p.draws.get(), pass);
                    prop_assert!(p.updates < p.expire_on);
                }
            }
            prop_assert!(pass <= 3);
        }
    }
}
