use std::fmt;

use serde::Serialize;

use super::clientset::ClientSet;
use super::utils::ProblemInstance;

/// One driver slot of one day of the schedule. The day is the route's position inside a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Route {
    pub slot: usize,
    pub clients: ClientSet,
}

impl Route {
    pub fn from_schedule(instance: &ProblemInstance, day: usize, slot: usize) -> Self {
        Route {
            slot,
            clients: *instance.route(day, slot),
        }
    }
}

/// A column of the master problem: one route per day for a single driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub id: usize,
    pub routes: Vec<Route>,
    pub cost: usize,
}

impl Path {
    fn new(id: usize, routes: Vec<Route>) -> Self {
        let cost = Self::clients_of(&routes).len();
        Path {
            id,
            routes,
            cost,
        }
    }

    pub fn clients_of(routes: &[Route]) -> ClientSet {
        routes.iter().fold(ClientSet::new(), |acc, route| acc.union(&route.clients))
    }

    pub fn clients(&self) -> ClientSet {
        Self::clients_of(&self.routes)
    }

    #[inline]
    pub fn covers(&self, day: usize, slot: usize) -> bool {
        self.routes.get(day).is_some_and(|route| route.slot == slot)
    }

    pub fn slots(&self) -> Vec<usize> {
        self.routes.iter().map(|route| route.slot).collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{} (cost {}):", self.id, self.cost)?;
        for route in self.routes.iter() {
            write!(f, " {:?}", route.clients)?;
        }
        Ok(())
    }
}

/// Append-only pool of every column generated so far. A path's id is its index.
#[derive(Debug, Clone, Default)]
pub struct PathPool {
    paths: Vec<Path>,
}

impl PathPool {
    pub fn new() -> Self {
        PathPool { paths: Vec::new() }
    }

    /// One path per driver following that driver's own schedule on every day.
    pub fn from_driver_schedules(instance: &ProblemInstance) -> Self {
        let mut pool = PathPool::new();
        for slot in 0..instance.num_drivers() {
            let routes = (0..instance.num_days())
                .map(|day| Route::from_schedule(instance, day, slot))
                .collect();
            pool.push(routes);
        }
        pool
    }

    pub fn push(&mut self, routes: Vec<Route>) -> &Path {
        let id = self.paths.len();
        self.paths.push(Path::new(id, routes));
        &self.paths[id]
    }

    pub fn find(&self, routes: &[Route]) -> Option<&Path> {
        self.paths.iter().find(|p| p.routes.iter().map(|r| r.slot).eq(routes.iter().map(|r| r.slot)))
    }

    /// First (day, slot) of the schedule that no path in the pool covers.
    pub fn uncovered_slot(&self, instance: &ProblemInstance) -> Option<(usize, usize)> {
        instance.slots().find(|&(day, slot)| !self.paths.iter().any(|p| p.covers(day, slot)))
    }

    pub fn get(&self, id: usize) -> Option<&Path> {
        self.paths.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<'a> IntoIterator for &'a PathPool {
    type Item = &'a Path;
    type IntoIter = std::slice::Iter<'a, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
