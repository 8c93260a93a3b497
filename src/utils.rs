use std::fs;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::clientset::{Client, ClientSet};
use crate::constants::MAX_CLIENTS;
use crate::error::{ColGenError, Result};

/// The fixed input schedule: for every day, the route of every driver slot.
///
/// `schedule[day][slot]` is the set of clients the driver in `slot` serves on `day`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemInstance {
    pub clients: usize,
    pub schedule: Vec<Vec<ClientSet>>,
}

impl ProblemInstance {
    pub fn new(clients: usize, schedule: Vec<Vec<ClientSet>>) -> Result<Self> {
        let instance = ProblemInstance { clients, schedule };
        instance.validate()?;
        Ok(instance)
    }

    pub fn from_file(filename: impl AsRef<FsPath>) -> Result<Self> {
        let file = fs::read_to_string(filename)?;
        Self::from_json(&file)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let instance: ProblemInstance = serde_json::from_str(json)?;
        instance.validate()?;
        Ok(instance)
    }

    /// Builds an instance from plain client lists, e.g. `[[[1, 2], [3]], [[3], [1, 2]]]`.
    pub fn from_lists(clients: usize, schedule: &[Vec<Vec<Client>>]) -> Result<Self> {
        let schedule = schedule.iter()
            .map(|day| day.iter().map(|route| route.iter().copied().collect()).collect())
            .collect();
        Self::new(clients, schedule)
    }

    fn validate(&self) -> Result<()> {
        if self.clients > MAX_CLIENTS {
            return Err(ColGenError::InvalidInstance(format!(
                "{} clients exceed the supported maximum of {MAX_CLIENTS}", self.clients
            )));
        }
        if self.schedule.is_empty() {
            return Err(ColGenError::InvalidInstance("schedule has no days".to_string()));
        }
        let drivers = self.schedule[0].len();
        if drivers == 0 {
            return Err(ColGenError::InvalidInstance("schedule has no drivers".to_string()));
        }

        for (day, routes) in self.schedule.iter().enumerate() {
            if routes.len() != drivers {
                return Err(ColGenError::InvalidInstance(format!(
                    "day {day} has {} routes, expected {drivers}", routes.len()
                )));
            }
            for (slot, route) in routes.iter().enumerate() {
                if let Some(c) = route.iter().find(|&c| c == 0 || c > self.clients) {
                    return Err(ColGenError::InvalidInstance(format!(
                        "route {slot} on day {day} serves client {c} outside 1..={}", self.clients
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn num_days(&self) -> usize {
        self.schedule.len()
    }

    pub fn num_drivers(&self) -> usize {
        self.schedule[0].len()
    }

    pub fn route(&self, day: usize, slot: usize) -> &ClientSet {
        &self.schedule[day][slot]
    }

    pub fn client_ids(&self) -> impl Iterator<Item = Client> {
        1..=self.clients
    }

    /// Every (day, slot) pair of the schedule, day-major.
    pub fn slots(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_days()).flat_map(move |day| (0..self.num_drivers()).map(move |slot| (day, slot)))
    }
}
