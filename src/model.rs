use std::ops::Index;

use grb::attribute::ConstrDoubleAttr::Pi;
use grb::attribute::ModelDoubleAttr::ObjVal;
use grb::attribute::ModelModelSenseAttr::ModelSense;
use grb::attribute::VarDoubleAttr::X;
use grb::parameter::IntParam::OutputFlag;
use grb::prelude::*;
use grb::Status;
use log::{debug, info, warn};
use logging_timer::time;
use serde::Serialize;

use super::config::{ColGenConfig, PricerKind};
use super::constants::ROUNDING_THRESHOLD;
use super::error::{ColGenError, Result};
use super::path::{Path, PathPool};
use super::pricing::*;
use super::utils::ProblemInstance;

/// Dual price of every covering constraint, indexed by `(day, slot)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DualPrices {
    prices: Vec<Vec<f64>>,
}

impl DualPrices {
    pub fn zeros(days: usize, drivers: usize) -> Self {
        DualPrices { prices: vec![vec![0.0; drivers]; days] }
    }

    pub fn from_rows(prices: Vec<Vec<f64>>) -> Self {
        DualPrices { prices }
    }

    pub fn set(&mut self, day: usize, slot: usize, price: f64) {
        self.prices[day][slot] = price;
    }

    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
        self.prices.iter()
            .enumerate()
            .flat_map(|(day, row)| row.iter().enumerate().map(move |(slot, &p)| ((day, slot), p)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, p)| p).sum()
    }
}

impl Index<(usize, usize)> for DualPrices {
    type Output = f64;

    fn index(&self, (day, slot): (usize, usize)) -> &f64 {
        &self.prices[day][slot]
    }
}

pub(crate) fn check_status(model: &Model, name: &'static str) -> Result<()> {
    match model.status()? {
        Status::Optimal => Ok(()),
        // both models are bounded below, so presolve's "infeasible or unbounded" means infeasible
        Status::Infeasible | Status::InfOrUnbd => Err(ColGenError::InfeasibleModel(name)),
        Status::Unbounded => Err(ColGenError::UnboundedModel(name)),
        status => Err(ColGenError::UnexpectedStatus { model: name, status }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterMode {
    Relaxed,
    Integer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxedSolution {
    pub objective: f64,
    pub duals: DualPrices,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerSolution {
    pub objective: usize,
    pub selected: Vec<Path>,
}

/// Set covering over the current pool: every (day, slot) of the schedule needs a path using that route.
pub struct MasterProblemModel<'a> {
    pub data: &'a ProblemInstance,
    pub paths: &'a PathPool,
    pub mode: MasterMode,
    pub model: Model,
    pub lambda: Vec<Var>,
    pub cover_constraints: Vec<Vec<Constr>>,
}

impl<'a> MasterProblemModel<'a> {
    pub fn new(data: &'a ProblemInstance, paths: &'a PathPool, mode: MasterMode, solver_output: bool) -> Result<Self> {
        let mut model = Model::new("Consistency")?;
        if !solver_output {
            model.set_param(OutputFlag, 0)?;
        }

        // x_p <= 1 never binds in the LP (costs >= 0, rhs 1), only the integer model carries it
        let (vtype, ub) = match mode {
            MasterMode::Relaxed => (Continuous, grb::INFINITY),
            MasterMode::Integer => (Binary, 1.0),
        };

        let lambda: Vec<Var> = paths.iter()
            .map(|path| model.add_var(&format!("path_{}", path.id), vtype, path.cost as f64, 0.0, ub, []))
            .collect::<grb::Result<_>>()?;

        let mut cover_constraints = Vec::with_capacity(data.num_days());
        for day in 0..data.num_days() {
            let mut row = Vec::with_capacity(data.num_drivers());
            for slot in 0..data.num_drivers() {
                let constr_expr = paths.iter()
                    .zip(lambda.iter())
                    .filter(|(path, _)| path.covers(day, slot))
                    .map(|(_, lambda)| *lambda)
                    .grb_sum();

                row.push(model.add_constr(
                    &format!("cover_{day}_{slot}"),
                    c!(constr_expr >= 1.0)
                )?);
            }
            cover_constraints.push(row);
        }

        model.set_attr(ModelSense, Minimize)?;
        model.update()?;

        Ok(MasterProblemModel {
            data,
            paths,
            mode,
            model,
            lambda,
            cover_constraints,
        })
    }

    pub fn relaxed(data: &'a ProblemInstance, paths: &'a PathPool, solver_output: bool) -> Result<RelaxedSolution> {
        Self::new(data, paths, MasterMode::Relaxed, solver_output)?.solve_relaxed()
    }

    pub fn integer(data: &'a ProblemInstance, paths: &'a PathPool, solver_output: bool) -> Result<IntegerSolution> {
        Self::new(data, paths, MasterMode::Integer, solver_output)?.solve_integer()
    }

    #[time]
    pub fn solve_relaxed(&mut self) -> Result<RelaxedSolution> {
        debug_assert_eq!(self.mode, MasterMode::Relaxed);
        self.model.optimize()?;
        check_status(&self.model, "relaxed master")?;

        let mut duals = DualPrices::zeros(self.data.num_days(), self.data.num_drivers());
        for (day, row) in self.cover_constraints.iter().enumerate() {
            for (slot, constr) in row.iter().enumerate() {
                duals.set(day, slot, self.model.get_obj_attr(Pi, constr)?);
            }
        }

        Ok(RelaxedSolution {
            objective: self.model.get_attr(ObjVal)?,
            duals,
        })
    }

    #[time]
    pub fn solve_integer(&mut self) -> Result<IntegerSolution> {
        debug_assert_eq!(self.mode, MasterMode::Integer);
        self.model.optimize()?;
        check_status(&self.model, "integer master")?;

        let mut selected = Vec::new();
        for (path, var) in self.paths.iter().zip(self.lambda.iter()) {
            if self.model.get_obj_attr(X, var)? > ROUNDING_THRESHOLD {
                selected.push(path.clone());
            }
        }

        Ok(IntegerSolution {
            objective: self.model.get_attr(ObjVal)?.round() as usize,
            selected,
        })
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Generating,
    Finalizing,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColGenSolution {
    pub objective: usize,
    pub selected: Vec<Path>,
    pub iterations: usize,
    pub columns_generated: usize,
    pub pool_size: usize,
    pub relaxed_objectives: Vec<f64>,
    pub last_reduced_cost: f64,
}

impl ColGenSolution {
    pub fn last_relaxed_objective(&self) -> Option<f64> {
        self.relaxed_objectives.last().copied()
    }

    pub fn uncovered_slots(&self, data: &ProblemInstance) -> Vec<(usize, usize)> {
        data.slots()
            .filter(|&(day, slot)| !self.selected.iter().any(|p| p.covers(day, slot)))
            .collect()
    }
}

/// Drives the column generation: relaxed master, pricing, append while improving, then the integer master.
pub struct ColGenModel<'a> {
    pub data: &'a ProblemInstance,
    pub paths: PathPool,
    pub config: ColGenConfig,
    pub phase: Phase,
    pub relaxed_objectives: Vec<f64>,
    pub last_duals: Option<DualPrices>,
}

impl<'a> ColGenModel<'a> {
    pub fn new(data: &'a ProblemInstance, paths: PathPool, config: ColGenConfig) -> Result<Self> {
        for path in paths.iter() {
            if path.routes.len() != data.num_days() || path.routes.iter().any(|r| r.slot >= data.num_drivers()) {
                return Err(ColGenError::InvalidInstance(format!(
                    "initial path P{} does not pick one scheduled route per day", path.id
                )));
            }
        }
        if let Some((day, slot)) = paths.uncovered_slot(data) {
            return Err(ColGenError::UncoveredSlot { day, slot });
        }

        Ok(ColGenModel {
            data,
            paths,
            config,
            phase: Phase::Generating,
            relaxed_objectives: Vec::new(),
            last_duals: None,
        })
    }

    /// Starts from one path per driver following its own schedule.
    pub fn from_driver_schedules(data: &'a ProblemInstance, config: ColGenConfig) -> Result<Self> {
        Self::new(data, PathPool::from_driver_schedules(data), config)
    }

    fn price(&self, duals: &DualPrices) -> Result<PricedPath> {
        match self.config.pricer {
            PricerKind::Mip => MipPricer::new(self.data, duals, self.config.solver_output).solve_pricing_problem(),
            PricerKind::Enumeration => EnumerationPricer::new(self.data, duals).solve_pricing_problem(),
        }
    }

    pub fn solve(&mut self) -> Result<ColGenSolution> {
        let initial_pool = self.paths.len();
        let mut iter = 0;
        let mut last_reduced_cost = 0.0;

        loop {
            match self.phase {
                Phase::Generating => {
                    if iter >= self.config.max_iterations {
                        warn!("No convergence after {} iterations, pool holds {} paths", iter, self.paths.len());
                        return Err(ColGenError::NonTermination { iterations: iter });
                    }
                    iter += 1;

                    let relaxed = MasterProblemModel::relaxed(self.data, &self.paths, self.config.solver_output)?;
                    for ((day, slot), price) in relaxed.duals.iter() {
                        debug!("dual {} {} {}", day, slot, price);
                    }

                    let priced = self.price(&relaxed.duals)?;
                    info!(
                        "Iteration {}: relaxed objective {:.4}, reduced cost {:.6}",
                        iter, relaxed.objective, priced.reduced_cost
                    );
                    last_reduced_cost = priced.reduced_cost;
                    self.relaxed_objectives.push(relaxed.objective);
                    self.last_duals = Some(relaxed.duals);

                    if priced.is_improving(self.config.tolerance) {
                        if let Some(existing) = self.paths.find(&priced.routes) {
                            return Err(ColGenError::DuplicateColumn { path: existing.id });
                        }
                        let path = self.paths.push(priced.routes);
                        info!("New column {}", path);
                    } else {
                        info!("Optimal relaxed objective found after {} iterations", iter);
                        self.phase = Phase::Finalizing;
                    }
                }

                Phase::Finalizing => {
                    let integer = MasterProblemModel::integer(self.data, &self.paths, self.config.solver_output)?;
                    info!("Integer objective {} using {} paths", integer.objective, integer.selected.len());

                    return Ok(ColGenSolution {
                        objective: integer.objective,
                        selected: integer.selected,
                        iterations: iter,
                        columns_generated: self.paths.len() - initial_pool,
                        pool_size: self.paths.len(),
                        relaxed_objectives: self.relaxed_objectives.clone(),
                        last_reduced_cost,
                    });
                }
            }
        }
    }
}
