use std::fmt;

use grb::attribute::ModelDoubleAttr::ObjVal;
use grb::attribute::ModelModelSenseAttr::ModelSense;
use grb::attribute::VarDoubleAttr::X;
use grb::parameter::IntParam::OutputFlag;
use grb::prelude::*;
use log::debug;
use logging_timer::time;

use crate::error::Result;
use crate::model::{check_status, DualPrices};
use crate::path::{Path, Route};
use crate::utils::ProblemInstance;

/// A candidate column: one route per day taken from the schedule, priced against the current duals.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedPath {
    pub routes: Vec<Route>,
    pub cost: usize,
    pub reduced_cost: f64,
}

impl PricedPath {
    /// Prices the path choosing `slots[day]` on every day.
    pub fn from_slots(data: &ProblemInstance, duals: &DualPrices, slots: &[usize]) -> Self {
        let routes: Vec<Route> = slots.iter()
            .enumerate()
            .map(|(day, &slot)| Route::from_schedule(data, day, slot))
            .collect();
        let cost = Path::clients_of(&routes).len();
        let dual_sum: f64 = slots.iter().enumerate().map(|(day, &slot)| duals[(day, slot)]).sum();

        PricedPath {
            routes,
            cost,
            reduced_cost: cost as f64 - dual_sum,
        }
    }

    pub fn is_improving(&self, tolerance: f64) -> bool {
        self.reduced_cost < -tolerance
    }

    pub fn slots(&self) -> Vec<usize> {
        self.routes.iter().map(|r| r.slot).collect()
    }
}

impl fmt::Display for PricedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rc: {:.4}, cost: {}, routes:", self.reduced_cost, self.cost)?;
        for route in self.routes.iter() {
            write!(f, " {:?}", route.clients)?;
        }
        Ok(())
    }
}

pub trait Pricer {
    fn solve_pricing_problem(&mut self) -> Result<PricedPath>;
}

/// Solves the pricing subproblem as a binary program: `z[day][slot]` picks the route of each day,
/// `y[client]` marks the clients the assembled path touches.
pub struct MipPricer<'a> {
    data: &'a ProblemInstance,
    duals: &'a DualPrices,
    solver_output: bool,
}

impl<'a> MipPricer<'a> {
    pub fn new(data: &'a ProblemInstance, duals: &'a DualPrices, solver_output: bool) -> Self {
        MipPricer {
            data,
            duals,
            solver_output,
        }
    }

    fn build_model(&self) -> Result<(Model, Vec<Vec<Var>>)> {
        let mut model = Model::new("SubProb")?;
        if !self.solver_output {
            model.set_param(OutputFlag, 0)?;
        }

        // y_c, objective coefficient 1
        let clients_in_path: Vec<Var> = self.data.client_ids()
            .map(|c| model.add_var(&format!("client_{c}"), Binary, 1.0, 0.0, 1.0, []))
            .collect::<grb::Result<_>>()?;

        // z_jr, objective coefficient -dual
        let route_in_path: Vec<Vec<Var>> = (0..self.data.num_days())
            .map(|day| {
                (0..self.data.num_drivers())
                    .map(|slot| model.add_var(
                        &format!("route_in_path_{day}_{slot}"),
                        Binary,
                        -self.duals[(day, slot)],
                        0.0,
                        1.0,
                        [],
                    ))
                    .collect::<grb::Result<Vec<_>>>()
            })
            .collect::<grb::Result<_>>()?;

        for (day, routes) in route_in_path.iter().enumerate() {
            model.add_constr(
                &format!("one_route_per_day_{day}"),
                c!(routes.iter().grb_sum() == 1.0)
            )?;
        }

        for (day, routes) in route_in_path.iter().enumerate() {
            for (slot, &z) in routes.iter().enumerate() {
                for c in self.data.route(day, slot).iter() {
                    let y = clients_in_path[c - 1];
                    model.add_constr(
                        &format!("client_{c}_in_route_{day}_{slot}"),
                        c!(y >= z)
                    )?;
                }
            }
        }

        model.set_attr(ModelSense, Minimize)?;
        model.update()?;

        Ok((model, route_in_path))
    }
}

impl Pricer for MipPricer<'_> {
    #[time]
    fn solve_pricing_problem(&mut self) -> Result<PricedPath> {
        let (mut model, route_in_path) = self.build_model()?;
        model.optimize()?;
        check_status(&model, "pricing")?;

        // Exactly one z per day is 1; take the largest value to be safe against solver noise
        let mut routes = Vec::with_capacity(route_in_path.len());
        for (day, vars) in route_in_path.iter().enumerate() {
            let mut slot = 0;
            let mut best = f64::NEG_INFINITY;
            for (r, var) in vars.iter().enumerate() {
                let value = model.get_obj_attr(X, var)?;
                if value > best {
                    slot = r;
                    best = value;
                }
            }
            routes.push(Route::from_schedule(self.data, day, slot));
        }

        let reduced_cost = model.get_attr(ObjVal)?;
        let cost = Path::clients_of(&routes).len();
        let priced = PricedPath { routes, cost, reduced_cost };
        debug!("New path = {}", priced);

        Ok(priced)
    }
}

/// Enumerates all `drivers^days` route combinations. Exact, and only meant for small schedules.
pub struct EnumerationPricer<'a> {
    data: &'a ProblemInstance,
    duals: &'a DualPrices,
}

impl<'a> EnumerationPricer<'a> {
    pub fn new(data: &'a ProblemInstance, duals: &'a DualPrices) -> Self {
        EnumerationPricer { data, duals }
    }
}

impl Pricer for EnumerationPricer<'_> {
    #[time]
    fn solve_pricing_problem(&mut self) -> Result<PricedPath> {
        let days = self.data.num_days();
        let drivers = self.data.num_drivers();

        let mut slots = vec![0; days];
        let mut best = PricedPath::from_slots(self.data, self.duals, &slots);

        loop {
            // advance the odometer, day 0 fastest
            let mut day = 0;
            while day < days {
                slots[day] += 1;
                if slots[day] < drivers {
                    break;
                }
                slots[day] = 0;
                day += 1;
            }
            if day == days {
                break;
            }

            let candidate = PricedPath::from_slots(self.data, self.duals, &slots);
            if candidate.reduced_cost < best.reduced_cost {
                best = candidate;
            }
        }
        debug!("New path = {}", best);

        Ok(best)
    }
}
