//! Two-step planning: solve the local models, then the global one, then merge.
//!
//! Building the sub-problems and solving them are delegated to a
//! [`SubProblemBuilder`] and an [`OptimizationEngine`].

use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::error::IntegrationError;
use crate::global::GlobalSolutionAdapter;
use crate::ids::{GlobalShipment, ParkingIdx, ShipmentIdx};
use crate::integrate::integrate;
use crate::local::LocalSolutionAdapter;
use crate::mode::IntegrationMode;
use crate::options::{Options, OptionsError};
use crate::plan::MergedPlan;
use crate::schema::Model;
use crate::traits::{OptimizationEngine, SubProblemBuilder};

/// A local model for one parking location.
#[derive(Debug, Clone)]
pub struct LocalProblem {
    pub parking: ParkingIdx,
    pub model: Model,
    /// Original index of each shipment of `model`.
    pub shipments: Vec<ShipmentIdx>,
}

/// The global model and what each of its shipments stands for.
#[derive(Debug, Clone)]
pub struct GlobalProblem {
    pub model: Model,
    pub shipments: Vec<GlobalShipment>,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),
    #[error("optimization engine failed on {stage}")]
    Engine {
        stage: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

impl PlanError {
    fn engine<E>(stage: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PlanError::Engine {
            stage,
            source: Box::new(source),
        }
    }
}

/// Runs both phases and merges their solutions at `mode`.
pub fn plan<B, E>(builder: &B, engine: &E, options: &Options, mode: IntegrationMode) -> Result<MergedPlan, PlanError>
where
    B: SubProblemBuilder,
    E: OptimizationEngine,
{
    options.validate()?;

    let problems = builder.local_problems(options);
    info!(local_models = problems.len(), "solving local models");

    let locals = problems
        .par_iter()
        .map(|problem| -> Result<LocalSolutionAdapter, PlanError> {
            let solution = engine
                .optimize(&problem.model)
                .map_err(|err| PlanError::engine(format!("local model of parking {}", problem.parking), err))?;
            Ok(LocalSolutionAdapter::new(
                problem.parking,
                &problem.model,
                &solution,
                &problem.shipments,
            )?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let global_problem = builder.global_problem(&locals, options);
    info!(
        shipments = global_problem.shipments.len(),
        vehicles = global_problem.model.vehicles.len(),
        "solving global model"
    );
    let solution = engine
        .optimize(&global_problem.model)
        .map_err(|err| PlanError::engine("global model".to_string(), err))?;
    let global = GlobalSolutionAdapter::new(&global_problem.model, &solution, &global_problem.shipments)?;

    Ok(integrate(&global, &locals, mode, options)?)
}
