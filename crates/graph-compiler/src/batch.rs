//! Batch orchestration: plan, compile in parallel, report.

use rayon::prelude::*;

use remix_common::{PlannerDefaults, RemixResult};
use remix_model::{
    BatchReport, BatchRequest, Clip, CompiledGraph, FailureStage, MixingConfiguration,
    RenderPlan, VariantFailure, VariantOutput,
};
use remix_planner::{BatchState, VariantPlanner};

use crate::compiler::compile;

/// Everything a batch call produces.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub report: BatchReport,

    /// Plans that compiled, aligned with `report.variants`.
    pub plans: Vec<RenderPlan>,

    /// State to pass to the next batch call.
    pub state: BatchState,
}

/// Plan and compile every variant of a request.
///
/// Batch-level errors (configuration, insufficient input) are returned as
/// `Err`. Per-variant distribution and compilation errors end up in
/// `report.failures` next to the successful variants.
pub fn generate_batch(
    request: &BatchRequest,
    settings: &PlannerDefaults,
    state: BatchState,
) -> RemixResult<BatchOutcome> {
    let planner = VariantPlanner::new(settings.clone());
    let (planned, state) = planner.plan_request(request, state)?;

    let compiled = compile_plans(planned.plans, &request.clips, &request.config);

    let mut failures = planned.failures;
    failures.extend(compiled.failures);
    failures.sort_by_key(|f| f.index);
    let variants = compiled.variants;
    let plans = compiled.plans;

    tracing::info!(
        requested = request.config.output_count,
        produced = variants.len(),
        failed = failures.len(),
        "Batch compiled"
    );

    Ok(BatchOutcome {
        report: BatchReport::new(
            request.config.output_count,
            variants,
            failures,
            planned.warnings,
        ),
        plans,
        state,
    })
}

/// Outputs of compiling a set of plans.
#[derive(Debug, Clone, Default)]
pub struct CompiledPlans {
    pub variants: Vec<VariantOutput>,

    /// Plans that compiled, aligned with `variants`.
    pub plans: Vec<RenderPlan>,

    /// Plans the compiler rejected.
    pub failures: Vec<VariantFailure>,
}

/// Compile plans in parallel. A rejected plan becomes a failure and the
/// others are unaffected. Everything comes back in index order.
pub fn compile_plans(
    plans: Vec<RenderPlan>,
    clips: &[Clip],
    config: &MixingConfiguration,
) -> CompiledPlans {
    let mut compiled: Vec<(RenderPlan, RemixResult<CompiledGraph>)> = plans
        .into_par_iter()
        .map(|plan| {
            let result = compile(&plan, clips, config);
            (plan, result)
        })
        .collect();
    compiled.sort_by_key(|(plan, _)| plan.index);

    let mut out = CompiledPlans::default();
    for (plan, result) in compiled {
        match result {
            Ok(graph) => {
                out.variants.push(VariantOutput::from_parts(&plan, graph));
                out.plans.push(plan);
            }
            Err(e) => {
                tracing::warn!(index = plan.index, variant_id = %plan.variant_id, error = %e, "Variant failed compilation");
                out.failures.push(VariantFailure {
                    index: plan.index,
                    variant_id: plan.variant_id,
                    stage: FailureStage::Compilation,
                    reason: e.to_string(),
                });
            }
        }
    }
    out
}
