//! Filter-graph compilation.
//!
//! Turns a [`RenderPlan`] into `-filter_complex` text. Slot `k` of the plan
//! reads transcoder input `k` and produces the pads `[vk]` (and `[ak]` when
//! audio is kept). A single concat stage of arity N joins every slot.
//!
//! Compilation is a pure function of its inputs: same plan, same text.

use std::collections::HashMap;

use remix_common::{RemixError, RemixResult};
use remix_model::{
    AudioMode, Clip, CompiledGraph, Geometry, GeometryTarget, MixingConfiguration, PlanSlot,
    RenderPlan,
};

use crate::output::output_args;

/// Label of the final video pad.
pub const VIDEO_OUT: &str = "outv";
/// Label of the final audio pad.
pub const AUDIO_OUT: &str = "outa";

const AUDIO_SAMPLE_RATE: u32 = 48_000;
const ATEMPO_MIN: f64 = 0.5;
const ATEMPO_MAX: f64 = 2.0;
/// Slack allowed between a trim end and the clip's native duration.
const TRIM_EPSILON: f64 = 1e-6;

/// Compile one plan against the batch's clip metadata.
pub fn compile(
    plan: &RenderPlan,
    clips: &[Clip],
    config: &MixingConfiguration,
) -> RemixResult<CompiledGraph> {
    if plan.slots.is_empty() {
        return Err(RemixError::compilation(format!(
            "{} has no slots",
            plan.variant_id
        )));
    }

    let by_id: HashMap<&str, &Clip> = clips.iter().map(|c| (c.id.as_str(), c)).collect();
    let resolved: Vec<&Clip> = plan
        .slots
        .iter()
        .map(|slot| {
            by_id.get(slot.clip_id.as_str()).copied().ok_or_else(|| {
                RemixError::compilation(format!(
                    "{} references unknown clip '{}'",
                    plan.variant_id, slot.clip_id
                ))
            })
        })
        .collect::<RemixResult<_>>()?;

    for (k, (slot, clip)) in plan.slots.iter().zip(&resolved).enumerate() {
        check_slot(k, slot, clip)?;
    }

    let geometry = output_geometry(plan.geometry_target, &resolved).ok_or_else(|| {
        RemixError::compilation(format!(
            "{}: aspect ratio 'original' needs width and height on at least one clip",
            plan.variant_id
        ))
    })?;
    let keep_audio = plan.audio_mode == AudioMode::Keep;
    let n = plan.slots.len();

    let mut stages: Vec<String> = Vec::with_capacity(n * 2 + 1);
    let mut concat_inputs = String::new();

    for (k, (slot, clip)) in plan.slots.iter().zip(&resolved).enumerate() {
        stages.push(video_stage(k, slot, geometry, config.frame_rate));
        concat_inputs.push_str(&format!("[v{k}]"));

        if keep_audio {
            stages.push(if clip.has_audio {
                audio_stage(k, slot)
            } else {
                silence_stage(k, slot)
            });
            concat_inputs.push_str(&format!("[a{k}]"));
        }
    }

    let audio_label = keep_audio.then(|| AUDIO_OUT.to_string());
    stages.push(match &audio_label {
        Some(a) => format!("{concat_inputs}concat=n={n}:v=1:a=1[{VIDEO_OUT}][{a}]"),
        None => format!("{concat_inputs}concat=n={n}:v=1:a=0[{VIDEO_OUT}]"),
    });

    let graph_text = stages.join(";");
    verify_structure(&plan.variant_id, &graph_text, n, keep_audio)?;

    tracing::debug!(
        variant_id = %plan.variant_id,
        streams = n,
        audio = keep_audio,
        geometry = ?geometry,
        graph_len = graph_text.len(),
        "Compiled filter graph"
    );

    Ok(CompiledGraph {
        variant_id: plan.variant_id.clone(),
        stream_count: n,
        audio_present: keep_audio,
        inputs: resolved.iter().map(|c| c.source_ref().to_string()).collect(),
        output_geometry: Some(geometry),
        output_args: output_args(config, VIDEO_OUT, audio_label.as_deref()),
        video_label: VIDEO_OUT.to_string(),
        audio_label,
        graph_text,
    })
}

fn check_slot(k: usize, slot: &PlanSlot, clip: &Clip) -> RemixResult<()> {
    if !slot.speed.is_finite() || slot.speed <= 0.0 {
        return Err(RemixError::compilation(format!(
            "slot {k} ({}) has invalid speed {}",
            slot.clip_id, slot.speed
        )));
    }
    if !slot.trim.is_valid() || slot.trim.end > clip.duration_seconds + TRIM_EPSILON {
        return Err(RemixError::compilation(format!(
            "slot {k} ({}) trim [{:.3}, {:.3}] is outside [0, {:.3}]",
            slot.clip_id, slot.trim.start, slot.trim.end, clip.duration_seconds
        )));
    }
    Ok(())
}

/// Frame size every stream is normalised to.
///
/// For source geometry this is the first slot with a known size. `None`
/// means no slot has one, and there is no common frame to pad to.
pub fn output_geometry(target: GeometryTarget, clips: &[&Clip]) -> Option<Geometry> {
    match target {
        GeometryTarget::Fixed(g) => Some(g),
        GeometryTarget::Source => clips
            .iter()
            .find_map(|c| c.geometry())
            .map(|(w, h)| Geometry::new(w, h).even()),
    }
}

fn video_stage(k: usize, slot: &PlanSlot, geometry: Geometry, fps: u32) -> String {
    let setpts = if (slot.speed - 1.0).abs() < 1e-9 {
        "setpts=PTS-STARTPTS".to_string()
    } else {
        format!("setpts=(PTS-STARTPTS)/{:.6}", slot.speed)
    };

    let frame = format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
        w = geometry.width,
        h = geometry.height
    );

    format!(
        "[{k}:v]trim=start={:.6}:end={:.6},{setpts},{frame},fps={fps},format=yuv420p,setsar=1[v{k}]",
        slot.trim.start, slot.trim.end
    )
}

fn audio_stage(k: usize, slot: &PlanSlot) -> String {
    let mut filters = vec![
        format!(
            "atrim=start={:.6}:end={:.6}",
            slot.trim.start, slot.trim.end
        ),
        "asetpts=PTS-STARTPTS".to_string(),
    ];
    filters.extend(
        atempo_chain(slot.speed)
            .into_iter()
            .map(|f| format!("atempo={f:.6}")),
    );
    filters.push(audio_format());
    format!("[{k}:a]{}[a{k}]", filters.join(","))
}

fn silence_stage(k: usize, slot: &PlanSlot) -> String {
    format!(
        "anullsrc=channel_layout=stereo:sample_rate={AUDIO_SAMPLE_RATE},atrim=duration={:.6},asetpts=PTS-STARTPTS,{}[a{k}]",
        slot.timeline_secs(),
        audio_format()
    )
}

fn audio_format() -> String {
    format!("aformat=sample_rates={AUDIO_SAMPLE_RATE}:channel_layouts=stereo")
}

/// Split a speed factor into atempo steps that each stay in `[0.5, 2.0]`.
/// A factor of 1.0 needs no step.
pub fn atempo_chain(speed: f64) -> Vec<f64> {
    if (speed - 1.0).abs() < 1e-9 {
        return vec![];
    }

    let mut steps = vec![];
    let mut remaining = speed;
    while remaining > ATEMPO_MAX {
        steps.push(ATEMPO_MAX);
        remaining /= ATEMPO_MAX;
    }
    while remaining < ATEMPO_MIN {
        steps.push(ATEMPO_MIN);
        remaining /= ATEMPO_MIN;
    }
    if (remaining - 1.0).abs() >= 1e-9 {
        steps.push(remaining);
    }
    steps
}

/// Check that the text has N per-slot stages and one concat of arity N that
/// consumes every stage's pads.
fn verify_structure(variant_id: &str, graph: &str, n: usize, audio: bool) -> RemixResult<()> {
    let video_stages = (0..n)
        .filter(|k| graph.contains(&format!("[{k}:v]trim=")))
        .count();
    let concat_stages = graph.matches("concat=").count();
    let arity = format!("concat=n={n}:");

    if video_stages != n || concat_stages != 1 || !graph.contains(&arity) {
        return Err(RemixError::compilation(format!(
            "{variant_id}: graph has {video_stages} of {n} video stages and {concat_stages} concat stages"
        )));
    }

    if audio {
        let audio_stages = (0..n).filter(|k| graph.contains(&format!("[a{k}];"))).count();
        if audio_stages != n {
            return Err(RemixError::compilation(format!(
                "{variant_id}: graph has {audio_stages} of {n} audio stages"
            )));
        }
    }

    let concat = graph.rsplit(';').next().unwrap_or_default();
    if !concat.contains("concat=") {
        return Err(RemixError::compilation(format!(
            "{variant_id}: concat is not the final stage"
        )));
    }
    let expected: String = (0..n)
        .map(|k| {
            if audio {
                format!("[v{k}][a{k}]")
            } else {
                format!("[v{k}]")
            }
        })
        .collect();
    if !concat.starts_with(&format!("{expected}concat=")) {
        return Err(RemixError::compilation(format!(
            "{variant_id}: concat does not consume every stage in slot order"
        )));
    }

    Ok(())
}
