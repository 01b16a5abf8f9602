//! Output-stage arguments: encoder lookup, frame rate, metadata.

use remix_model::{CompiledGraph, MixingConfiguration, QualityTier};

/// Encoder settings for one quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderProfile {
    pub video_codec: &'static str,
    pub preset: &'static str,
    pub video_bitrate_kbps: u32,
    pub audio_codec: &'static str,
    pub audio_bitrate_kbps: u32,
}

pub fn encoder_profile(tier: QualityTier) -> EncoderProfile {
    let (preset, video_bitrate_kbps, audio_bitrate_kbps) = match tier {
        QualityTier::Low => ("veryfast", 1500, 96),
        QualityTier::Medium => ("medium", 4000, 128),
        QualityTier::High => ("slow", 8000, 192),
    };
    EncoderProfile {
        video_codec: "libx264",
        preset,
        video_bitrate_kbps,
        audio_codec: "aac",
        audio_bitrate_kbps,
    }
}

/// Mapping, codec, frame-rate and metadata arguments for a compiled graph.
///
/// `audio_label` is `None` when the graph carries no audio; the output is
/// then written without an audio stream.
pub fn output_args(
    config: &MixingConfiguration,
    video_label: &str,
    audio_label: Option<&str>,
) -> Vec<String> {
    let profile = encoder_profile(config.quality_tier);

    let mut args = vec!["-map".to_string(), format!("[{video_label}]")];
    if let Some(label) = audio_label {
        args.push("-map".to_string());
        args.push(format!("[{label}]"));
    }

    args.extend([
        "-c:v".to_string(),
        profile.video_codec.to_string(),
        "-preset".to_string(),
        profile.preset.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-b:v".to_string(),
        format!("{}k", profile.video_bitrate_kbps),
        "-r".to_string(),
        config.frame_rate.to_string(),
    ]);

    if audio_label.is_some() {
        args.extend([
            "-c:a".to_string(),
            profile.audio_codec.to_string(),
            "-b:a".to_string(),
            format!("{}k", profile.audio_bitrate_kbps),
        ]);
    } else {
        args.push("-an".to_string());
    }

    for (key, value) in &config.metadata {
        args.push("-metadata".to_string());
        args.push(format!("{key}={value}"));
    }

    args.push("-movflags".to_string());
    args.push("+faststart".to_string());
    args
}

/// Full transcoder argument list for one compiled graph.
///
/// The planner never runs the transcoder; this is what a caller would pass
/// to it.
pub fn transcoder_args(graph: &CompiledGraph, output_path: &str) -> Vec<String> {
    let mut args = vec!["-y".to_string()];
    for input in &graph.inputs {
        args.push("-i".to_string());
        args.push(input.clone());
    }
    args.push("-filter_complex".to_string());
    args.push(graph.graph_text.clone());
    args.extend(graph.output_args.iter().cloned());
    args.push(output_path.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_lookup() {
        assert_eq!(encoder_profile(QualityTier::Low).video_bitrate_kbps, 1500);
        assert_eq!(encoder_profile(QualityTier::Medium).preset, "medium");
        assert_eq!(encoder_profile(QualityTier::High).audio_bitrate_kbps, 192);
    }

    #[test]
    fn test_silent_output_drops_audio_stream() {
        let args = output_args(&MixingConfiguration::default(), "outv", None);
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
        assert_eq!(&args[..2], &["-map".to_string(), "[outv]".to_string()]);
    }

    #[test]
    fn test_metadata_and_frame_rate_are_emitted() {
        let mut config = MixingConfiguration {
            frame_rate: 25,
            quality_tier: QualityTier::High,
            ..Default::default()
        };
        config
            .metadata
            .insert("campaign".to_string(), "spring".to_string());

        let args = output_args(&config, "outv", Some("outa"));
        let joined = args.join(" ");
        assert!(joined.contains("-map [outa]"));
        assert!(joined.contains("-r 25"));
        assert!(joined.contains("-b:v 8000k"));
        assert!(joined.contains("-b:a 192k"));
        assert!(joined.contains("-metadata campaign=spring"));
        assert!(joined.ends_with("-movflags +faststart"));
    }

    #[test]
    fn test_transcoder_args_order() {
        let graph = CompiledGraph {
            variant_id: "variant-0001".to_string(),
            graph_text: "G".to_string(),
            stream_count: 2,
            audio_present: false,
            inputs: vec!["a.mp4".to_string(), "b.mp4".to_string()],
            output_geometry: None,
            output_args: vec!["-an".to_string()],
            video_label: "outv".to_string(),
            audio_label: None,
        };
        assert_eq!(
            transcoder_args(&graph, "out.mp4"),
            vec!["-y", "-i", "a.mp4", "-i", "b.mp4", "-filter_complex", "G", "-an", "out.mp4"]
        );
    }
}
