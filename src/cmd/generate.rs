use anyhow::{bail, Result};

use beanflow::{prompt_api_key, GeneratorConfig, Pipeline, VisualMode};

use super::script_for;

pub async fn cmd_generate(
    config: GeneratorConfig,
    no_prompt: bool,
    text: Option<&str>,
) -> Result<()> {
    let script = script_for(text);
    if script.is_empty() {
        bail!("script text is empty");
    }

    // Credential is resolved before the pipeline exists; empty means text slides.
    let api_key = if no_prompt {
        None
    } else {
        prompt_api_key(std::io::stdin().lock(), std::io::stdout())?
    };

    let pipeline = Pipeline::new(config, api_key.as_deref())?;

    eprintln!("🎬 Generating pitch video");
    eprintln!("   Segments: {}", script.segments().len());
    eprintln!("   Visuals: {}", pipeline.mode());
    eprintln!("   Output: {}", pipeline.output_path().display());

    let result = pipeline.run(&script).await?;

    eprintln!(
        "\n✅ Video generated in {:.1}s",
        result.processing_time_secs
    );
    eprintln!("   Output: {}", result.output.path.display());
    eprintln!(
        "   Duration: {:.1}s (narration {:.1}s)",
        result.output.duration.as_secs_f64(),
        result.audio_duration_secs
    );
    eprintln!(
        "   Resolution: {}x{} {}/{}",
        result.output.width, result.output.height, result.output.video_codec, result.output.audio_codec
    );
    eprintln!("   Segments: {} ({})", result.segment_count, result.mode);

    if result.fell_back && result.mode == VisualMode::TextSlides {
        eprintln!("   Note: stock footage was unavailable; used text slides");
    }

    println!("{}", result.output.path.display());

    Ok(())
}
