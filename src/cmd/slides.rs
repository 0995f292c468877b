use std::path::PathBuf;

use anyhow::{Context, Result};

use beanflow::{GeneratorConfig, TextSlideProducer};

use super::script_for;

pub fn cmd_slides(config: &GeneratorConfig, dir: Option<PathBuf>, text: Option<&str>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.output_dir.join("slides"));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let script = script_for(text);
    let producer = TextSlideProducer::new(&config.slides)?;
    if !producer.renderer().has_font() {
        eprintln!("⚠️  No font found; slides contain background only");
    }

    let segments = producer.produce(&script, &dir)?;

    eprintln!("🖼  Rendered {} slides", segments.len());
    for segment in &segments {
        println!("{}", segment.input_path().display());
    }

    Ok(())
}
