use beanflow::{probe, FfmpegEncoder, GeneratorConfig};

pub async fn cmd_check(config: &GeneratorConfig) {
    println!("🔧 Checking external tools:\n");

    let encoder = config.encoder.ffmpeg_path.as_str();
    if FfmpegEncoder::new(&config.encoder).check_available().await {
        println!("   ✅ ffmpeg: {encoder}");
    } else {
        println!("   ❌ ffmpeg: not found ({encoder})");
    }

    let prober = config.encoder.ffprobe_path.as_str();
    if probe::tool_available(prober).await {
        println!("   ✅ ffprobe: {prober}");
    } else {
        println!("   ❌ ffprobe: not found ({prober})");
    }
}
