use argh::FromArgs;
use std::path::PathBuf;

use varflow::flow::{
    engine::{ClgEngine, ComputeOptions, FlowEngine, HornSchunckEngine},
    metrics, ClgConfig, HornSchunckConfig, MultiResolutionConfig, MultiResolutionFlow,
};
use varflow::image::{ImageRegion, ImageSize, ScalarImage};

#[derive(FromArgs)]
/// Estimate the flow between a synthetic texture and a translated copy
struct Args {
    /// the flow method: clg or horn-schunck
    #[argh(option, default = "String::from(\"clg\")")]
    method: String,

    /// the image width
    #[argh(option, default = "128")]
    width: usize,

    /// the image height
    #[argh(option, default = "96")]
    height: usize,

    /// the horizontal translation in pixels
    #[argh(option, default = "1.0")]
    dx: f32,

    /// the vertical translation in pixels
    #[argh(option, default = "0.0")]
    dy: f32,

    /// the number of pyramid levels, 1 disables the pyramid
    #[argh(option, default = "1")]
    levels: usize,

    /// optional JSON file with the engine configuration
    #[argh(option)]
    config: Option<PathBuf>,
}

fn texture(x: f32, y: f32) -> f32 {
    50.0 * (0.15 * x).sin() + 50.0 * (0.12 * y).cos() + 20.0 * (0.1 * (x + y)).sin()
}

fn run<E: FlowEngine>(
    engine: E,
    levels: usize,
    fixed: &ScalarImage,
    moving: &ScalarImage,
) -> Result<varflow::image::FlowField, Box<dyn std::error::Error>> {
    let observer = |fraction: f32| log::debug!("progress: {:.0}%", fraction * 100.0);
    let options = ComputeOptions::default().with_progress(&observer);

    if levels > 1 {
        let config = MultiResolutionConfig {
            number_of_levels: levels,
            ..Default::default()
        };
        let coordinator = MultiResolutionFlow::new(engine, config)?;
        Ok(coordinator.compute(fixed, moving, &options)?)
    } else {
        Ok(engine.compute(fixed, moving, &options)?)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let size = ImageSize {
        width: args.width,
        height: args.height,
    };
    let fixed = ScalarImage::from_fn(size, |x, y| [texture(x as f32, y as f32)]);
    let moving = ScalarImage::from_fn(size, |x, y| {
        [texture(x as f32 - args.dx, y as f32 - args.dy)]
    });

    let config = match &args.config {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };

    let flow = match args.method.to_lowercase().as_str() {
        "clg" => {
            let config: ClgConfig = match &config {
                Some(json) => serde_json::from_str(json)?,
                None => ClgConfig::default(),
            };
            run(ClgEngine::new(config)?, args.levels, &fixed, &moving)?
        }
        "horn-schunck" | "hs" => {
            let config: HornSchunckConfig = match &config {
                Some(json) => serde_json::from_str(json)?,
                None => HornSchunckConfig::default(),
            };
            run(HornSchunckEngine::new(config)?, args.levels, &fixed, &moving)?
        }
        other => return Err(format!("unknown method: {other}").into()),
    };

    // ignore a border of one eighth of the image where the flow is unreliable
    let margin = [size.width / 8, size.height / 8];
    let interior = ImageRegion::new(
        [margin[0] as isize, margin[1] as isize],
        ImageSize {
            width: size.width - 2 * margin[0],
            height: size.height - 2 * margin[1],
        },
    );
    let [u, v] = metrics::mean_vector(&flow, Some(interior))?;
    let magnitude = metrics::magnitude(&flow)?;
    let max_magnitude = magnitude.as_slice().iter().fold(0.0f32, |m, &n| m.max(n));

    println!("expected translation: ({:.3}, {:.3})", args.dx, args.dy);
    println!("mean interior flow:   ({u:.3}, {v:.3})");
    println!("max flow magnitude:   {max_magnitude:.3}");

    Ok(())
}
