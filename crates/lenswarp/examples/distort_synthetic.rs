use image::{GrayImage, Luma};
use lenswarp::{simulate, SimulateConfig};
use std::error::Error;

fn checkerboard(w: u32, h: u32, cell: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Luma([230])
        } else {
            Luma([25])
        }
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();

    let src = checkerboard(512, 512, 32);
    let sim = simulate(&src, &SimulateConfig::default());

    println!(
        "Inverse map: {:.3} bisection evaluations per pixel on average",
        sim.mean_invert_evals
    );
    println!("{} pixels received no splat contribution", sim.zero_weight_pixels);

    if let Some(out_path) = args.get(1) {
        sim.distorted.save(out_path)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
