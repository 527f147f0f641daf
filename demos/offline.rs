use tracing::info;

use dyeflow::{Driver, FrameRecorder, Logger, Simulation, SolverError, VelocityRecorder};

// height * width: rows index the height axis
const MESH_SHAPE: (usize, usize) = (21, 21);
// width * height, millimetres
const MESH_DIM: (f64, f64) = (100.0, 100.0);

const SECONDS: usize = 10;

fn main() -> Result<(), SolverError> {
    tracing_subscriber::fmt::init();

    let sim = Simulation::new(MESH_SHAPE, MESH_DIM)?;
    info!("{sim}");

    let mut frames = FrameRecorder::new();
    let mut velocities = VelocityRecorder::new();
    {
        let mut driver = Driver::new(sim)
            .with_sampling(Driver::DEFAULT_FRAME_RATE as usize)?
            .with_observer(Logger)
            .with_observer(&mut frames)
            .with_observer(&mut velocities);

        driver.run(SECONDS * Driver::DEFAULT_FRAME_RATE as usize)?;
    }

    for ((field, t), (angle, magnitude)) in frames
        .frames()
        .iter()
        .zip(frames.times_millis())
        .skip(1)
        .zip(velocities.samples())
    {
        let (rows, cols) = MESH_SHAPE;
        let row: Vec<String> = (0..cols)
            .map(|j| format!("{:5.1}", field[(rows / 2, j)]))
            .collect();
        info!(
            "t={:5.1}s |v|={magnitude:.3} θ={angle:+.2} centre row: {}",
            t / 1000.0,
            row.join(" ")
        );
    }

    Ok(())
}
