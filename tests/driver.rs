use dyeflow::{
    methods::GaussSeidel, Driver, Float, FlowSchedule, FrameRecorder, Logger, ObsCtx, Observer,
    Simulation, SolverError,
};

#[derive(Default)]
struct PeakTracker {
    peaks: Vec<Float>,
    finished_at: Option<usize>,
}

impl Observer for PeakTracker {
    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        self.peaks.push(ctx.simulation().field().max());
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        self.finished_at = Some(ctx.frame());
        Ok(())
    }
}

struct FailAfter(usize);

impl Observer for FailAfter {
    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        if ctx.frame() >= self.0 {
            Err(SolverError::InvalidParameter {
                name: "frame",
                value: ctx.frame() as Float,
            })
        } else {
            Ok(())
        }
    }
}

#[test]
fn offline_run_matches_manual_stepping() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut recorder = FrameRecorder::new();
    let mut tracker = PeakTracker::default();
    {
        let sim = Simulation::new((7, 7), (70.0, 70.0)).unwrap();
        let mut driver = Driver::new(sim)
            .with_observer(Logger)
            .with_observer(&mut recorder)
            .with_observer(&mut tracker);
        driver.run(15).unwrap();
    }

    let mut manual = Simulation::new((7, 7), (70.0, 70.0)).unwrap();
    let period = 1000.0 / 30.0;
    for k in 0..15 {
        manual.set_velocity_from_time((k + 1) as Float * period);
        manual.step(period / 1000.0).unwrap();
    }

    let last = recorder.frames().last().unwrap();
    for i in 0..7 {
        for j in 0..7 {
            assert!((last[(i, j)] - manual.get_cell(i, j).unwrap()).abs() < 1e-12);
        }
    }

    assert_eq!(recorder.frames().len(), 16);
    assert!((recorder.times_millis()[15] - 15.0 * period).abs() < 1e-9);
    assert_eq!(tracker.peaks.len(), 15);
    assert!(tracker.peaks.iter().all(|&p| p == 100.0));
    assert_eq!(tracker.finished_at, Some(15));
}

#[test]
fn observer_errors_stop_the_run() {
    let sim = Simulation::new((3, 3), (30.0, 30.0)).unwrap();
    let mut driver = Driver::new(sim).with_observer(FailAfter(4));

    assert!(matches!(
        driver.run(10),
        Err(SolverError::InvalidParameter { name: "frame", .. })
    ));
}

#[test]
fn custom_schedule_and_solver_drive_the_run() {
    let schedule = FlowSchedule {
        amplitude: (0.05, 0.0),
        period: (1.0, 1.0),
        phase: (std::f64::consts::FRAC_PI_2, 0.0),
    };
    let sim = Simulation::new((5, 9), (90.0, 50.0))
        .unwrap()
        .with_schedule(schedule)
        .unwrap()
        .with_solver::<GaussSeidel>();

    let mut driver = Driver::new(sim).with_frame_rate(10.0).unwrap();
    let history = driver.velocity_history(10);
    // cos-shaped x flow sampled every 100ms over one period
    assert!((history[9].1 - 0.05).abs() < 1e-12);
    assert!((history[4].1 - 0.05).abs() < 1e-12);

    driver.run(5).unwrap();
    let sim = driver.into_simulation();
    assert_eq!(sim.solver_name(), "Gauss-Seidel (five-point)");
    assert_eq!(sim.get_cell(2, 4).unwrap(), 100.0);
}
