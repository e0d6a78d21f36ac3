//! Render a Gaussian ring, then recover it with grid search and a global fit.

use discfit::fit::{global_surface, grid_annulus};
use discfit::search::EvolutionConfig;
use discfit::{
    AnnulusBand, FitConfig, GaussianRing, ModelParams, NoopObserver, ParameterBox, RingModel,
    SurfaceModelKind, TracingObserver,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let truth = GaussianRing::new(
        AnnulusBand::new(18.0, 4.0, 45.0, 30.0, 32.0, 30.0)?,
        100.0,
        1.0,
    )?;
    let image = RingModel::Gaussian(truth).render(64, 64)?;
    println!("truth:  {:?}", truth.to_vec());

    let config = FitConfig {
        evolution: EvolutionConfig {
            seed: Some(1),
            max_generations: 200,
            ..Default::default()
        },
        ..Default::default()
    };

    let bounds = ParameterBox::new(vec![
        [14.0, 23.0],
        [3.0, 6.0],
        [40.0, 51.0],
        [25.0, 36.0],
        [30.0, 34.0],
        [28.0, 32.0],
    ])?;
    let grid = grid_annulus(&image, &bounds, &config, &mut TracingObserver::new("grid"))?;
    println!("grid:   {:?} (mean {:.2})", grid.result.params, grid.result.value);

    let bounds = ParameterBox::new(vec![
        [10.0, 25.0],
        [2.0, 8.0],
        [30.0, 60.0],
        [10.0, 50.0],
        [28.0, 36.0],
        [26.0, 34.0],
        [50.0, 150.0],
        [0.0, 5.0],
    ])?;
    let fit = global_surface(
        &image,
        SurfaceModelKind::Gaussian,
        &bounds,
        &config,
        &mut NoopObserver,
    )?;
    let model = GaussianRing::from_slice(&fit.params)?;
    println!(
        "global: {:?} (residual {:.3}, converged {})",
        model.to_vec(),
        fit.value,
        fit.converged
    );
    Ok(())
}
