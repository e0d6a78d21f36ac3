//! Model-aware fitting entry points.
//!
//! Each function wires one ring model to a scorer or cost and hands it to a
//! search strategy:
//!
//! | model            | objective                    | grid | local | global |
//! |------------------|------------------------------|------|-------|--------|
//! | ellipse curve    | raw curve sum (maximized)    | yes  | yes   | yes    |
//! | annulus band     | mean band intensity          | yes  | yes   | yes    |
//! | surface models   | L1 residual (minimized)      |      | yes   | yes    |
//!
//! Local and global searches on the curve and band minimize the reciprocal
//! score. Results carry flat vectors; rebuild typed models with
//! [`ModelParams::from_slice`](crate::ModelParams::from_slice) or
//! [`RingModel::from_slice`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::model::{AnnulusBand, EllipseCurve, ModelKind, ModelParams, RingModel};
use crate::raster::Image;
use crate::score::CurveSampling;
use crate::search::{
    grid_search, powell_minimize, BandScorer, CurveScorer, EvolutionConfig, GridSearchConfig,
    GridSearchOutcome, ParameterBox, PowellConfig, ReciprocalScore, ResidualCost, SearchObserver,
    SearchResult, TwoPhaseSearch,
};

/// Ring models compared against the image through a rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceModelKind {
    Gaussian,
    Mie,
    HenyeyGreenstein,
    FlatAnnulus,
}

impl From<SurfaceModelKind> for ModelKind {
    fn from(kind: SurfaceModelKind) -> Self {
        match kind {
            SurfaceModelKind::Gaussian => ModelKind::Gaussian,
            SurfaceModelKind::Mie => ModelKind::Mie,
            SurfaceModelKind::HenyeyGreenstein => ModelKind::HenyeyGreenstein,
            SurfaceModelKind::FlatAnnulus => ModelKind::FlatAnnulus,
        }
    }
}

impl TryFrom<ModelKind> for SurfaceModelKind {
    type Error = ModelKind;

    /// Fails with the original kind for the curve and band models.
    fn try_from(kind: ModelKind) -> Result<Self, Self::Error> {
        match kind {
            ModelKind::Gaussian => Ok(Self::Gaussian),
            ModelKind::Mie => Ok(Self::Mie),
            ModelKind::HenyeyGreenstein => Ok(Self::HenyeyGreenstein),
            ModelKind::FlatAnnulus => Ok(Self::FlatAnnulus),
            other => Err(other),
        }
    }
}

/// All search tunables in one place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub sampling: CurveSampling,
    pub grid: GridSearchConfig,
    pub powell: PowellConfig,
    pub evolution: EvolutionConfig,
}

impl FitConfig {
    /// Load from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn two_phase(&self) -> TwoPhaseSearch {
        TwoPhaseSearch::new(self.evolution.clone(), self.powell.clone())
    }
}

fn ensure_image(image: &Image) -> Result<(), FitError> {
    if image.is_empty() {
        return Err(FitError::EmptyImage);
    }
    Ok(())
}

fn curve_scorer<'a>(image: &'a Image, config: &FitConfig) -> CurveScorer<'a> {
    CurveScorer {
        image,
        sampling: config.sampling.clone(),
    }
}

/// Grid search over `[r, inc, rot, x_m, y_m]` maximizing the curve sum.
pub fn grid_ellipse(
    image: &Image,
    bounds: &ParameterBox,
    config: &FitConfig,
    observer: &mut dyn SearchObserver,
) -> Result<GridSearchOutcome, FitError> {
    ensure_image(image)?;
    let out = grid_search(&curve_scorer(image, config), bounds, &config.grid, observer)?;
    tracing::info!(score = out.result.value, "ellipse grid search done");
    Ok(out)
}

/// Grid search over `[r, th, inc, rot, x_m, y_m]` maximizing the band mean.
pub fn grid_annulus(
    image: &Image,
    bounds: &ParameterBox,
    config: &FitConfig,
    observer: &mut dyn SearchObserver,
) -> Result<GridSearchOutcome, FitError> {
    ensure_image(image)?;
    let out = grid_search(&BandScorer { image }, bounds, &config.grid, observer)?;
    tracing::info!(score = out.result.value, "annulus grid search done");
    Ok(out)
}

/// Powell refinement of an ellipse guess.
pub fn refine_ellipse(
    image: &Image,
    initial: &EllipseCurve,
    config: &FitConfig,
    observer: &mut dyn SearchObserver,
) -> Result<SearchResult, FitError> {
    ensure_image(image)?;
    let cost = ReciprocalScore(curve_scorer(image, config));
    powell_minimize(&cost, &initial.validated()?.to_vec(), &config.powell, observer)
}

/// Powell refinement of an annulus guess.
pub fn refine_annulus(
    image: &Image,
    initial: &AnnulusBand,
    config: &FitConfig,
    observer: &mut dyn SearchObserver,
) -> Result<SearchResult, FitError> {
    ensure_image(image)?;
    let cost = ReciprocalScore(BandScorer { image });
    powell_minimize(&cost, &initial.validated()?.to_vec(), &config.powell, observer)
}

/// Powell refinement of a surface model guess, minimizing the residual.
pub fn refine_surface(
    image: &Image,
    kind: SurfaceModelKind,
    initial: &[f64],
    config: &FitConfig,
    observer: &mut dyn SearchObserver,
) -> Result<SearchResult, FitError> {
    ensure_image(image)?;
    let kind = ModelKind::from(kind);
    let start = RingModel::from_slice(kind, initial)?.to_vec();
    let cost = ResidualCost { kind, image };
    powell_minimize(&cost, &start, &config.powell, observer)
}

/// Differential evolution (plus optional polish) for the ellipse curve.
pub fn global_ellipse(
    image: &Image,
    bounds: &ParameterBox,
    config: &FitConfig,
    observer: &mut dyn SearchObserver,
) -> Result<SearchResult, FitError> {
    ensure_image(image)?;
    let cost = ReciprocalScore(curve_scorer(image, config));
    let result = config.two_phase().run(&cost, bounds, observer)?;
    tracing::info!(cost = result.value, converged = result.converged, "ellipse global search done");
    Ok(result)
}

/// Differential evolution (plus optional polish) for the annulus band.
pub fn global_annulus(
    image: &Image,
    bounds: &ParameterBox,
    config: &FitConfig,
    observer: &mut dyn SearchObserver,
) -> Result<SearchResult, FitError> {
    ensure_image(image)?;
    let cost = ReciprocalScore(BandScorer { image });
    let result = config.two_phase().run(&cost, bounds, observer)?;
    tracing::info!(cost = result.value, converged = result.converged, "annulus global search done");
    Ok(result)
}

/// Differential evolution (plus optional polish) for a surface model.
pub fn global_surface(
    image: &Image,
    kind: SurfaceModelKind,
    bounds: &ParameterBox,
    config: &FitConfig,
    observer: &mut dyn SearchObserver,
) -> Result<SearchResult, FitError> {
    ensure_image(image)?;
    let cost = ResidualCost {
        kind: kind.into(),
        image,
    };
    let result = config.two_phase().run(&cost, bounds, observer)?;
    tracing::info!(
        model = ?kind,
        cost = result.value,
        converged = result.converged,
        "surface global search done"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::score_ellipse_curve;
    use crate::search::NoopObserver;
    use crate::test_utils::{add_noise, ring_image};

    fn quick_config(seed: u64) -> FitConfig {
        FitConfig {
            evolution: EvolutionConfig {
                seed: Some(seed),
                max_generations: 60,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn surface_kind_conversions() {
        assert_eq!(ModelKind::from(SurfaceModelKind::Mie), ModelKind::Mie);
        assert_eq!(
            SurfaceModelKind::try_from(ModelKind::FlatAnnulus),
            Ok(SurfaceModelKind::FlatAnnulus)
        );
        assert_eq!(
            SurfaceModelKind::try_from(ModelKind::Ellipse),
            Err(ModelKind::Ellipse)
        );
    }

    #[test]
    fn config_json_fills_defaults() {
        let cfg: FitConfig =
            serde_json::from_str(r#"{"evolution": {"seed": 9, "popsize": 10}}"#).unwrap();
        assert_eq!(cfg.evolution.seed, Some(9));
        assert_eq!(cfg.evolution.popsize, 10);
        assert_eq!(cfg.evolution.recombination, 0.7);
        assert_eq!(cfg.sampling.samples, 400);
        assert_eq!(cfg.powell.ftol, 1e-5);
    }

    #[test]
    fn grid_annulus_finds_the_ring() {
        let truth = AnnulusBand::new(15.0, 4.0, 0.0, 0.0, 25.0, 25.0).unwrap();
        let img = ring_image(50, truth, 100.0, 0.0);
        let bounds = ParameterBox::new(vec![
            [10.0, 20.0],
            [4.0, 5.0],
            [0.0, 1.0],
            [0.0, 1.0],
            [23.0, 28.0],
            [23.0, 28.0],
        ])
        .unwrap();
        let out = grid_annulus(&img, &bounds, &FitConfig::default(), &mut NoopObserver).unwrap();
        assert_eq!(out.result.params, vec![15.0, 4.0, 0.0, 0.0, 25.0, 25.0]);
    }

    #[test]
    fn grid_then_refine_ellipse_improves_the_curve_sum() {
        let truth = AnnulusBand::new(14.0, 3.0, 30.0, 20.0, 24.0, 26.0).unwrap();
        let img = add_noise(&ring_image(50, truth, 100.0, 0.0), 5.0, 3);
        let bounds = ParameterBox::new(vec![
            [12.0, 17.0],
            [25.0, 36.0],
            [15.0, 26.0],
            [23.0, 26.0],
            [25.0, 28.0],
        ])
        .unwrap();
        let config = FitConfig::default();
        let grid = grid_ellipse(&img, &bounds, &config, &mut NoopObserver).unwrap();
        let guess = EllipseCurve::from_slice(&grid.result.params).unwrap();
        assert!((guess.x_m - 24.0).abs() <= 1.0);
        assert!((guess.y_m - 26.0).abs() <= 1.0);

        let refined = refine_ellipse(&img, &guess, &config, &mut NoopObserver).unwrap();
        let fitted = EllipseCurve::from_slice(&refined.params).unwrap();
        let before = score_ellipse_curve(&guess, &img, &config.sampling).unwrap().sum;
        let after = score_ellipse_curve(&fitted, &img, &config.sampling).unwrap().sum;
        assert!(after >= before);
    }

    #[test]
    fn refine_surface_recovers_radius_from_a_close_guess() {
        let truth = AnnulusBand::new(12.0, 4.0, 20.0, 10.0, 20.0, 20.0).unwrap();
        let img = ring_image(40, truth, 80.0, 1.0);
        let guess = [13.0, 4.5, 20.0, 10.0, 20.5, 19.5, 70.0, 1.0];
        let r = refine_surface(
            &img,
            SurfaceModelKind::Gaussian,
            &guess,
            &FitConfig::default(),
            &mut NoopObserver,
        )
        .unwrap();
        assert!((r.params[0] - 12.0).abs() < 0.5, "r = {}", r.params[0]);
        assert!((r.params[4] - 20.0).abs() < 0.5);
        assert!((r.params[5] - 20.0).abs() < 0.5);
    }

    #[test]
    fn refine_surface_rejects_invalid_start() {
        let img = Image::zeros(10, 10);
        let err = refine_surface(
            &img,
            SurfaceModelKind::HenyeyGreenstein,
            &[5.0, 2.0, 0.0, 0.0, 5.0, 5.0, 1.5, 1.0, 0.0],
            &FitConfig::default(),
            &mut NoopObserver,
        )
        .unwrap_err();
        assert!(matches!(err, FitError::InvalidParameter { name: "g", .. }));
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = Image::zeros(0, 0);
        let bounds = ParameterBox::new(vec![[0.0, 1.0]; 6]).unwrap();
        assert_eq!(
            global_annulus(&img, &bounds, &quick_config(1), &mut NoopObserver).unwrap_err(),
            FitError::EmptyImage
        );
    }

    #[test]
    fn global_annulus_locates_the_band() {
        let truth = AnnulusBand::new(14.0, 4.0, 0.0, 0.0, 25.0, 25.0).unwrap();
        let img = ring_image(50, truth, 100.0, 0.0);
        let bounds = ParameterBox::new(vec![
            [8.0, 20.0],
            [3.0, 6.0],
            [0.0, 10.0],
            [0.0, 10.0],
            [22.0, 28.0],
            [22.0, 28.0],
        ])
        .unwrap();
        let r = global_annulus(&img, &bounds, &quick_config(21), &mut NoopObserver).unwrap();
        let band = AnnulusBand::from_slice(&r.params).unwrap();
        assert!((band.r - 14.0).abs() < 1.5, "r = {}", band.r);
        assert!((band.x_m - 25.0).abs() < 1.5);
        assert!((band.y_m - 25.0).abs() < 1.5);
    }
}
