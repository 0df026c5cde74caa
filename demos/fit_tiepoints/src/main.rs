use argh::FromArgs;
use std::path::PathBuf;

use georef::linalg::Point2D;
use georef::optim::LevenbergMarquardt;
use georef::proj::{meters_to_lat_lon, CoordinateProjector};
use georef::transform::{geo, TiePoint, TransformKind, TransformSelector};

#[derive(FromArgs)]
/// Fit a transform to tie points and report the residuals
struct Args {
    /// path to a JSON array of [to_x, to_y, from_x, from_y] tie points
    #[argh(option)]
    points: PathBuf,

    /// transform kind to fit instead of the one picked from the point count
    #[argh(option)]
    kind: Option<TransformKind>,

    /// maximum number of solver iterations
    #[argh(option, default = "100")]
    max_iterations: usize,

    /// width of the overlay image in pixels
    #[argh(option)]
    image_width: Option<f64>,

    /// height of the overlay image in pixels
    #[argh(option)]
    image_height: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let points: Vec<TiePoint> = serde_json::from_str(&std::fs::read_to_string(&args.points)?)?;
    println!("Loaded #{} tie points", points.len());

    let solver = LevenbergMarquardt::default().with_max_iterations(args.max_iterations);
    let selector = TransformSelector::new().with_solver(solver);
    let outcome = match args.kind {
        Some(kind) => selector.fit_kind(kind, &points)?,
        None => selector.fit(&points)?,
    };

    if !outcome.converged {
        log::warn!("solver did not converge, the transform may be inaccurate");
    }
    println!(
        "Fitted {} transform: {} iterations, rms residual {:.3} m",
        outcome.transform.kind(),
        outcome.iterations,
        outcome.rmse
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.transform.to_record())?
    );

    for (i, (p, r)) in points
        .iter()
        .zip(outcome.transform.residuals(&points))
        .enumerate()
    {
        println!(
            "#{i}: pixel ({:.1}, {:.1}) residual {:.3} m",
            p.source().x,
            p.source().y,
            r
        );
    }

    if let (Some(width), Some(height)) = (args.image_width, args.image_height) {
        let mut projector = CoordinateProjector::new();
        let config = projector.initialize_from_image_size(width, height)?;
        println!("Overlay max zoom: {}", config.max_zoom());

        for p in &points {
            let target = meters_to_lat_lon(p.target());
            let mapped = geo::forward_pixel_to_lat_lon(&outcome.transform, p.source());
            println!(
                "target ({:.6}, {:.6}) -> mapped ({:.6}, {:.6})",
                target.lat, target.lon, mapped.lat, mapped.lon
            );
        }

        let corners = [(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)];
        for (x, y) in corners {
            let ll = geo::forward_pixel_to_lat_lon(&outcome.transform, Point2D::new(x, y));
            println!("corner ({x}, {y}): lat {:.6}, lon {:.6}", ll.lat, ll.lon);
        }
    }

    Ok(())
}
