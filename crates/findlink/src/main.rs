//! Command line entry point: load a GeoJSON link network and print the links
//! nearest to a target coordinate as `<distance_m>, <lng>, <lat>` lines.

mod error;
mod geojson;
mod logging;
mod settings;

use error::CliError;
use findlink_lib::{NearestEdgeQuery, QueryResult, SpatialIndex, SpherePoint};
use settings::Settings;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    logging::setup_logging();
    tracing::info!("findlink {}", env!("CARGO_PKG_VERSION"));

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<(), CliError> {
    // Validate the target before spending time on the network
    let target = SpherePoint::from_lat_lon_degrees(settings.target_lat, settings.target_lng)?;

    let polylines = geojson::load_links(&settings.links)?;
    let index = SpatialIndex::build(polylines)?;
    let stats = index.stats();
    tracing::info!(
        "Indexed {} edges from {} links ({} links skipped)",
        stats.edges,
        stats.polylines,
        stats.skipped_polylines
    );

    let query = NearestEdgeQuery::new(&index, settings.query_options());
    let results = if settings.max_results == 1 {
        vec![query.find_closest_edge(&target)?]
    } else {
        query.find_edges(&target)
    };

    for result in &results {
        log_result(&index, result);
        println!("{}", format_result(result));
    }
    if results.is_empty() {
        tracing::warn!("No link matched the query");
    }

    Ok(())
}

fn log_result(index: &SpatialIndex, result: &QueryResult) {
    let feature_id = index
        .polyline(result.edge.polyline)
        .and_then(|p| p.feature_id())
        .unwrap_or("<none>");
    tracing::info!(
        "Link {} (feature id {}), edge {}: {:.3} m away",
        result.edge.polyline,
        feature_id,
        result.edge.edge,
        result.distance_meters()
    );
}

/// One output line: distance in meters, then longitude and latitude of the closest point
fn format_result(result: &QueryResult) -> String {
    let coord = result.closest_lon_lat();
    format!("{}, {}, {}", result.distance_meters(), coord.x, coord.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use findlink_lib::{Polyline, QueryOptions};

    #[test]
    fn test_format_result_field_order() {
        let polyline = Polyline::from_lat_lon_degrees(&[(37.0, 127.0), (37.01, 127.01)]).unwrap();
        let index = SpatialIndex::build(vec![polyline]).unwrap();
        let query = NearestEdgeQuery::new(&index, QueryOptions::default());
        let result = query.find_closest_edge_lat_lon(37.0, 127.0).unwrap();

        let line = format_result(&result);
        let fields: Vec<f64> = line.split(", ").map(|f| f.parse().unwrap()).collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], 0.0);
        assert!((fields[1] - 127.0).abs() < 1e-9);
        assert!((fields[2] - 37.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_reports_missing_file() {
        let settings = Settings {
            links: "/nonexistent/links.geojson".into(),
            target_lat: 37.5,
            target_lng: 127.0,
            max_results: 1,
            max_distance_meters: None,
            brute_force: false,
        };
        assert!(matches!(run(&settings), Err(CliError::Io { .. })));
    }

    #[test]
    fn test_run_rejects_invalid_target() {
        let settings = Settings {
            links: "/nonexistent/links.geojson".into(),
            target_lat: 91.0,
            target_lng: 127.0,
            max_results: 1,
            max_distance_meters: None,
            brute_force: false,
        };
        assert!(matches!(run(&settings), Err(CliError::Network(_))));
    }
}
