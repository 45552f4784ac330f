use clap::Parser;
use findlink_lib::QueryOptions;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// findlink - Find the road link nearest to a target coordinate
pub struct Settings {
    /// GeoJSON FeatureCollection with one LineString feature per link
    #[clap(short, long, value_name = "FILE", default_value = "links.geojson")]
    pub links: PathBuf,

    /// Target latitude in degrees
    #[clap(long, default_value = "37.499212063", allow_negative_numbers = true)]
    pub target_lat: f64,

    /// Target longitude in degrees
    #[clap(long, default_value = "127.027268062", allow_negative_numbers = true)]
    pub target_lng: f64,

    /// Number of nearest links to print
    #[clap(short = 'k', long, default_value = "1")]
    pub max_results: usize,

    /// Ignore links farther than this many meters from the target
    #[clap(long)]
    pub max_distance_meters: Option<f64>,

    /// Compare every edge instead of searching the index (for verification)
    #[clap(long, default_value = "false")]
    pub brute_force: bool,
}

impl Settings {
    /// Parse the command line, exiting with usage information on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    pub fn query_options(&self) -> QueryOptions {
        let options = QueryOptions::default()
            .with_max_results(self.max_results)
            .with_brute_force(self.brute_force);
        match self.max_distance_meters {
            Some(meters) => options.with_max_distance_meters(meters),
            None => options,
        }
    }
}
