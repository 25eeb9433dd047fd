//! Print a starter configuration

use hookline_config::sample::SAMPLE_CONFIG;

/// Write the sample config to stdout
pub fn run_sample() {
    print!("{SAMPLE_CONFIG}");
}
