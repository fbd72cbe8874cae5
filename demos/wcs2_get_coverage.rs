use anyhow::Result;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use webcoverageservice::{GetCoverageParams, Wcs2Client};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Configure the endpoint via env vars (`WCS_URL`, `WCS_KEY`) or a `.wcsrc` file.
    let client = Wcs2Client::from_env()?;

    let coverages = client.get_capabilities(None)?;
    println!("{}", coverages);
    let Some(first) = coverages.iter().next().and_then(|c| c.name.clone()) else {
        return Ok(());
    };

    let coverage = client.describe_coverage(&first, None)?;
    println!("{}", coverage.info());
    let components = coverage.components.clone().unwrap_or_default();

    let params = GetCoverageParams::new()
        .with_format("NetCDF3")
        .with_bbox([-10.0, 48.0, 4.0, 62.0])
        .with_width(200)
        .with_height(200);

    client.download_coverage(
        &first,
        components,
        &params,
        Path::new("coverage.nc"),
    )?;
    Ok(())
}
