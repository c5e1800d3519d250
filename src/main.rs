use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use hkh_glacier_stac::{
    dataset::{
        create_fused_collection, create_fused_item, create_slice_collection, create_slice_items,
        get_epsg, get_metadata, update_metadata_paths,
    },
    CoordinateTransform, CrsPair,
};

/// STAC catalog of the LILA Hindu Kush Himalayas glacier mapping dataset.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a STAC collection for labelled image slices
    CreateSliceCollection {
        /// The output directory for the STAC collection json
        #[arg(short, long, value_name = "DIR")]
        destination: PathBuf,
        /// The metadata geojson
        #[arg(short, long, value_name = "GEOJSON")]
        metadata: PathBuf,
    },
    /// Create STAC items for labelled image slices
    CreateSliceItem {
        /// The output directory for the STAC item json
        #[arg(short, long, value_name = "DIR")]
        destination: PathBuf,
        /// The metadata geojson
        #[arg(short, long, value_name = "GEOJSON")]
        metadata: PathBuf,
        /// The slices directory
        #[arg(short, long, value_name = "DIR")]
        slicedir: PathBuf,
    },
    /// Create a STAC collection for SRTM/Landsat 7 fused images
    CreateFusedCollection {
        /// The output directory for the STAC collection json
        #[arg(short, long, value_name = "DIR")]
        destination: PathBuf,
        /// The directory of fused images
        #[arg(short, long, value_name = "DIR")]
        fuseddir: PathBuf,
    },
    /// Create a STAC item for an SRTM/Landsat 7 fused image (COG)
    CreateFusedItem {
        /// The COG of the item
        #[arg(short, long, value_name = "TIF")]
        cog: PathBuf,
        /// The output directory for the STAC item json
        #[arg(short, long, value_name = "DIR")]
        destination: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::CreateSliceCollection {
            destination,
            metadata,
        } => {
            let metadata = get_metadata(&metadata)
                .with_context(|| format!("reading {}", metadata.display()))?;
            let epsg = get_epsg(&metadata)?;
            create_slice_collection(&metadata, &destination, CrsPair::to_wgs84(epsg))
                .context("creating the slice collection")?;
        }
        Command::CreateSliceItem {
            destination,
            metadata,
            slicedir,
        } => {
            let raw_metadata = get_metadata(&metadata)
                .with_context(|| format!("reading {}", metadata.display()))?;
            let metadata = update_metadata_paths(raw_metadata, &slicedir)?;
            let transform = CoordinateTransform::to_wgs84(get_epsg(&metadata)?)?;
            let items = create_slice_items(&metadata, &destination, &transform)
                .context("creating slice items")?;
            info!("created {} slice items", items.len());
        }
        Command::CreateFusedCollection {
            destination,
            fuseddir,
        } => {
            create_fused_collection(&fuseddir, &destination)
                .with_context(|| format!("creating the collection of {}", fuseddir.display()))?;
        }
        Command::CreateFusedItem { cog, destination } => {
            create_fused_item(&cog, &destination)
                .with_context(|| format!("creating the item of {}", cog.display()))?;
        }
    }
    Ok(())
}
