use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use composer::config::load_editor_config;
use composer::masking::{prepare_edit_masks, EditMasks};

const USAGE: &str = "usage: composer mask <annotated.png> [<original.png>] <out-dir>";

fn main() -> anyhow::Result<()> {
    composer::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("mask") => run_mask(&args[1..]),
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(())
        }
        _ => bail!("{USAGE}"),
    }
}

fn run_mask(args: &[String]) -> anyhow::Result<()> {
    let (annotated_path, original_path, out_dir) = match args {
        [annotated, out] => (PathBuf::from(annotated), None, PathBuf::from(out)),
        [annotated, original, out] => (
            PathBuf::from(annotated),
            Some(PathBuf::from(original)),
            PathBuf::from(out),
        ),
        _ => bail!("{USAGE}"),
    };

    let settings = load_editor_config().masking;
    let annotated = open_rgba(&annotated_path)?;
    let original = original_path.as_deref().map(open_rgba).transpose()?;

    match prepare_edit_masks(&annotated, original.as_ref(), &settings) {
        EditMasks::Split { mask, clean_plate } => {
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
            let mask_path = out_dir.join("mask.png");
            let plate_path = out_dir.join("clean_plate.png");
            mask.save(&mask_path)
                .with_context(|| format!("write '{}'", mask_path.display()))?;
            clean_plate
                .save(&plate_path)
                .with_context(|| format!("write '{}'", plate_path.display()))?;
            println!("{}", mask_path.display());
            println!("{}", plate_path.display());
        }
        EditMasks::Unsplit { .. } => {
            println!("no marked pixels in '{}'", annotated_path.display());
        }
    }
    Ok(())
}

fn open_rgba(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let image = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    Ok(image.to_rgba8())
}
