use std::path::Path;

use image::RgbaImage;

use crate::error::ExportError;
use crate::raster::FieldRaster;

pub fn save_png(path: impl AsRef<Path>, raster: &FieldRaster) -> Result<(), ExportError> {
    let [width, height] = raster.dimensions();
    let expected = width * height * 4;
    let actual = raster.pixels().len();

    let image = RgbaImage::from_raw(width as u32, height as u32, raster.pixels().to_vec())
        .ok_or(ExportError::BufferSize { expected, actual })?;
    image.save_with_format(path.as_ref(), image::ImageFormat::Png)?;

    log::info!("exported {width}x{height} frame to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldParams, FrameSnapshot};
    use crate::types::SimulationParams;

    #[test]
    fn exported_png_round_trips_dimensions() {
        let params = SimulationParams::default();
        let frame = FrameSnapshot {
            params,
            field: FieldParams::at_rest(&params),
            time: 0.1,
        };
        let mut raster = FieldRaster::new(40, 24);
        raster.render(&frame, &[]);

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("cymatic_pattern.png");
        save_png(&path, &raster).expect("export succeeds");

        let decoded = image::open(&path).expect("readable png").to_rgba8();
        assert_eq!(decoded.dimensions(), (40, 24));
        assert_eq!(decoded.as_raw().as_slice(), raster.pixels());
    }

    #[test]
    fn unwritable_path_is_an_image_error() {
        let raster = FieldRaster::new(4, 4);
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("frame.png");
        assert!(matches!(save_png(&path, &raster), Err(ExportError::Image(_))));
    }
}
