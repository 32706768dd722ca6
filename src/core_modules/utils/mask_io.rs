pub mod mask_io {
    use image::ImageEncoder;

    /// Dumps a binary mask as an 8-bit grayscale PNG. Debug aid for tuning
    /// threshold tables against recorded frames.
    pub fn save_mask(
        path: &str,
        width: u32,
        height: u32,
        mask: &[bool],
    ) -> Result<(), image::error::ImageError> {
        let buffer: Vec<u8> = mask.iter().map(|&m| if m { 255 } else { 0 }).collect();
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(&buffer, width, height, image::ExtendedColorType::L8)?;
        Ok(())
    }

    /// Dumps a packed RGB frame buffer as a PNG.
    pub fn save_frame(
        path: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(data, width, height, image::ExtendedColorType::Rgb8)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::mask_io::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn save_checkerboard_mask() {
        let width = 64u32;
        let height = 64u32;
        let mask: Vec<bool> = (0..width * height)
            .map(|i| (i % width + i / width) % 2 == 0)
            .collect();

        save_mask(&temp_path("checkerboard_mask.png"), width, height, &mask)
            .expect("Error Saving File.");
    }

    #[test]
    fn save_solid_frame() {
        let width = 32u32;
        let height = 32u32;
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[220, 120, 40]);
        }

        save_frame(&temp_path("solid_frame.png"), width, height, &data)
            .expect("Error Saving File.");
    }
}
