// Example runner for the `chroma_track` library: builds a synthetic frame
// with one orange region, runs a detection session against it, and prints
// the resulting bounding boxes.

use chroma_track::{DetectionSession, FrameBuffer, PipelineConfig, PixelLayout};

#[tokio::main]
async fn main() {
    env_logger::init();
    println!("chroma_track - Example Runner");

    let mut session = DetectionSession::new(PipelineConfig::default());
    session.activate();

    // A 256x128 black frame with a 180x96 orange rectangle at (40, 24).
    let width = 256u32;
    let height = 128u32;
    let mut data = vec![0u8; (width * height * 3) as usize];
    for y in 24..120u32 {
        for x in 40..220u32 {
            let offset = ((y * width + x) * 3) as usize;
            data[offset..offset + 3].copy_from_slice(&[230, 120, 30]);
        }
    }
    let frame = FrameBuffer {
        data,
        width,
        height,
        layout: PixelLayout::Rgb,
    };

    for bounding_box in session.process_frame(&frame) {
        println!(
            "detected region at ({}, {}) size {}x{}",
            bounding_box.x, bounding_box.y, bounding_box.width, bounding_box.height
        );
    }

    session.deactivate();
}
